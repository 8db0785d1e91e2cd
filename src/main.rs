use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use palabrix::{
    day, Catalog, Coord, DebugConfig, FileStorage, GameConfig, GameEvent, ResetOutcome, Screen,
    Session, SystemClock,
};

#[derive(Parser)]
#[command(version, about = "Daily word search in the terminal")]
struct Opts {
    /// Grid size to play (16, 20 or 24). Remembered for the next run.
    #[arg(long)]
    size: Option<usize>,

    /// Play the puzzle of another day, given as dd/mm/yyyy
    #[arg(long)]
    date: Option<String>,

    /// Go back to the real date after a previous --date
    #[arg(long, conflicts_with = "date")]
    clear_date: bool,

    /// Log generation and selection details
    #[arg(short, long)]
    verbose: bool,

    /// Where progress is stored
    #[arg(long, default_value = ".palabrix")]
    data_dir: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print today's grid and word list
    Show,

    /// Start the clock
    Start,

    /// Select the line between two cells, given as row and column pairs
    Select { r1: usize, c1: usize, r2: usize, c2: usize },

    /// Forget today's progress
    Reset,

    /// Print statistics
    Stats,

    /// Turn session tracing on or off for every later run
    Verbose {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
}

fn main() -> palabrix::Result<()> {
    let opts = Opts::parse();
    let storage = FileStorage::new(opts.data_dir.clone());
    let verbose = opts.verbose || DebugConfig::load(&storage).verbose;

    env_logger::Builder::new()
        .filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .init();

    let mut session = Session::new(storage, SystemClock, Catalog::builtin(), GameConfig::default());

    if opts.verbose {
        let debug = DebugConfig {
            verbose: true,
            ..session.debug().clone()
        };
        session = session.with_debug(debug);
    }

    if let Some(date) = &opts.date {
        session.set_debug_date(date)?;
    } else if opts.clear_date {
        session.clear_debug_date();
    }

    let mut screen = session.initialize();
    if let Some(size) = opts.size {
        screen = session.change_grid_size(size)?;
    }

    match opts.command.unwrap_or(Command::Show) {
        Command::Show => show(&session, &screen, opts.json)?,
        Command::Start => {
            session.start_timer();
            println!("{}", session.timer_display());
        }
        Command::Select { r1, c1, r2, c2 } => {
            let events = session.submit_selection(Coord::new(r1, c1), Coord::new(r2, c2));
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                events.iter().for_each(print_event);
            }
        }
        Command::Reset => match session.reset_day() {
            ResetOutcome::Reset => println!("Progreso de hoy borrado."),
            ResetOutcome::NothingToReset => println!("No hay progreso que resetear para hoy."),
        },
        Command::Stats => {
            let summary = session.stats_summary();
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Jugadas: {}", summary.games_played);
                println!("Completadas: {}", summary.games_completed);
                println!("Mejor tiempo hoy: {}", day::format_optional_time(summary.best_time));
                println!("Tiempo medio: {}", day::format_optional_time(summary.average_time));
            }
        }
        Command::Verbose { enabled } => session.set_verbose(enabled),
    }

    Ok(())
}

fn show<S: palabrix::Storage>(
    session: &Session<S, SystemClock>,
    screen: &Screen,
    json: bool,
) -> palabrix::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session.generated())?);
        return Ok(());
    }

    println!("Tema: {}", session.puzzle().theme);

    match screen {
        Screen::Completed(completed) => {
            println!("¡Ya has completado el puzle de hoy para este tamaño!");
            println!("Tu mejor tiempo hoy: {}", day::format_optional_time(completed.best_time));
            println!("El mensaje secreto es: {}", completed.secret);
            println!("Próximo puzle en: {}", day::format_countdown(completed.next_puzzle_in));
        }
        Screen::Playing => {
            print!("{}", session.generated());
            println!("Encontradas: {}", session.found_words().join(", "));
            println!("Tiempo: {}", session.timer_display());
        }
    }

    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::WordFound { word, .. } => println!("¡Encontraste \"{}\"!", word),
        GameEvent::PuzzleCompleted { elapsed_seconds, new_best } => {
            println!("¡Has encontrado todas las palabras! Tu tiempo: {}", day::format_time(*elapsed_seconds as f64));
            if *new_best {
                println!("¡Nuevo récord!");
            }
        }
        GameEvent::IncorrectSelection { .. } => println!("Palabra incorrecta."),
    }
}
