//! The ordered list of daily puzzles.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One day's theme, word list and hidden phrase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// The theme shown above the grid.
    pub theme: String,

    /// The words to find, in catalog order.
    pub words: Vec<String>,

    /// The phrase hidden in the cells no word uses.
    pub secret: String,
}

impl Puzzle {
    /// Creates a puzzle from borrowed parts.
    pub fn new(theme: &str, words: &[&str], secret: &str) -> Self {
        Self {
            theme: theme.to_owned(),
            words: words.iter().map(|word| (*word).to_owned()).collect(),
            secret: secret.to_owned(),
        }
    }
}

/// A non-empty, immutable, ordered list of puzzles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    puzzles: Vec<Puzzle>,
}

impl Catalog {
    /// Wraps `puzzles`, failing with [`Error::EmptyCatalog`] when there are none.
    pub fn new(puzzles: Vec<Puzzle>) -> Result<Self> {
        if puzzles.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        Ok(Self { puzzles })
    }

    /// Parses a JSON array of `{theme, words, secret}` records.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Self {
        Self {
            puzzles: BUILTIN
                .iter()
                .map(|(theme, words, secret)| Puzzle::new(theme, words, secret))
                .collect(),
        }
    }

    /// The number of puzzles.
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    /// Always false: a catalog holds at least one puzzle.
    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// All puzzles in order.
    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    /// The puzzle for `day`: index `day mod len`.
    pub fn puzzle_for_day(&self, day: i64) -> &Puzzle {
        let index = day.rem_euclid(self.puzzles.len() as i64) as usize;
        &self.puzzles[index]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

type Entry = (&'static str, &'static [&'static str], &'static str);

const BUILTIN: &[Entry] = &[
    (
        "Frutas",
        &["MANZANA", "NARANJA", "PLATANO", "FRESA", "MELOCOTON", "SANDIA", "CEREZA", "PIÑA", "MANGO", "KIWI", "UVA", "PERA"],
        "LA FRUTA ES SALUD",
    ),
    (
        "Animales",
        &["ELEFANTE", "JIRAFA", "LEON", "TIGRE", "CEBRA", "HIPOPOTAMO", "COCODRILO", "SERPIENTE", "ÑANDU", "CANGURO", "BUHO", "LOBO"],
        "LA SELVA NUNCA DUERME",
    ),
    (
        "Ciudades de España",
        &["MADRID", "BARCELONA", "SEVILLA", "VALENCIA", "BILBAO", "ZARAGOZA", "MALAGA", "GRANADA", "CORUÑA", "CADIZ", "TOLEDO", "SORIA"],
        "VIAJAR ABRE LA MENTE",
    ),
    (
        "Deportes",
        &["FUTBOL", "BALONCESTO", "TENIS", "NATACION", "CICLISMO", "ATLETISMO", "BALONMANO", "ESGRIMA", "REMO", "JUDO", "GOLF", "BOXEO"],
        "EL ESFUERZO TIENE PREMIO",
    ),
    (
        "Instrumentos",
        &["GUITARRA", "PIANO", "VIOLIN", "TROMPETA", "FLAUTA", "BATERIA", "SAXOFON", "ARPA", "CLARINETE", "CONTRABAJO", "OBOE", "TUBA"],
        "LA MUSICA UNE PUEBLOS",
    ),
    (
        "Cocina",
        &["PAELLA", "TORTILLA", "GAZPACHO", "CROQUETA", "EMPANADA", "CHURROS", "FABADA", "PISTO", "LENTEJAS", "COCIDO", "ALIOLI", "MIGAS"],
        "BUEN PROVECHO A TODOS",
    ),
    (
        "Espacio",
        &["PLANETA", "ESTRELLA", "GALAXIA", "COMETA", "ASTEROIDE", "NEBULOSA", "SATELITE", "ORBITA", "ECLIPSE", "LUNA", "MARTE", "SOL"],
        "MIRA SIEMPRE AL CIELO",
    ),
    (
        "Oficios",
        &["MEDICO", "BOMBERO", "CARPINTERO", "PANADERO", "MAESTRA", "ABOGADO", "FONTANERO", "PINTOR", "ENFERMERA", "ARQUITECTO", "CHEF", "PILOTO"],
        "TODO TRABAJO CUENTA",
    ),
];
