//! Puzzle days, clocks and time formatting.
//!
//! A puzzle day runs from 09:00 local time to 09:00 the next morning, so a game started late in
//! the evening keeps its puzzle until the next morning.

use std::{cell::Cell, rc::Rc};

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike};

use crate::{Error, Result};

/// Local hour at which a new puzzle day starts.
pub const ROLLOVER_HOUR: u32 = 9;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

fn rollover_time() -> NaiveTime {
    NaiveTime::from_hms_opt(ROLLOVER_HOUR, 0, 0).unwrap_or_default()
}

/// The instant of 09:00 on `date` in the zone `tz`.
fn rollover_on<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(rollover_time());

    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Returns the puzzle day `now` falls in.
///
/// The reference instant is 09:00 local time on `now`'s calendar date, moved back one day when
/// `now` is earlier. The result is that instant in whole days since the Unix epoch.
pub fn day_identifier<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let local = now.naive_local();
    let mut date = local.date();

    if local.time() < rollover_time() {
        date = date.checked_sub_days(Days::new(1)).unwrap_or(date);
    }

    rollover_on(&now.timezone(), date)
        .timestamp_millis()
        .div_euclid(MS_PER_DAY)
}

/// The next 09:00 boundary strictly after `now`.
pub fn next_rollover<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let local = now.naive_local();
    let mut date = local.date();

    if local.hour() >= ROLLOVER_HOUR {
        date = date.checked_add_days(Days::new(1)).unwrap_or(date);
    }

    rollover_on(&now.timezone(), date)
}

/// How long until the next puzzle becomes available.
pub fn time_until_next_puzzle<Tz: TimeZone>(now: &DateTime<Tz>) -> TimeDelta {
    next_rollover(now) - now.clone()
}

/// Parses a debug date in the `dd/mm/yyyy` form and returns 09:00 of that day in `offset`.
pub fn parse_debug_date(input: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let invalid = || Error::InvalidDebugDate(input.to_owned());
    let bytes = input.as_bytes();

    let well_formed = bytes.len() == 10
        && bytes[2] == b'/'
        && bytes[5] == b'/'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(input, "%d/%m/%Y").map_err(|_| invalid())?;
    Ok(rollover_on(&offset, date))
}

/// Formats a duration in seconds as `MM:SS`, or `--:--` for values that are not a finite,
/// non-negative number.
pub fn format_time(total_seconds: f64) -> String {
    if !total_seconds.is_finite() || total_seconds < 0.0 {
        return String::from("--:--");
    }

    let total = total_seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Formats an optional number of seconds, treating `None` as unknown.
pub fn format_optional_time(seconds: Option<u64>) -> String {
    format_time(seconds.map_or(f64::NAN, |s| s as f64))
}

/// Formats a countdown as `HH:MM:SS`, hours wrapping at a day.
pub fn format_countdown(remaining: TimeDelta) -> String {
    let seconds = remaining.num_seconds().max(0);

    format!(
        "{:02}:{:02}:{:02}",
        (seconds % 86_400) / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// A source for the current time.
pub trait Clock {
    /// The current local time.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the system's local clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<FixedOffset>>>,
}

impl ManualClock {
    /// Creates a clock stopped at `now`.
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        self.now.set(now);
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}
