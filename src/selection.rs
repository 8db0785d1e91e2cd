//! Turning two clicked cells into a line of letters and matching it against the word list.

use crate::grid::{Coord, Grid};

/// The cells between two clicked points and the letters they hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Letters from the first point to the second.
    pub letters: Vec<char>,

    /// The cells the letters came from, in the same order.
    pub coords: Vec<Coord>,
}

impl Selection {
    /// Whether the points did not form a line.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// The letters as a string, first point first.
    pub fn word(&self) -> String {
        self.letters.iter().collect()
    }
}

/// Collects the cells on the straight line from `start` to `end`, both included.
///
/// Returns an empty selection unless the points share a row, a column or an exact 45° diagonal.
/// Cells outside the grid are skipped, so only the part of the line inside the grid is walked.
pub fn resolve_line_selection(grid: &Grid, start: Coord, end: Coord) -> Selection {
    let (r0, c0) = (start.r as i128, start.c as i128);
    let dr = end.r as i128 - r0;
    let dc = end.c as i128 - c0;

    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return Selection::default();
    }

    let steps = dr.abs().max(dc.abs());
    let (step_r, step_c) = (dr.signum(), dc.signum());
    let size = grid.size() as i128;

    let (first_r, last_r) = steps_inside(r0, step_r, size);
    let (first_c, last_c) = steps_inside(c0, step_c, size);
    let first = first_r.max(first_c).max(0);
    let last = last_r.min(last_c).min(steps);

    let mut selection = Selection::default();

    for i in first..=last {
        let coord = Coord::new((r0 + i * step_r) as usize, (c0 + i * step_c) as usize);

        if let Some(letter) = grid.letter(coord) {
            selection.letters.push(letter);
            selection.coords.push(coord);
        }
    }

    selection
}

/// The steps `i` for which `from + i * step` lies in `0..size`, as an inclusive range that is
/// empty when `first > last`.
fn steps_inside(from: i128, step: i128, size: i128) -> (i128, i128) {
    match step {
        0 if (0..size).contains(&from) => (i128::MIN, i128::MAX),
        0 => (1, 0),
        1 => (-from, size - 1 - from),
        _ => (from - (size - 1), from),
    }
}

/// Returns the first word of `words` not yet in `found` that reads as `letters`, forwards or
/// backwards.
pub fn try_match<'w, S: AsRef<str>>(letters: &[char], words: &'w [S], found: &[String]) -> Option<&'w str> {
    if letters.is_empty() {
        return None;
    }

    words.iter().map(|word| word.as_ref()).find(|word| {
        !found.iter().any(|f| f == word) && {
            let count = word.chars().count();
            count == letters.len()
                && (word.chars().eq(letters.iter().copied())
                    || word.chars().eq(letters.iter().rev().copied()))
        }
    })
}
