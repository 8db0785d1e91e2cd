//! Builds the grid for one puzzle day.
//!
//! Everything is drawn from a single [`Lcg`] stream seeded with the day identifier, in a fixed
//! order: word placement, secret message, filler letters and finally the order the word list is
//! shown in. Two runs with the same day, size and puzzle produce identical results.

use std::fmt::Display;

use rand::RngCore;
use serde::Serialize;

use crate::{
    catalog::Puzzle,
    grid::{Grid, Placement},
    rng::{self, Lcg},
};

/// A fully built grid together with what was placed into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPuzzle {
    /// The finished grid, every cell holding a letter.
    pub grid: Grid,

    /// The placed words, longest first.
    #[serde(skip)]
    pub placements: Vec<Placement>,

    /// The words the player has to find, in catalog order. Words that did not fit are absent.
    pub words: Vec<String>,

    /// The same words in the order the word list displays them.
    pub display_order: Vec<String>,

    /// How many letters of the secret message made it into the grid.
    pub secret_letters: usize,
}

impl GeneratedPuzzle {
    /// The placement of `word`, if it is part of this grid.
    pub fn placement(&self, word: &str) -> Option<&Placement> {
        self.placements.iter().find(|placement| placement.word == word)
    }
}

/// Words of `puzzle` that fit in a `size` grid, longest first. Equal lengths keep catalog order.
pub fn words_to_place(puzzle: &Puzzle, size: usize) -> Vec<&str> {
    let mut words: Vec<&str> = puzzle
        .words
        .iter()
        .map(String::as_str)
        .filter(|word| word.chars().count() <= size)
        .collect();
    words.sort_by_key(|word| std::cmp::Reverse(word.chars().count()));
    words
}

/// Generates the grid for `day` at `size` with a fresh generator seeded by `day`.
pub fn generate(day: i64, size: usize, puzzle: &Puzzle) -> GeneratedPuzzle {
    generate_with_rng(size, puzzle, &mut Lcg::new(day))
}

/// Generates a grid drawing every random choice from `rng`.
pub fn generate_with_rng<R: RngCore + ?Sized>(
    size: usize,
    puzzle: &Puzzle,
    rng: &mut R,
) -> GeneratedPuzzle {
    let mut grid = Grid::new(size);

    let placements: Vec<Placement> = words_to_place(puzzle, size)
        .into_iter()
        .filter_map(|word| grid.place_word(word, rng))
        .collect();

    let secret_letters = grid.place_secret_message(&puzzle.secret, rng);
    grid.fill_empty_cells(rng);

    let mut display_order: Vec<String> = placements.iter().map(|p| p.word.clone()).collect();
    rng::shuffle(&mut display_order, rng);

    let words = puzzle
        .words
        .iter()
        .filter(|word| placements.iter().any(|p| &p.word == *word))
        .cloned()
        .collect();

    GeneratedPuzzle {
        grid,
        placements,
        words,
        display_order,
        secret_letters,
    }
}

impl Display for GeneratedPuzzle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut words_iter = self.display_order.iter();

        for row in self.grid.rows() {
            for cell in row {
                write!(f, "{} ", cell.letter.unwrap_or('.'))?;
            }

            writeln!(f, "| {}", words_iter.next().map_or("", String::as_str))?;
        }

        for word in words_iter {
            writeln!(f, "{:width$}| {}", "", word, width = self.grid.size() * 2)?;
        }

        Ok(())
    }
}
