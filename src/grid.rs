//! The letter grid and the placement primitives the daily generator is built from.

use std::{fmt::Display, ops::Index};

use array2d::Array2D;
use rand::RngCore;
use serde::{ser::SerializeSeq, Deserialize, Serialize, Serializer};

use crate::rng;

/// Letters used to fill cells that hold neither a word nor the secret message.
pub const FILL_ALPHABET: &str = "ABCDEFGHIJKLMNÑOPQRSTUVWXYZ";

/// Random placement attempts made for a word before falling back to an exhaustive scan.
pub const MAX_RANDOM_ATTEMPTS: usize = 100;

/// A row/column position in the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// The row, counted from the top.
    pub r: usize,

    /// The column, counted from the left.
    pub c: usize,
}

impl Coord {
    /// Creates a coordinate from a row and a column.
    pub fn new(r: usize, c: usize) -> Self {
        Self { r, c }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((r, c): (usize, usize)) -> Self {
        Self { r, c }
    }
}

/// One square of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// The letter shown in the cell, `None` while the grid is still being built.
    #[serde(rename = "char")]
    pub letter: Option<char>,

    /// Whether the letter belongs to a placed word.
    pub is_word: bool,

    /// Whether the letter belongs to the hidden secret message.
    pub is_secret: bool,
}

impl Cell {
    /// Whether no letter has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.letter.is_none()
    }
}

/// The direction a word is placed in inside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right.
    Right,

    /// Right to left.
    Left,

    /// Top to bottom.
    Down,

    /// Bottom to top.
    Up,

    /// Towards the bottom right corner.
    DownRight,

    /// Towards the top left corner.
    UpLeft,

    /// Towards the bottom left corner.
    DownLeft,

    /// Towards the top right corner.
    UpRight,
}

impl Direction {
    /// Every direction, in the order random draws and the exhaustive scan index them.
    pub const ALL: [Direction; 8] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
        Direction::DownRight,
        Direction::UpLeft,
        Direction::DownLeft,
        Direction::UpRight,
    ];

    /// Returns a direction drawn from `rng`.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng::index(rng, Self::ALL.len())]
    }

    /// The unit step `(dr, dc)` of this direction.
    pub fn delta(self) -> (isize, isize) {
        use Direction::*;

        match self {
            Right => (0, 1),
            Left => (0, -1),
            Down => (1, 0),
            Up => (-1, 0),
            DownRight => (1, 1),
            UpLeft => (-1, -1),
            DownLeft => (1, -1),
            UpRight => (-1, 1),
        }
    }

    /// Returns the direction whose unit step is `(dr, dc)`, if it is one of the eight.
    pub fn from_delta(dr: isize, dc: isize) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.delta() == (dr, dc))
    }
}

/// Where a word's letters sit in the grid: a beginning coordinate, a length and a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordSpan {
    /// The coordinate of the first letter.
    pub begin: Coord,

    /// The number of letters.
    pub len: usize,

    /// The direction the letters run in.
    pub direction: Direction,
}

impl WordSpan {
    /// Creates a new span.
    pub fn new(begin: Coord, len: usize, direction: Direction) -> Self {
        Self {
            begin,
            len,
            direction,
        }
    }

    /// The coordinate of the `i`th letter, or `None` when it would fall off the top or left edge.
    pub fn position(&self, i: usize) -> Option<Coord> {
        let (dr, dc) = self.direction.delta();
        let r = self.begin.r as isize + dr * i as isize;
        let c = self.begin.c as isize + dc * i as isize;

        (r >= 0 && c >= 0).then(|| Coord::new(r as usize, c as usize))
    }

    /// Returns every coordinate the span covers, in letter order.
    ///
    /// Only meaningful for spans that are [in bounds](WordSpan::in_bounds).
    pub fn indices(&self) -> Vec<Coord> {
        (0..self.len).filter_map(|i| self.position(i)).collect()
    }

    /// Returns whether every letter of the span lies inside a `size` by `size` grid.
    pub fn in_bounds(&self, size: usize) -> bool {
        (0..self.len).all(|i| matches!(self.position(i), Some(p) if p.r < size && p.c < size))
    }
}

/// A word that made it into the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The word as listed in the puzzle.
    pub word: String,

    /// Where the letters were written.
    pub span: WordSpan,

    /// Whether the letters were written back to front along the span.
    pub reversed: bool,
}

impl Placement {
    /// The letters as they read along the span.
    pub fn written(&self) -> String {
        if self.reversed {
            self.word.chars().rev().collect()
        } else {
            self.word.clone()
        }
    }
}

/// An N×N grid of cells, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Array2D<Cell>,
}

impl Grid {
    /// Creates a `size` by `size` grid of empty cells.
    pub fn new(size: usize) -> Self {
        Self {
            cells: Array2D::filled_with(Cell::default(), size, size),
        }
    }

    /// The number of rows, which always equals the number of columns.
    pub fn size(&self) -> usize {
        self.cells.num_rows()
    }

    /// Gets the cell at `coord`, returning [`Option::None`] if it is out of bounds.
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(coord.r, coord.c)
    }

    /// Gets the letter at `coord`, if the cell exists and holds one.
    pub fn letter(&self, coord: Coord) -> Option<char> {
        self.get(coord).and_then(|cell| cell.letter)
    }

    /// Iterates the rows of the grid from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = &Cell>> {
        self.cells.rows_iter()
    }

    /// Iterates every cell with its coordinate, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let size = self.size();
        self.cells
            .elements_row_major_iter()
            .enumerate()
            .map(move |(i, cell)| (Coord::new(i / size, i % size), cell))
    }

    /// Coordinates of every cell that has no letter yet, row-major.
    pub fn empty_cells(&self) -> Vec<Coord> {
        self.cells()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Coordinates of secret letters that are not shared with a word, revealed once the puzzle is solved.
    pub fn secret_cells(&self) -> Vec<Coord> {
        self.cells()
            .filter(|(_, cell)| cell.is_secret && !cell.is_word)
            .map(|(coord, _)| coord)
            .collect()
    }

    /// The letters read along `span`, skipping cells that are out of bounds or empty.
    pub fn read(&self, span: &WordSpan) -> String {
        span.indices()
            .into_iter()
            .filter_map(|coord| self.letter(coord))
            .collect()
    }

    /// Returns whether `word` fits starting at `begin` in `direction`.
    ///
    /// Every letter must land inside the grid on a cell that is either empty or already holds the
    /// same letter, which is what lets words cross.
    pub fn can_place_word(&self, word: &[char], begin: Coord, direction: Direction) -> bool {
        let span = WordSpan::new(begin, word.len(), direction);
        let size = self.size();

        word.iter().enumerate().all(|(i, &ch)| match span.position(i) {
            Some(p) if p.r < size && p.c < size => match self.cells[(p.r, p.c)].letter {
                None => true,
                Some(existing) => existing == ch,
            },
            _ => false,
        })
    }

    /// Writes `word` starting at `begin` in `direction` if it fits there.
    pub fn place_word_at(&mut self, word: &str, begin: Coord, direction: Direction) -> Option<WordSpan> {
        let letters: Vec<char> = word.chars().collect();

        self.can_place_word(&letters, begin, direction).then(|| {
            let span = WordSpan::new(begin, letters.len(), direction);
            self.write_word(&letters, &span);
            span
        })
    }

    fn write_word(&mut self, word: &[char], span: &WordSpan) {
        for (&ch, coord) in word.iter().zip(span.indices()) {
            self.cells[(coord.r, coord.c)] = Cell {
                letter: Some(ch),
                is_word: true,
                is_secret: false,
            };
        }
    }

    /// Places `word` somewhere in the grid, drawing every choice from `rng`.
    ///
    /// The word is first reversed with even odds, then up to [`MAX_RANDOM_ATTEMPTS`] random
    /// direction and anchor pairs are tried. If none fits, every direction, row and column is
    /// scanned in order and the first fitting slot is used. Returns `None` when the word fits
    /// nowhere, leaving the grid untouched.
    pub fn place_word<R: RngCore + ?Sized>(&mut self, word: &str, rng: &mut R) -> Option<Placement> {
        let reversed = rng::unit(rng) <= 0.5;
        let letters: Vec<char> = if reversed {
            word.chars().rev().collect()
        } else {
            word.chars().collect()
        };
        let size = self.size();

        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let direction = Direction::random(rng);
            let begin = Coord::new(rng::index(rng, size), rng::index(rng, size));

            if self.can_place_word(&letters, begin, direction) {
                let span = WordSpan::new(begin, letters.len(), direction);
                self.write_word(&letters, &span);
                return Some(Placement {
                    word: word.to_owned(),
                    span,
                    reversed,
                });
            }
        }

        for direction in Direction::ALL {
            for r in 0..size {
                for c in 0..size {
                    let begin = Coord::new(r, c);

                    if self.can_place_word(&letters, begin, direction) {
                        let span = WordSpan::new(begin, letters.len(), direction);
                        self.write_word(&letters, &span);
                        return Some(Placement {
                            word: word.to_owned(),
                            span,
                            reversed,
                        });
                    }
                }
            }
        }

        None
    }

    /// Spreads the letters of `secret` over the cells that are still empty.
    ///
    /// Whitespace is dropped, the empty cells are shuffled with `rng` and filled in shuffled
    /// order. A secret longer than the number of empty cells is cut short. Returns how many
    /// letters were placed.
    pub fn place_secret_message<R: RngCore + ?Sized>(&mut self, secret: &str, rng: &mut R) -> usize {
        let mut empty = self.empty_cells();
        rng::shuffle(&mut empty, rng);

        let letters = secret.chars().filter(|ch| !ch.is_whitespace());
        let mut placed = 0;

        for (ch, coord) in letters.zip(empty) {
            let cell = &mut self.cells[(coord.r, coord.c)];
            cell.letter = Some(ch);
            cell.is_secret = true;
            placed += 1;
        }

        placed
    }

    /// Fills every remaining empty cell with a letter from [`FILL_ALPHABET`], row-major.
    pub fn fill_empty_cells<R: RngCore + ?Sized>(&mut self, rng: &mut R) {
        let alphabet: Vec<char> = FILL_ALPHABET.chars().collect();

        for coord in self.empty_cells() {
            self.cells[(coord.r, coord.c)] = Cell {
                letter: Some(alphabet[rng::index(rng, alphabet.len())]),
                is_word: false,
                is_secret: false,
            };
        }
    }
}

impl Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.cells[(index.r, index.c)]
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.size()))?;
        for row in self.rows() {
            seq.serialize_element(&row.collect::<Vec<_>>())?;
        }
        seq.end()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{} ", cell.letter.unwrap_or('.'))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::rng::Lcg;

    fn chars(word: &str) -> Vec<char> {
        word.chars().collect()
    }

    fn line_contains(grid: &Grid, word: &str) -> bool {
        let size = grid.size();
        let len = word.chars().count();

        Direction::ALL.into_iter().any(|direction| {
            (0..size).any(|r| {
                (0..size).any(|c| {
                    let span = WordSpan::new(Coord::new(r, c), len, direction);
                    span.in_bounds(size) && grid.read(&span) == word
                })
            })
        })
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(5);

        assert_eq!(grid.size(), 5);
        assert_eq!(grid.empty_cells().len(), 25);
        assert!(grid.cells().all(|(_, cell)| !cell.is_word && !cell.is_secret));
    }

    #[test]
    fn can_place_respects_bounds() {
        let grid = Grid::new(5);

        assert!(grid.can_place_word(&chars("HOLA"), Coord::new(0, 0), Direction::Right));
        assert!(!grid.can_place_word(&chars("HOLA"), Coord::new(0, 2), Direction::Right));

        for direction in [Direction::Right, Direction::Down, Direction::DownRight] {
            assert!(!grid.can_place_word(&chars("LARGAPALABRA"), Coord::new(0, 0), direction));
        }
    }

    #[test]
    fn can_place_in_all_eight_directions() {
        let grid = Grid::new(8);

        for direction in Direction::ALL {
            let (dr, dc) = direction.delta();
            let begin = Coord::new(if dr >= 0 { 1 } else { 6 }, if dc >= 0 { 1 } else { 6 });

            assert!(
                grid.can_place_word(&chars("TEST"), begin, direction),
                "{direction:?} should fit from {begin:?}"
            );
        }
    }

    #[test]
    fn reverse_directions_fit() {
        let grid = Grid::new(6);

        assert!(grid.can_place_word(&chars("HOLA"), Coord::new(2, 4), Direction::Left));
        assert!(grid.can_place_word(&chars("HOLA"), Coord::new(4, 2), Direction::Up));
        assert!(grid.can_place_word(&chars("HOLA"), Coord::new(4, 4), Direction::UpLeft));
    }

    #[test]
    fn directions_are_distinct_unit_steps() {
        let mut deltas: Vec<_> = Direction::ALL.iter().map(|d| d.delta()).collect();
        deltas.sort_unstable();
        deltas.dedup();

        assert_eq!(deltas.len(), 8);
        assert!(!deltas.contains(&(0, 0)));
        assert_eq!(Direction::from_delta(-1, 1), Some(Direction::UpRight));
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn crossing_requires_matching_letter() {
        let mut grid = Grid::new(5);
        let mut rng = Lcg::new(1);
        grid.place_word("A", &mut rng).unwrap();

        let taken = grid.cells().find(|(_, cell)| !cell.is_empty()).unwrap().0;

        assert!(grid.can_place_word(&chars("A"), taken, Direction::Right));
        assert!(!grid.can_place_word(&chars("B"), taken, Direction::Right));
    }

    #[test]
    fn places_prueba_in_small_grid() {
        let mut grid = Grid::new(8);
        let mut rng = Lcg::new(12345);

        let placement = grid.place_word("PRUEBA", &mut rng).expect("PRUEBA should fit");

        assert!(placement.span.in_bounds(8));
        assert_eq!(grid.read(&placement.span), placement.written());
        assert!(line_contains(&grid, "PRUEBA") || line_contains(&grid, "AEBURP"));
    }

    #[test]
    fn placed_letters_read_back_along_span() {
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::new(10);

            for word in ["ESPAÑA", "MADRID", "SEVILLA", "BILBAO", "CADIZ"] {
                if let Some(placement) = grid.place_word(word, &mut rng) {
                    let read = grid.read(&placement.span);
                    let reversed: String = word.chars().rev().collect();
                    assert!(read == word || read == reversed, "seed {seed}: {read} vs {word}");
                }
            }
        }
    }

    #[test]
    fn falls_back_to_exhaustive_scan() {
        // A 3x3 grid with one slot: only row 0, left to right (or its reverse), fits.
        let mut grid = Grid::new(3);
        for r in 1..3 {
            for c in 0..3 {
                grid.cells[(r, c)] = Cell {
                    letter: Some('X'),
                    is_word: true,
                    is_secret: false,
                };
            }
        }

        let mut rng = Lcg::new(3);
        let placement = grid.place_word("SOL", &mut rng).expect("row 0 is free");

        assert_eq!(placement.span.begin.r, 0);
        assert_eq!(grid.read(&placement.span), placement.written());
    }

    #[test]
    fn unplaceable_word_leaves_grid_untouched() {
        let mut grid = Grid::new(4);
        let before = grid.clone();

        assert!(grid.place_word("CINCO", &mut Lcg::new(8)).is_none());
        assert_eq!(grid, before);
    }

    #[test]
    fn secret_fills_empty_cells() {
        let mut grid = Grid::new(6);
        let placed = grid.place_secret_message("SECRET", &mut Lcg::new(4));

        assert_eq!(placed, 6);
        assert_eq!(grid.cells().filter(|(_, cell)| cell.is_secret).count(), 6);
    }

    #[test]
    fn secret_skips_whitespace_and_truncates() {
        let mut grid = Grid::new(2);
        let placed = grid.place_secret_message("HOLA MUNDO", &mut Lcg::new(4));

        assert_eq!(placed, 4);
        assert!(grid.empty_cells().is_empty());
        assert!(grid.cells().all(|(_, cell)| cell.letter != Some(' ')));
    }

    #[test]
    fn fill_uses_alphabet() {
        let mut grid = Grid::new(12);
        grid.fill_empty_cells(&mut Lcg::new(77));

        assert!(grid.empty_cells().is_empty());
        assert!(grid
            .cells()
            .all(|(_, cell)| FILL_ALPHABET.contains(cell.letter.unwrap())));
    }

    #[test]
    fn serializes_rows_of_cells() {
        let mut grid = Grid::new(2);
        grid.fill_empty_cells(&mut Lcg::new(0));

        let json = serde_json::to_value(&grid).unwrap();
        let rows = json.as_array().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_array().unwrap().len(), 2);
        assert_eq!(rows[0][0]["isWord"], false);
        assert!(rows[0][0]["char"].is_string());
    }
}
