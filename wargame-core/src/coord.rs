//! Square grid geometry with (row, col) coordinates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseCoordError;

/// Row labels, one letter per row
const ROW_LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Column labels, one hex digit per column
const COL_LABELS: &[u8] = b"0123456789abcdef";

/// Largest board dimension expressible in coordinate text
pub const MAX_DIM: usize = 16;

/// Orthogonal direction vectors (drow, dcol)
/// Index: 0=Up, 1=Left, 2=Down, 3=Right
pub const CROSS_DIRECTIONS: [(i8, i8); 4] = [
    (-1, 0), // Up
    (0, -1), // Left
    (1, 0),  // Down
    (0, 1),  // Right
];

/// A board cell coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate lies on a dim x dim board
    pub fn is_within(&self, dim: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < dim && (self.col as usize) < dim
    }

    /// Cell offset by a direction vector
    pub fn offset(&self, (drow, dcol): (i8, i8)) -> Coord {
        Coord::new(self.row.saturating_add(drow), self.col.saturating_add(dcol))
    }

    /// Orthogonal neighbors in Up, Left, Down, Right order (not bounds checked)
    pub fn iter_adjacent(&self) -> impl Iterator<Item = Coord> {
        let origin = *self;
        CROSS_DIRECTIONS.into_iter().map(move |dir| origin.offset(dir))
    }

    /// Square of side 2*dist+1 centered on this cell, row-major (not bounds checked)
    pub fn iter_range(&self, dist: i8) -> impl Iterator<Item = Coord> {
        let origin = *self;
        (-dist..=dist).flat_map(move |dr| (-dist..=dist).map(move |dc| origin.offset((dr, dc))))
    }

    /// Manhattan distance between two cells
    pub fn manhattan_distance(&self, other: Coord) -> i32 {
        (self.row as i32 - other.row as i32).abs() + (self.col as i32 - other.col as i32).abs()
    }

    /// Chebyshev distance between two cells
    pub fn chebyshev_distance(&self, other: Coord) -> i32 {
        let dr = (self.row as i32 - other.row as i32).abs();
        let dc = (self.col as i32 - other.col as i32).abs();
        dr.max(dc)
    }

    pub fn row_label(&self) -> char {
        usize::try_from(self.row)
            .ok()
            .and_then(|i| ROW_LABELS.get(i))
            .map_or('?', |&b| b as char)
    }

    pub fn col_label(&self) -> char {
        usize::try_from(self.col)
            .ok()
            .and_then(|i| COL_LABELS.get(i))
            .map_or('?', |&b| b as char)
    }

    /// Parse a two-character token such as `D2` (row letter, column hex digit)
    fn from_token(row: char, col: char) -> Result<Self, ParseCoordError> {
        let row_idx = ROW_LABELS
            .iter()
            .position(|&b| b as char == row.to_ascii_uppercase())
            .ok_or(ParseCoordError::BadRow(row))?;
        let col_idx = COL_LABELS
            .iter()
            .position(|&b| b as char == col.to_ascii_lowercase())
            .ok_or(ParseCoordError::BadColumn(col))?;
        Ok(Coord::new(row_idx as i8, col_idx as i8))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col_label())
    }
}

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = significant_chars(s);
        match chars.as_slice() {
            [row, col] => Coord::from_token(*row, *col),
            other => Err(ParseCoordError::WrongLength {
                expected: 2,
                found: other.len(),
            }),
        }
    }
}

/// A pair of coordinates: a move (src -> dst) or a rectangle (top-left, bottom-right)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordPair {
    pub src: Coord,
    pub dst: Coord,
}

impl CoordPair {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    pub const fn from_quad(row0: i8, col0: i8, row1: i8, col1: i8) -> Self {
        Self::new(Coord::new(row0, col0), Coord::new(row1, col1))
    }

    /// Rectangle covering a whole dim x dim board
    pub fn from_dim(dim: usize) -> Self {
        let last = dim.saturating_sub(1) as i8;
        Self::from_quad(0, 0, last, last)
    }

    /// Cells of the rectangle in row-major order
    pub fn iter_rectangle(&self) -> impl Iterator<Item = Coord> {
        let (src, dst) = (self.src, self.dst);
        (src.row..=dst.row).flat_map(move |row| (src.col..=dst.col).map(move |col| Coord::new(row, col)))
    }

    /// (drow, dcol) from src to dst
    pub fn delta(&self) -> (i8, i8) {
        (self.dst.row - self.src.row, self.dst.col - self.src.col)
    }

    /// Source and destination are the same cell
    pub fn is_same_cell(&self) -> bool {
        self.src == self.dst
    }

    /// Orthogonally adjacent (diagonals excluded)
    pub fn is_adjacent_cross(&self) -> bool {
        self.src.manhattan_distance(self.dst) == 1
    }
}

impl fmt::Display for CoordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.src, self.dst)
    }
}

impl FromStr for CoordPair {
    type Err = ParseCoordError;

    /// Parse `A3 B2`; any punctuation or whitespace between tokens is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = significant_chars(s);
        match chars.as_slice() {
            [r0, c0, r1, c1] => Ok(CoordPair::new(
                Coord::from_token(*r0, *c0)?,
                Coord::from_token(*r1, *c1)?,
            )),
            other => Err(ParseCoordError::WrongLength {
                expected: 4,
                found: other.len(),
            }),
        }
    }
}

fn significant_chars(s: &str) -> Vec<char> {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_validity() {
        assert!(Coord::new(0, 0).is_within(5));
        assert!(Coord::new(4, 4).is_within(5));
        assert!(!Coord::new(5, 0).is_within(5));
        assert!(!Coord::new(0, -1).is_within(5));
    }

    #[test]
    fn test_adjacent_order() {
        let around: Vec<_> = Coord::new(2, 2).iter_adjacent().collect();
        assert_eq!(
            around,
            vec![Coord::new(1, 2), Coord::new(2, 1), Coord::new(3, 2), Coord::new(2, 3)]
        );
    }

    #[test]
    fn test_range_covers_square() {
        let cells: Vec<_> = Coord::new(0, 0).iter_range(1).collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Coord::new(-1, -1));
        assert_eq!(cells[8], Coord::new(1, 1));

        let center = Coord::new(3, 3);
        let ring: Vec<_> = center.iter_range(2).collect();
        assert_eq!(ring.len(), 25);
        assert!(ring.iter().all(|c| c.chebyshev_distance(center) <= 2));
        assert_eq!(ring.iter().filter(|c| c.chebyshev_distance(center) == 2).count(), 16);
        assert_eq!(Coord::new(0, 0).chebyshev_distance(Coord::new(2, 5)), 5);
        assert_eq!(Coord::new(0, 0).manhattan_distance(Coord::new(2, 5)), 7);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Coord::new(0, 3).to_string(), "A3");
        assert_eq!(Coord::new(3, 11).to_string(), "Db");
        assert_eq!(Coord::new(30, 0).row_label(), '?');
    }

    #[test]
    fn test_parse_coord() {
        assert_eq!("d2".parse::<Coord>().unwrap(), Coord::new(3, 2));
        assert_eq!("B f".parse::<Coord>().unwrap(), Coord::new(1, 15));
        assert!("D".parse::<Coord>().is_err());
        assert!(matches!("Dz".parse::<Coord>(), Err(ParseCoordError::BadColumn('z'))));
    }

    #[test]
    fn test_parse_pair() {
        let pair: CoordPair = "A3 B2".parse().unwrap();
        assert_eq!(pair, CoordPair::from_quad(0, 3, 1, 2));
        let pair: CoordPair = " e4,e3.".parse().unwrap();
        assert_eq!(pair, CoordPair::from_quad(4, 4, 4, 3));
        assert!("A3B".parse::<CoordPair>().is_err());
        assert!("13 B2".parse::<CoordPair>().is_err());
        assert_eq!(pair.to_string(), "E4 E3");
    }

    #[test]
    fn test_pair_geometry() {
        assert!(CoordPair::from_quad(1, 1, 1, 2).is_adjacent_cross());
        assert!(!CoordPair::from_quad(1, 1, 2, 2).is_adjacent_cross());
        assert!(!CoordPair::from_quad(1, 1, 1, 1).is_adjacent_cross());
        assert!(CoordPair::from_quad(1, 1, 1, 1).is_same_cell());
        assert_eq!(CoordPair::from_quad(2, 2, 1, 2).delta(), (-1, 0));
        assert_eq!(CoordPair::from_dim(5).iter_rectangle().count(), 25);
    }
}
