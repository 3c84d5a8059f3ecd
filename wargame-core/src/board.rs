//! Square board storage

use crate::coord::{Coord, CoordPair};
use crate::units::{Team, Unit};

/// dim x dim grid, each cell empty or holding one unit (row-major, dense)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    dim: usize,
    cells: Vec<Option<Unit>>,
}

impl Board {
    /// Empty board
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            cells: vec![None; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_valid(&self, coord: Coord) -> bool {
        coord.is_within(self.dim)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.is_valid(coord)
            .then(|| coord.row as usize * self.dim + coord.col as usize)
    }

    /// Unit at coord; None for empty or out-of-bounds cells
    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Unit> {
        let i = self.index(coord)?;
        self.cells[i].as_mut()
    }

    /// Overwrite a cell; ignored when out of bounds
    pub fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = unit;
        }
    }

    /// Clear a cell and return what it held
    pub fn remove(&mut self, coord: Coord) -> Option<Unit> {
        let i = self.index(coord)?;
        self.cells[i].take()
    }

    pub fn is_empty_cell(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Occupied cells in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        CoordPair::from_dim(self.dim)
            .iter_rectangle()
            .filter_map(move |coord| self.get(coord).map(|unit| (coord, *unit)))
    }

    /// Units of one team in row-major order
    pub fn team_units(&self, team: Team) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.units().filter(move |(_, unit)| unit.team == team)
    }

    pub fn unit_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitType;

    #[test]
    fn test_out_of_bounds_is_absorbed() {
        let mut board = Board::new(3);
        board.set(Coord::new(3, 0), Some(Unit::new(Team::Attacker, UnitType::AI)));
        assert_eq!(board.unit_count(), 0);
        assert!(board.get(Coord::new(-1, 0)).is_none());
        assert!(board.remove(Coord::new(0, 7)).is_none());
    }

    #[test]
    fn test_team_units_scan_order() {
        let mut board = Board::new(3);
        board.set(Coord::new(2, 2), Some(Unit::new(Team::Attacker, UnitType::AI)));
        board.set(Coord::new(0, 1), Some(Unit::new(Team::Attacker, UnitType::Virus)));
        board.set(Coord::new(1, 1), Some(Unit::new(Team::Defender, UnitType::AI)));
        let coords: Vec<_> = board.team_units(Team::Attacker).map(|(c, _)| c).collect();
        assert_eq!(coords, vec![Coord::new(0, 1), Coord::new(2, 2)]);
    }
}
