//! Immutable grid the battle is fought on.

use serde::{Deserialize, Serialize};

use crate::{blueprint::BoardBlueprint, error::BlueprintError};

/// Single board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Column and row of the tile's sprite inside the tile atlas.
    pub atlas: [u32; 2],
    /// Whether the tile blocks movement.
    pub solid: bool,
}

impl Cell {
    /// Walkable tile drawn from the given atlas position.
    #[must_use]
    pub const fn open(column: u32, row: u32) -> Self {
        Self {
            atlas: [column, row],
            solid: false,
        }
    }

    /// Blocking tile drawn from the given atlas position.
    #[must_use]
    pub const fn solid(column: u32, row: u32) -> Self {
        Self {
            atlas: [column, row],
            solid: true,
        }
    }
}

/// Rectangular grid of cells, fixed once the session is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds the board, checking that the cells cover the grid exactly.
    pub fn new(blueprint: &BoardBlueprint) -> Result<Self, BlueprintError> {
        let expected = blueprint.width as usize * blueprint.height as usize;
        if blueprint.cells.len() != expected {
            return Err(BlueprintError::BoardSize {
                width: blueprint.width,
                height: blueprint.height,
                expected,
                actual: blueprint.cells.len(),
            });
        }
        Ok(Self {
            width: blueprint.width,
            height: blueprint.height,
            cells: blueprint.cells.clone(),
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at the given column and row, if it lies on the board.
    #[must_use]
    pub fn cell_at(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, Cell};
    use crate::{
        blueprint::{BoardBlueprint, SessionBlueprint},
        error::BlueprintError,
    };

    #[test]
    fn cell_lookup_is_row_major() {
        let board = Board::new(&BoardBlueprint {
            width: 2,
            height: 2,
            cells: vec![
                Cell::open(0, 0),
                Cell::solid(1, 0),
                Cell::open(2, 0),
                Cell::open(3, 0),
            ],
        })
        .expect("board matches its size");

        assert_eq!(board.cell_at(1, 0), Some(&Cell::solid(1, 0)));
        assert_eq!(board.cell_at(0, 1), Some(&Cell::open(2, 0)));
        assert_eq!(board.cell_at(2, 0), None);
    }

    #[test]
    fn cells_must_cover_the_grid_exactly() {
        let error = Board::new(&BoardBlueprint {
            width: 3,
            height: 2,
            cells: vec![Cell::open(0, 0); 5],
        })
        .expect_err("one cell short");
        assert_eq!(
            error,
            BlueprintError::BoardSize {
                width: 3,
                height: 2,
                expected: 6,
                actual: 5,
            }
        );
    }

    #[test]
    fn reference_bridges_are_walkable() {
        let board = Board::new(&SessionBlueprint::reference().board).expect("reference board");
        assert!(board.cell_at(5, 1).is_some_and(|cell| !cell.solid));
        assert!(board.cell_at(5, 3).is_some_and(|cell| cell.solid));
    }
}
