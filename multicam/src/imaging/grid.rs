//! 2x2 grid composite.

use super::composition_error;
use super::overlay::placeholder_tile;
use crate::error::{CameraError, Result};
use crate::mux::Slot;
use opencv::core::{self, Mat};
use opencv::prelude::*;

/// Cells in a grid composite
pub const GRID_CELLS: usize = 4;

/// Lays out four equally sized cells in slot order:
/// 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
///
/// Missing trailing cells are filled with placeholder tiles.
///
/// # Returns
/// * `Err(CameraError::Composition)` - More than four cells, or a cell that is
///   not `cell_width` x `cell_height`
pub fn compose_grid(mut cells: Vec<Mat>, cell_width: i32, cell_height: i32) -> Result<Mat> {
    if cells.len() > GRID_CELLS {
        return Err(CameraError::Composition(format!(
            "Grid holds {} cells, got {}",
            GRID_CELLS,
            cells.len()
        )));
    }

    while cells.len() < GRID_CELLS {
        let slot = Slot(cells.len() as u8);
        cells.push(placeholder_tile(cell_width, cell_height, &slot.label())?);
    }

    for (index, cell) in cells.iter().enumerate() {
        if cell.cols() != cell_width || cell.rows() != cell_height {
            return Err(CameraError::Composition(format!(
                "Cell {} is {}x{}, expected {}x{}",
                index,
                cell.cols(),
                cell.rows(),
                cell_width,
                cell_height
            )));
        }
    }

    let mut top = Mat::default();
    core::hconcat2(&cells[0], &cells[1], &mut top).map_err(composition_error("grid top row"))?;
    let mut bottom = Mat::default();
    core::hconcat2(&cells[2], &cells[3], &mut bottom)
        .map_err(composition_error("grid bottom row"))?;

    let mut grid = Mat::default();
    core::vconcat2(&top, &bottom, &mut grid).map_err(composition_error("grid rows"))?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{pixel, solid};
    use super::*;

    #[test]
    fn test_grid_layout() {
        let cells = vec![
            solid(10, 20, 255.0, 0.0, 0.0),
            solid(10, 20, 0.0, 255.0, 0.0),
            solid(10, 20, 0.0, 0.0, 255.0),
            solid(10, 20, 255.0, 255.0, 255.0),
        ];

        let grid = compose_grid(cells, 20, 10).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (40, 20));
        assert_eq!(pixel(&grid, 5, 10), (255, 0, 0));
        assert_eq!(pixel(&grid, 5, 30), (0, 255, 0));
        assert_eq!(pixel(&grid, 15, 10), (0, 0, 255));
        assert_eq!(pixel(&grid, 15, 30), (255, 255, 255));
    }

    #[test]
    fn test_missing_cells_filled() {
        let grid = compose_grid(vec![solid(60, 80, 0.0, 0.0, 0.0)], 80, 60).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (160, 120));
        // bottom-right corner comes from a placeholder border
        assert_eq!(pixel(&grid, 119, 159), (0, 0, 255));
    }

    #[test]
    fn test_size_mismatch() {
        let cells = vec![
            solid(10, 20, 0.0, 0.0, 0.0),
            solid(10, 21, 0.0, 0.0, 0.0),
        ];
        assert!(matches!(
            compose_grid(cells, 20, 10),
            Err(CameraError::Composition(_))
        ));
    }

    #[test]
    fn test_too_many_cells() {
        let cells = (0..5).map(|_| solid(2, 2, 0.0, 0.0, 0.0)).collect();
        assert!(compose_grid(cells, 2, 2).is_err());
    }
}
