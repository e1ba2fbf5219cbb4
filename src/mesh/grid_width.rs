//! Spacing of grid points along every axis.

use crate::{BoxSize, GridSize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridWidth {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GridWidth {
    /// Calculates width of a grid cell given the number of cells and box size.
    pub fn new(grid_size: GridSize, box_size: BoxSize) -> GridWidth {
        GridWidth {
            x: box_size.x / grid_size.x as f64,
            y: box_size.y / grid_size.y as f64,
            z: box_size.z / grid_size.z as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_width() {
        let gw = GridWidth::new(
            GridSize { x: 4, y: 2, z: 1 },
            BoxSize {
                x: 1.,
                y: 3.,
                z: 0.5,
            },
        );

        assert_eq!(gw, GridWidth { x: 0.25, y: 1.5, z: 0.5 });
    }
}
