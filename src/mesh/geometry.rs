//! Grid resolution and domain size derived from coordinate columns.

use super::grid_width::GridWidth;
use crate::errors::*;
use crate::{BoxSize, GridSize};
use ndarray::{ArrayView1, ArrayView2, Axis};
use std::cmp::Ordering;

/// Geometry of a periodic dataset given by the coordinates of its grid
/// points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub grid: GridSize,
    pub size: BoxSize,
    /// Smallest coordinate along every axis.
    pub origin: [f64; 3],
}

impl Geometry {
    /// Derives grid and size from a block of three coordinate columns.
    ///
    /// The grid is given by the number of unique values along each axis. The
    /// coordinates are assumed to be cell centers, so the size spans from
    /// edge to edge: `size = n / (n - 1) * (max - min)`. An axis with a
    /// single point gets the smallest spacing among the other axes.
    pub fn from_coordinates(coords: ArrayView2<f64>) -> Result<Geometry> {
        if coords.ncols() != 3 {
            bail!(ErrorKind::ShapeMismatch(format!(
                "coordinates need 3 columns, got {}",
                coords.ncols()
            )));
        }

        if coords.nrows() == 0 {
            bail!(ErrorKind::ShapeMismatch("no coordinates given".to_string()));
        }

        let mut grid = [0usize; 3];
        let mut min = [0f64; 3];
        let mut max = [0f64; 3];

        for (i, col) in coords.axis_iter(Axis(1)).enumerate() {
            let u = unique_values(col)?;
            grid[i] = u.len();
            min[i] = u[0];
            max[i] = u[u.len() - 1];
        }

        let mut size = [0f64; 3];
        for i in 0..3 {
            let n = grid[i] as f64;
            size[i] = n / (n - 1.).max(1.) * (max[i] - min[i]);
        }

        let spacing = (0..3)
            .filter(|&i| grid[i] > 1)
            .map(|i| size[i] / grid[i] as f64)
            .fold(::std::f64::INFINITY, f64::min);

        if !spacing.is_finite() {
            bail!(ErrorKind::DegenerateGrid(
                "every axis consists of a single point".to_string()
            ));
        }

        for i in 0..3 {
            if grid[i] == 1 {
                size[i] = spacing;
            }
        }

        if size.iter().any(|s| !(s.is_finite() && *s > 0.)) {
            bail!(ErrorKind::DegenerateGrid(format!(
                "domain size {:?} is not positive",
                size
            )));
        }

        Ok(Geometry {
            grid: GridSize {
                x: grid[0],
                y: grid[1],
                z: grid[2],
            },
            size: BoxSize {
                x: size[0],
                y: size[1],
                z: size[2],
            },
            origin: min,
        })
    }

    pub fn grid_width(&self) -> GridWidth {
        GridWidth::new(self.grid, self.size)
    }
}

/// Sorted unique values of a coordinate column.
fn unique_values(col: ArrayView1<f64>) -> Result<Vec<f64>> {
    if col.iter().any(|v| !v.is_finite()) {
        bail!(ErrorKind::TableFormat(
            "coordinates contain non-finite values".to_string()
        ));
    }

    let mut u = col.to_vec();
    u.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    u.dedup();

    Ok(u)
}
