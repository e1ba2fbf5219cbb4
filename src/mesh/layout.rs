//! Conversion between table rows and arrays in transform layout.
//!
//! Tables store one grid point per row with x varying fastest. The transform
//! layout indexes arrays as `[z, y, x, components...]`, so that x is the
//! innermost (contiguous) axis. Both describe the same memory order, only
//! the axis order of the grid description is reversed. `transform_shape`
//! is the one place where this reversal happens.

use crate::errors::*;
use crate::field::FieldKind;
use crate::GridSize;
use ndarray::{Array, Array2, ArrayD, ArrayView2, IxDyn};

/// Spatial shape in transform layout, `[nz, ny, nx]`.
pub fn transform_shape(grid: GridSize) -> [usize; 3] {
    [grid.z, grid.y, grid.x]
}

/// Reshapes a block of table rows into an array indexed
/// `[z, y, x, components...]`.
///
/// The block has to hold exactly one row per grid point and
/// `kind.components()` columns. It does not need to be contiguous, so views
/// into a wider table can be passed directly.
pub fn to_grid(rows: ArrayView2<f64>, grid: GridSize, kind: FieldKind) -> Result<ArrayD<f64>> {
    let (nrows, ncols) = rows.dim();

    if nrows != grid.len() {
        bail!(ErrorKind::ShapeMismatch(format!(
            "{} rows do not match a grid of {} x {} x {} = {} points",
            nrows,
            grid.x,
            grid.y,
            grid.z,
            grid.len()
        )));
    }

    if ncols != kind.components() {
        bail!(ErrorKind::ShapeMismatch(format!(
            "a {} needs {} columns, got {}",
            kind.name(),
            kind.components(),
            ncols
        )));
    }

    let mut shape = transform_shape(grid).to_vec();
    shape.extend_from_slice(kind.layout().shape);

    // `iter` walks the rows in logical order, regardless of the strides of
    // the view
    Array::from_shape_vec(IxDyn(&shape), rows.iter().cloned().collect())
        .chain_err(|| ErrorKind::ShapeMismatch(format!("cannot reshape rows into {:?}", shape)))
}

/// Flattens the spatial axes of an array in transform layout back into table
/// rows. Trailing axes become the columns, a scalar field yields a single
/// column.
pub fn to_rows(field: &ArrayD<f64>) -> Result<Array2<f64>> {
    let sh = field.shape();

    if sh.len() < 3 {
        bail!(ErrorKind::ShapeMismatch(format!(
            "expected at least three spatial axes, got shape {:?}",
            sh
        )));
    }

    let n: usize = sh[..3].iter().product();
    let width: usize = sh[3..].iter().product();

    Array::from_shape_vec((n, width), field.iter().cloned().collect()).chain_err(|| {
        ErrorKind::ShapeMismatch(format!("cannot flatten {:?} into rows", sh))
    })
}
