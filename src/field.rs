//! Field ranks and the real-space representation of a sampled field.

use crate::consts::TWOPI;
use crate::errors::*;
use crate::mesh::layout;
use crate::{BoxSize, GridSize};
use ndarray::{Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewMut1};
use num_complex::Complex;

/// Rank of a field that can be differentiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// First order, three components.
    Vector,
    /// Second order, nine components stored row-major as 3x3.
    Tensor,
}

/// Shape information of a field kind and of its divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub kind: FieldKind,
    /// Number of columns the field occupies in a table.
    pub components: usize,
    /// Number of columns of its divergence.
    pub output_components: usize,
    /// Trailing axes of the field array.
    pub shape: &'static [usize],
    /// Trailing axes of the divergence array.
    pub output_shape: &'static [usize],
}

const VECTOR_LAYOUT: FieldLayout = FieldLayout {
    kind: FieldKind::Vector,
    components: 3,
    output_components: 1,
    shape: &[3],
    output_shape: &[],
};

const TENSOR_LAYOUT: FieldLayout = FieldLayout {
    kind: FieldKind::Tensor,
    components: 9,
    output_components: 3,
    shape: &[3, 3],
    output_shape: &[3],
};

impl FieldKind {
    /// Looks up the field kind of a column block of width `width`.
    pub fn from_width(width: usize) -> Result<FieldKind> {
        match width {
            3 => Ok(FieldKind::Vector),
            9 => Ok(FieldKind::Tensor),
            w => bail!(ErrorKind::InvalidFieldWidth(w)),
        }
    }

    pub fn layout(self) -> &'static FieldLayout {
        match self {
            FieldKind::Vector => &VECTOR_LAYOUT,
            FieldKind::Tensor => &TENSOR_LAYOUT,
        }
    }

    pub fn components(self) -> usize {
        self.layout().components
    }

    pub fn output_components(self) -> usize {
        self.layout().output_components
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Vector => "vector",
            FieldKind::Tensor => "tensor",
        }
    }

    /// Contracts the Fourier coefficients `spec` of one grid point with its
    /// wave vector `k` and writes `2 pi i (spec . k)` into `out`.
    ///
    /// For a tensor the contraction runs over the last (column) index,
    /// `out_i = 2 pi i sum_j spec_ij k_j`.
    pub fn contract(
        self,
        spec: ArrayView1<Complex<f64>>,
        k: ArrayView1<Complex<f64>>,
        mut out: ArrayViewMut1<Complex<f64>>,
    ) {
        let twopii = Complex::new(0., TWOPI);

        match self {
            FieldKind::Vector => {
                out[0] = spec.dot(&k) * twopii;
            }
            FieldKind::Tensor => {
                for (i, o) in out.iter_mut().enumerate() {
                    let row = spec.slice(s![3 * i..3 * i + 3]);
                    *o = row.dot(&k) * twopii;
                }
            }
        }
    }
}

/// Field sampled on a periodic grid. The backing array is indexed
/// `[z, y, x, components...]`.
#[derive(Debug, Clone)]
pub struct StructuredField {
    grid: GridSize,
    size: BoxSize,
    kind: FieldKind,
    data: ArrayD<f64>,
}

impl StructuredField {
    /// Builds a field from a block of table rows, where x varies fastest.
    pub fn from_rows(
        rows: ArrayView2<f64>,
        grid: GridSize,
        size: BoxSize,
        kind: FieldKind,
    ) -> Result<StructuredField> {
        let data = layout::to_grid(rows, grid, kind)?;

        Ok(StructuredField {
            grid,
            size,
            kind,
            data,
        })
    }

    /// Wraps an array already in transform layout. The kind is determined by
    /// the trailing axes.
    pub fn from_array(data: ArrayD<f64>, size: BoxSize) -> Result<StructuredField> {
        let sh = data.shape();
        if sh.len() < 3 {
            bail!(ErrorKind::ShapeMismatch(format!(
                "expected at least three spatial axes, got shape {:?}",
                sh
            )));
        }

        let width: usize = sh[3..].iter().product();
        let kind = FieldKind::from_width(width)?;
        if &sh[3..] != kind.layout().shape {
            bail!(ErrorKind::ShapeMismatch(format!(
                "trailing axes {:?} do not describe a {}",
                &sh[3..],
                kind.name()
            )));
        }

        let grid = GridSize {
            x: sh[2],
            y: sh[1],
            z: sh[0],
        };

        Ok(StructuredField {
            grid,
            size,
            kind,
            data,
        })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn size(&self) -> BoxSize {
        self.size
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }
}

/// Divergence of a `StructuredField`. Its rank is reduced by one compared to
/// the source field.
#[derive(Debug, Clone)]
pub struct DivergenceResult {
    pub grid: GridSize,
    /// Kind of the differentiated field.
    pub source: FieldKind,
    /// Real space result, indexed `[z, y, x]` or `[z, y, x, i]`.
    pub data: ArrayD<f64>,
}

impl DivergenceResult {
    pub fn output_components(&self) -> usize {
        self.source.output_components()
    }

    /// Result in row-major table layout.
    pub fn to_rows(&self) -> Result<Array2<f64>> {
        layout::to_rows(&self.data)
    }
}
