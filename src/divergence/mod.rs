//! Divergence of periodic fields by differentiation in Fourier space.

// Move unit test into own file
#[cfg(test)]
#[path = "./divergence_test.rs"]
mod divergence_test;

use crate::errors::*;
use crate::field::{DivergenceResult, FieldKind, StructuredField};
use crate::mesh::fft_helper::get_k_mesh;
use crate::mesh::layout::transform_shape;
use crate::{BoxSize, GridSize};
use ndarray::{Array, Array2, ArrayD, Ix4, IxDyn, Zip};
use ndrustfft::{ndfft, ndfft_r2c, ndifft, ndifft_r2c, FftHandler, R2cFftHandler};
use num_complex::Complex;

/// Differentiates fields living on one particular grid.
///
/// The transform handlers and the wave vector mesh depend only on grid and
/// domain size, so one solver is used for all fields of a dataset.
pub struct SpectralSolver {
    grid_size: GridSize,
    box_size: BoxSize,
    k_mesh: Array<Complex<f64>, Ix4>,
    fft_x: R2cFftHandler<f64>,
    fft_y: FftHandler<f64>,
    fft_z: FftHandler<f64>,
}

impl SpectralSolver {
    pub fn new(grid_size: GridSize, box_size: BoxSize) -> Result<SpectralSolver> {
        if grid_size.is_empty() {
            bail!(ErrorKind::ShapeMismatch(format!(
                "grid {:?} has no points",
                grid_size
            )));
        }

        if [box_size.x, box_size.y, box_size.z]
            .iter()
            .any(|l| !(l.is_finite() && *l > 0.))
        {
            bail!(ErrorKind::DegenerateGrid(format!(
                "domain size {:?} is not positive",
                box_size
            )));
        }

        Ok(SpectralSolver {
            grid_size,
            box_size,
            k_mesh: get_k_mesh(grid_size, box_size),
            fft_x: R2cFftHandler::<f64>::new(grid_size.x),
            fft_y: FftHandler::<f64>::new(grid_size.y),
            fft_z: FftHandler::<f64>::new(grid_size.z),
        })
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }

    /// Calculates the divergence of `field` spectrally.
    ///
    /// Given the DFT `F_k` of a field sampled with `N` points on a periodic
    /// domain of length `L`,
    /// ```latex
    ///     f_n = 1/N \sum_k F_k exp(2 pi i k n / N)
    /// ```
    /// the derivative at the sampling points is
    /// ```latex
    ///     f'_n = 1/N \sum_k (2 pi i k / L) F_k exp(2 pi i k n / N)
    /// ```
    /// The divergence contracts the last index of the field with these wave
    /// vectors. The Nyquist modes of even axes do not contribute.
    pub fn divergence(&mut self, field: &StructuredField) -> Result<DivergenceResult> {
        if field.grid() != self.grid_size {
            bail!(ErrorKind::ShapeMismatch(format!(
                "field lives on grid {:?}, solver on {:?}",
                field.grid(),
                self.grid_size
            )));
        }

        if field.size() != self.box_size {
            bail!(ErrorKind::ShapeMismatch(format!(
                "field has domain size {:?}, solver {:?}",
                field.size(),
                self.box_size
            )));
        }

        let kind = field.kind();

        debug!("Forward transform of {} field.", kind.name());
        let spectrum = self.forward(field.data());

        debug!("Contracting spectrum with wave vectors.");
        let div = self.contract(kind, spectrum)?;

        debug!("Inverse transform of divergence.");
        let data = self.inverse(div);

        Ok(DivergenceResult {
            grid: self.grid_size,
            source: kind,
            data,
        })
    }

    /// Real-to-complex transform along x, followed by complex transforms
    /// along y and z. Unnormalized.
    fn forward(&mut self, field: &ArrayD<f64>) -> ArrayD<Complex<f64>> {
        let mut shape = field.shape().to_vec();
        shape[2] = shape[2] / 2 + 1;

        let mut spectrum: ArrayD<Complex<f64>> = ArrayD::zeros(IxDyn(&shape));
        let mut work: ArrayD<Complex<f64>> = ArrayD::zeros(IxDyn(&shape));

        ndfft_r2c(field, &mut work, &mut self.fft_x, 2);
        ndfft(&work, &mut spectrum, &mut self.fft_y, 1);
        ndfft(&spectrum, &mut work, &mut self.fft_z, 0);

        work
    }

    /// Multiplies the spectrum with `2 pi i k` and contracts over the last
    /// field index. The component axes of the result follow the output
    /// layout of `kind`.
    fn contract(
        &self,
        kind: FieldKind,
        spectrum: ArrayD<Complex<f64>>,
    ) -> Result<ArrayD<Complex<f64>>> {
        let layout = kind.layout();
        let sh = spectrum.shape().to_vec();
        let n: usize = sh[..3].iter().product();

        let spectrum = spectrum
            .into_shape((n, layout.components))
            .chain_err(|| ErrorKind::ShapeMismatch("cannot flatten spectrum".to_string()))?;
        let k = self
            .k_mesh
            .view()
            .into_shape((n, 3))
            .chain_err(|| ErrorKind::ShapeMismatch("cannot flatten wave vectors".to_string()))?;

        let mut div: Array2<Complex<f64>> = Array2::zeros((n, layout.output_components));

        // every point is independent, so this can run in parallel
        Zip::from(div.rows_mut())
            .and(spectrum.rows())
            .and(k.rows())
            .par_for_each(|d, s, k| kind.contract(s, k, d));

        let mut div_shape = sh[..3].to_vec();
        div_shape.extend_from_slice(layout.output_shape);

        div.into_shape(IxDyn(&div_shape))
            .chain_err(|| ErrorKind::ShapeMismatch("cannot reshape divergence".to_string()))
    }

    /// Complex transforms along z and y, followed by a complex-to-real
    /// transform along x. Normalized by `1/N`.
    fn inverse(&mut self, mut spectrum: ArrayD<Complex<f64>>) -> ArrayD<f64> {
        let mut work: ArrayD<Complex<f64>> = ArrayD::zeros(spectrum.raw_dim());

        ndifft(&spectrum, &mut work, &mut self.fft_z, 0);
        ndifft(&work, &mut spectrum, &mut self.fft_y, 1);

        let mut shape = spectrum.shape().to_vec();
        shape[..3].copy_from_slice(&transform_shape(self.grid_size));

        let mut res: ArrayD<f64> = ArrayD::zeros(IxDyn(&shape));
        ndifft_r2c(&spectrum, &mut res, &mut self.fft_x, 2);

        res
    }
}

/// Returns the divergence of `field`, using a solver set up for its grid.
pub fn divergence(field: &StructuredField) -> Result<DivergenceResult> {
    let mut solver = SpectralSolver::new(field.grid(), field.size())?;
    solver.divergence(field)
}
