use super::mesh3d;
use crate::{BoxSize, GridSize};
use ndarray::{Array, Ix1, Ix4};
use num_complex::Complex;

/// Returns the wave numbers of an axis with `n` grid points and length `l`
/// in FFT standard order, without the factor `2 pi`.
///
/// For a grid size of `n`, the 0th-mode is at index `0`. Index `i <= n/2`
/// maps to `i / l`, larger indices to the negative frequencies `(i - n) / l`.
/// For even `n` the index `n/2` represents both the largest positive and
/// negative frequency. Its derivative is ambiguous in sign, so it is set to
/// zero.
///
/// Example (l = 1):
///     n = 10 => k = [0, 1, 2, 3, 4, 0, -4, -3, -2, -1]
///     n = 11 => k = [0, 1, 2, 3, 4, 5, -5, -4, -3, -2, -1]
///
pub fn signed_frequencies(n: usize, l: f64) -> Array<f64, Ix1> {
    let mut k = Array::from_iter((0..n).map(|i| {
        if i <= n / 2 {
            i as f64 / l
        } else {
            (i as f64 - n as f64) / l
        }
    }));

    if n % 2 == 0 && n > 0 {
        k[n / 2] = 0.;
    }

    k
}

/// Returns the non-negative half spectrum `[0, n/2]` of an axis with `n` grid
/// points and length `l`, as produced by a real-to-complex transform.
///
/// The Nyquist mode of an even axis is zeroed as in `signed_frequencies`.
///
/// Example (l = 1):
///     n = 10 => k = [0, 1, 2, 3, 4, 0]
///     n = 11 => k = [0, 1, 2, 3, 4, 5]
pub fn reduced_frequencies(n: usize, l: f64) -> Array<f64, Ix1> {
    let mut k = Array::from_iter((0..n / 2 + 1).map(|i| i as f64 / l));

    if n % 2 == 0 && n > 0 {
        k[n / 2] = 0.;
    }

    k
}

/// Returns a sampling of k values along all grid axes in table order
/// `[x, y, z]`. The innermost (x) axis is reduced to the non-negative half.
fn get_k_sampling(grid_size: GridSize, box_size: BoxSize) -> [Array<Complex<f64>, Ix1>; 3] {
    let to_complex = |k: Array<f64, Ix1>| k.mapv(|v| Complex::new(v, 0.));

    [
        to_complex(reduced_frequencies(grid_size.x, box_size.x)),
        to_complex(signed_frequencies(grid_size.y, box_size.y)),
        to_complex(signed_frequencies(grid_size.z, box_size.z)),
    ]
}

/// Returns a meshgrid of k values for a real-to-complex FFT in transform
/// layout.
///
/// The last axis holds the components of the k-vector in table order:
///     `res[iz, iy, ix, c] -> k_c[iz, iy, ix]`
/// with shape `[nz, ny, nx/2 + 1, 3]`. Imaginary parts are zero.
pub fn get_k_mesh(grid_size: GridSize, box_size: BoxSize) -> Array<Complex<f64>, Ix4> {
    let ks = get_k_sampling(grid_size, box_size);
    mesh3d::<Complex<f64>>(&ks)
}
