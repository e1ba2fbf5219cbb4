//! Grid related helpers: layout conversion, wave vectors and geometry.

use ndarray::{Array, Axis, Ix1, Ix4};

pub mod fft_helper;
pub mod geometry;
pub mod grid_width;
pub mod layout;

/// Builds a meshgrid of 3-vectors from per-axis samplings given in table
/// order `[x, y, z]`.
///
/// The result is in transform layout with the vector components as the
/// trailing axis: `res[iz, iy, ix, c] -> k_c`, where `k_0 = k[0][ix]`,
/// `k_1 = k[1][iy]` and `k_2 = k[2][iz]`.
pub fn mesh3d<T: Clone + Default>(k: &[Array<T, Ix1>; 3]) -> Array<T, Ix4> {
    let sh_x = k[0].len();
    let sh_y = k[1].len();
    let sh_z = k[2].len();

    let mut res = Array::from_elem([sh_z, sh_y, sh_x, 3], T::default());

    // first component varies along innermost axis of field
    for (kx, mut x) in k[0]
        .iter()
        .zip(res.index_axis_mut(Axis(3), 0).axis_iter_mut(Axis(2)))
    {
        x.fill(kx.clone());
    }

    // second component varies along second axis of field
    for (ky, mut y) in k[1]
        .iter()
        .zip(res.index_axis_mut(Axis(3), 1).axis_iter_mut(Axis(1)))
    {
        y.fill(ky.clone());
    }

    // third component varies along outermost axis of field
    for (kz, mut z) in k[2]
        .iter()
        .zip(res.index_axis_mut(Axis(3), 2).axis_iter_mut(Axis(0)))
    {
        z.fill(kz.clone());
    }

    res
}
