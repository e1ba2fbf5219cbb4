//! This crate computes the divergence of vector- and tensor-valued fields
//! sampled on a periodic, structured three-dimensional grid. Derivatives are
//! taken in Fourier space, see `divergence::SpectralSolver`.
//!
//! The data flows through a fixed pipeline:
//!
//! 1. `mesh::layout` reshapes a block of table rows (x fastest) into an array
//!    indexed `[z, y, x, components...]`.
//! 2. `mesh::fft_helper` samples the wave vectors of the grid.
//! 3. `divergence` transforms, contracts with `2 pi i k` and transforms back.
//! 4. `assemble` turns the result into table rows again.
//!
//! `table` and `pipeline` glue this to the ASCII table format used by the
//! `add_divergence` tool.

#![recursion_limit = "1024"]

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate ndarray;
#[macro_use]
extern crate serde_derive;

pub mod assemble;
pub mod consts;
pub mod divergence;
pub mod field;
pub mod mesh;
pub mod pipeline;
pub mod table;

#[cfg(test)]
mod test_helper;

/// Size of the periodic domain in arbitrary physical units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoxSize {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Size of the discrete grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GridSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridSize {
    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.x * self.y * self.z
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {
        foreign_links {
            Io(::std::io::Error);
            ParseFloat(::std::num::ParseFloatError);
        }

        errors {
            ShapeMismatch(msg: String) {
                description("array shape does not match the grid")
                display("shape mismatch: {}", msg)
            }
            InvalidFieldWidth(width: usize) {
                description("field width is neither 3 (vector) nor 9 (tensor)")
                display("invalid field width {}, expected 3 (vector) or 9 (tensor)", width)
            }
            DegenerateGrid(msg: String) {
                description("domain size is not positive")
                display("degenerate grid: {}", msg)
            }
            MissingLabel(label: String) {
                description("column label not found")
                display("column label '{}' not found", label)
            }
            TableFormat(msg: String) {
                description("malformed ASCII table")
                display("malformed table: {}", msg)
            }
        }
    }
}
