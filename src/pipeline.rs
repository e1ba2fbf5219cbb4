//! Adds the divergence of requested fields to a table.

// Move unit test into own file
#[cfg(test)]
#[path = "./pipeline_test.rs"]
mod pipeline_test;

use crate::assemble::Assembler;
use crate::divergence::SpectralSolver;
use crate::errors::*;
use crate::field::{FieldKind, StructuredField};
use crate::mesh::geometry::Geometry;
use crate::table::Table;

/// Labels of the coordinates and of the fields to differentiate.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub position: String,
    pub vectors: Vec<String>,
    pub tensors: Vec<String>,
}

impl FieldRequest {
    /// Requested fields in processing order, vectors first.
    pub fn fields(&self) -> impl Iterator<Item = (FieldKind, &str)> {
        let v = self
            .vectors
            .iter()
            .map(|l| (FieldKind::Vector, l.as_str()));
        let t = self
            .tensors
            .iter()
            .map(|l| (FieldKind::Tensor, l.as_str()));

        v.chain(t)
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty() && self.tensors.is_empty()
    }
}

/// A validated field: its label and what it is.
struct Column<'a> {
    label: &'a str,
    kind: FieldKind,
}

/// Looks up the columns of `label` and checks that their number fits
/// `kind`.
fn resolve<'a>(table: &Table, label: &'a str, kind: FieldKind) -> Result<Column<'a>> {
    let (_, width) = table.column_block(label)?;

    if FieldKind::from_width(width)? != kind {
        bail!(ErrorKind::ShapeMismatch(format!(
            "'{}' has {} columns, a {} needs {}",
            label,
            width,
            kind.name(),
            kind.components()
        )));
    }

    Ok(Column { label, kind })
}

/// Calculates the divergence of every requested field and appends it to
/// `table`.
///
/// All labels are validated before the first transform. The table is only
/// modified if every field could be differentiated.
pub fn add_divergence(table: &mut Table, request: &FieldRequest) -> Result<Geometry> {
    let coords = table.block(&request.position)?;
    if coords.ncols() != 3 {
        bail!(ErrorKind::ShapeMismatch(format!(
            "coordinates '{}' have {} columns, expected 3",
            request.position,
            coords.ncols()
        )));
    }

    let columns = request
        .fields()
        .map(|(kind, label)| resolve(table, label, kind))
        .collect::<Result<Vec<_>>>()?;

    let geometry = Geometry::from_coordinates(coords)?;
    let gw = geometry.grid_width();

    info!(
        "Grid {} x {} x {}, domain size {} x {} x {}, spacing {} x {} x {}.",
        geometry.grid.x,
        geometry.grid.y,
        geometry.grid.z,
        geometry.size.x,
        geometry.size.y,
        geometry.size.z,
        gw.x,
        gw.y,
        gw.z
    );

    if geometry.grid.len() != table.nrows() {
        bail!(ErrorKind::ShapeMismatch(format!(
            "{} rows do not match a grid of {} points",
            table.nrows(),
            geometry.grid.len()
        )));
    }

    let mut solver = SpectralSolver::new(geometry.grid, geometry.size)?;
    let mut assembler = Assembler::new(table.nrows());

    for c in &columns {
        let rows = table.block(c.label)?;

        let field = StructuredField::from_rows(rows, geometry.grid, geometry.size, c.kind)
            .chain_err(|| format!("cannot arrange '{}' on the grid", c.label))?;
        let div = solver
            .divergence(&field)
            .chain_err(|| format!("cannot differentiate '{}'", c.label))?;

        debug!("Differentiated {} '{}'.", c.kind.name(), c.label);
        assembler.push(c.label, &div)?;
    }

    let (labels, values) = assembler.finish()?;
    table.append_columns(labels, values.view())?;

    Ok(geometry)
}
