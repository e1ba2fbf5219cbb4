//! Conversion of divergence results back into labelled table columns.

use crate::errors::*;
use crate::field::{DivergenceResult, FieldKind};
use ndarray::{concatenate, Array2, ArrayView2, Axis};

/// Row-major rows of a result, one column per output component.
pub fn to_rows(result: &DivergenceResult) -> Result<Array2<f64>> {
    let rows = result.to_rows()?;

    if rows.ncols() != result.output_components() {
        bail!(ErrorKind::ShapeMismatch(format!(
            "divergence of a {} has {} columns, expected {}",
            result.source.name(),
            rows.ncols(),
            result.output_components()
        )));
    }

    Ok(rows)
}

/// Column labels of the divergence of the field `label`.
///
/// A vector yields the single column `divFFT(label)`, a tensor the three
/// columns `1_divFFT(label)` to `3_divFFT(label)`.
pub fn divergence_labels(label: &str, kind: FieldKind) -> Vec<String> {
    let name = format!("divFFT({})", label);

    match kind {
        FieldKind::Vector => vec![name],
        FieldKind::Tensor => (1..=kind.output_components())
            .map(|i| format!("{}_{}", i, name))
            .collect(),
    }
}

/// Collects result blocks to be appended to an existing set of rows.
#[derive(Debug)]
pub struct Assembler {
    nrows: usize,
    labels: Vec<String>,
    blocks: Vec<Array2<f64>>,
}

impl Assembler {
    /// Assembler for results belonging to a dataset with `nrows` rows.
    pub fn new(nrows: usize) -> Assembler {
        Assembler {
            nrows,
            labels: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Adds the divergence of field `label`.
    pub fn push(&mut self, label: &str, result: &DivergenceResult) -> Result<()> {
        let rows = to_rows(result)?;
        let labels = divergence_labels(label, result.source);

        self.push_block(labels, rows)
    }

    /// Adds a block of columns with their labels.
    pub fn push_block(&mut self, labels: Vec<String>, block: Array2<f64>) -> Result<()> {
        if block.nrows() != self.nrows {
            bail!(ErrorKind::ShapeMismatch(format!(
                "block {:?} has {} rows, the dataset {}",
                labels,
                block.nrows(),
                self.nrows
            )));
        }

        if block.ncols() != labels.len() {
            bail!(ErrorKind::ShapeMismatch(format!(
                "{} labels for a block of {} columns",
                labels.len(),
                block.ncols()
            )));
        }

        self.labels.extend(labels);
        self.blocks.push(block);

        Ok(())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All collected blocks side by side, in the order they were added.
    pub fn columns(&self) -> Result<Array2<f64>> {
        if self.blocks.is_empty() {
            return Ok(Array2::zeros((self.nrows, 0)));
        }

        let views: Vec<ArrayView2<f64>> = self.blocks.iter().map(|b| b.view()).collect();

        concatenate(Axis(1), &views)
            .chain_err(|| ErrorKind::ShapeMismatch("cannot join result blocks".to_string()))
    }

    /// Consumes the assembler, returning labels and the joined columns.
    pub fn finish(self) -> Result<(Vec<String>, Array2<f64>)> {
        let columns = self.columns()?;
        Ok((self.labels, columns))
    }
}
