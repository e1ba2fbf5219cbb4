//! Plain ASCII tables with a labelled header.
//!
//! A table starts with a line `<n>\theader`, followed by `n` header lines.
//! The last header line holds the column labels, all others are free text.
//! Columns of multi-component quantities are labelled `1_<label>`,
//! `2_<label>`, and so on. Data lines hold whitespace separated numbers.

use crate::errors::*;
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use std::io::{BufRead, Write};

/// Column labels and data of an ASCII table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    info: Vec<String>,
    labels: Vec<String>,
    data: Array2<f64>,
}

impl Table {
    pub fn new(info: Vec<String>, labels: Vec<String>, data: Array2<f64>) -> Result<Table> {
        if labels.len() != data.ncols() {
            bail!(ErrorKind::TableFormat(format!(
                "{} labels for {} columns",
                labels.len(),
                data.ncols()
            )));
        }

        Ok(Table { info, labels, data })
    }

    /// Parses a table. Blank lines are skipped.
    pub fn read<R: BufRead>(reader: R) -> Result<Table> {
        let mut lines = reader.lines().enumerate();

        let first = match lines.next() {
            Some((_, l)) => l?,
            None => bail!(ErrorKind::TableFormat("empty input".to_string())),
        };

        let (info, labels) = match header_length(&first) {
            Some(n) => {
                if n == 0 {
                    bail!(ErrorKind::TableFormat(
                        "header does not contain column labels".to_string()
                    ));
                }

                let mut header = Vec::with_capacity(n);
                for _ in 0..n {
                    match lines.next() {
                        Some((_, l)) => header.push(l?),
                        None => bail!(ErrorKind::TableFormat(format!(
                            "header announces {} lines, got {}",
                            n,
                            header.len()
                        ))),
                    }
                }

                let labels = header.pop().unwrap_or_default();
                (header, labels)
            }
            None => (Vec::new(), first),
        };

        let labels: Vec<String> = labels.split_whitespace().map(String::from).collect();
        if labels.is_empty() {
            bail!(ErrorKind::TableFormat("no column labels".to_string()));
        }

        let ncols = labels.len();
        let mut values = Vec::new();
        let mut nrows = 0;

        for (i, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let start = values.len();
            for v in line.split_whitespace() {
                let v: f64 = v.parse().chain_err(|| {
                    ErrorKind::TableFormat(format!("cannot parse '{}' in line {}", v, i + 1))
                })?;
                values.push(v);
            }

            if values.len() - start != ncols {
                bail!(ErrorKind::TableFormat(format!(
                    "line {} has {} values, expected {}",
                    i + 1,
                    values.len() - start,
                    ncols
                )));
            }

            nrows += 1;
        }

        let data = Array2::from_shape_vec((nrows, ncols), values)
            .chain_err(|| ErrorKind::TableFormat("cannot arrange data".to_string()))?;

        debug!("Read table with {} rows and {} columns.", nrows, ncols);

        Table::new(info, labels, data)
    }

    /// Writes the table with `precision` significant digits.
    pub fn write<W: Write>(&self, mut writer: W, precision: usize) -> Result<()> {
        writeln!(writer, "{}\theader", self.info.len() + 1)?;

        for l in &self.info {
            writeln!(writer, "{}", l)?;
        }

        writeln!(writer, "{}", self.labels.join("\t"))?;

        for row in self.data.rows() {
            let line: Vec<String> = row.iter().map(|v| format_g(*v, precision)).collect();
            writeln!(writer, "{}", line.join("\t"))?;
        }

        writer.flush()?;

        Ok(())
    }

    pub fn info(&self) -> &[String] {
        &self.info
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Adds a free text line to the header.
    pub fn append_info(&mut self, line: &str) {
        self.info.push(line.to_string());
    }

    /// Index of the first column of `label`.
    pub fn label_index(&self, label: &str) -> Result<usize> {
        let first = format!("1_{}", label);

        self.labels
            .iter()
            .position(|l| l == label)
            .or_else(|| self.labels.iter().position(|l| *l == first))
            .ok_or_else(|| ErrorKind::MissingLabel(label.to_string()).into())
    }

    /// Number of columns of `label`: 1 if it exists verbatim, otherwise the
    /// number of consecutive `i_<label>` columns.
    pub fn label_dimension(&self, label: &str) -> Result<usize> {
        if self.labels.iter().any(|l| l == label) {
            return Ok(1);
        }

        let has = |i: usize| {
            let name = format!("{}_{}", i, label);
            self.labels.iter().any(|l| *l == name)
        };

        let dim = (1..).take_while(|i| has(*i)).count();
        if dim == 0 {
            bail!(ErrorKind::MissingLabel(label.to_string()));
        }

        Ok(dim)
    }

    /// Column range `(start, width)` of `label`. The components have to be
    /// stored side by side in ascending order.
    pub fn column_block(&self, label: &str) -> Result<(usize, usize)> {
        let start = self.label_index(label)?;
        let width = self.label_dimension(label)?;

        if width > 1 {
            let ordered = (0..width).all(|i| {
                self.labels
                    .get(start + i)
                    .map_or(false, |l| *l == format!("{}_{}", i + 1, label))
            });

            if !ordered {
                bail!(ErrorKind::ShapeMismatch(format!(
                    "columns of '{}' are not contiguous",
                    label
                )));
            }
        }

        Ok((start, width))
    }

    /// View of the columns of `label`.
    pub fn block(&self, label: &str) -> Result<ArrayView2<f64>> {
        let (start, width) = self.column_block(label)?;
        Ok(self.data.slice(s![.., start..start + width]))
    }

    /// Appends labelled columns to the right.
    pub fn append_columns(&mut self, labels: Vec<String>, columns: ArrayView2<f64>) -> Result<()> {
        if columns.nrows() != self.nrows() {
            bail!(ErrorKind::ShapeMismatch(format!(
                "{} rows cannot be appended to a table of {} rows",
                columns.nrows(),
                self.nrows()
            )));
        }

        if columns.ncols() != labels.len() {
            bail!(ErrorKind::TableFormat(format!(
                "{} labels for {} columns",
                labels.len(),
                columns.ncols()
            )));
        }

        let joined = concatenate(Axis(1), &[self.data.view(), columns.view()])
            .chain_err(|| ErrorKind::ShapeMismatch("cannot append columns".to_string()))?;
        self.data = joined;
        self.labels.extend(labels);

        Ok(())
    }
}

/// Number of header lines announced by a line like `3\theader`.
fn header_length(line: &str) -> Option<usize> {
    let mut tokens = line.split_whitespace();

    let n = tokens.next()?.parse().ok()?;
    match tokens.next() {
        Some(t) if t.starts_with("head") => Some(n),
        _ => None,
    }
}

/// Formats `v` like C's `%.<precision>g`.
///
/// Uses scientific notation if the decimal exponent is smaller than -4 or
/// not smaller than the precision. Trailing zeros are removed.
pub fn format_g(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }

    if v.is_infinite() {
        return if v > 0. { "inf" } else { "-inf" }.to_string();
    }

    let p = precision.max(1);

    // rounding to p digits may change the exponent, so take it from the
    // rounded representation
    let sci = format!("{:.*e}", p - 1, v);
    let (mantissa, exp) = match sci.find('e') {
        Some(i) => (&sci[..i], sci[i + 1..].parse::<i32>().unwrap_or(0)),
        None => (&sci[..], 0),
    };

    if exp < -4 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_zeros(mantissa),
            sign,
            exp.abs()
        )
    } else {
        let decimals = (p as i32 - 1 - exp) as usize;
        strip_zeros(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
