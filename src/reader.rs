use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::errors::Result;

/// One IV sweep: bias and current samples in file order.
///
/// Samples are only ever appended pairwise, so both columns always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IvSeries {
    bias: Vec<f64>,
    current: Vec<f64>,
}

impl IvSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut series = Self::new();
        for (bias, current) in pairs {
            series.push(bias, current);
        }
        series
    }

    fn push(&mut self, bias: f64, current: f64) {
        self.bias.push(bias);
        self.current.push(current);
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.bias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.bias.iter().copied().zip(self.current.iter().copied())
    }
}

/// Parses a `<bias> <current>` row. Anything other than exactly two finite
/// numbers yields `None`.
fn parse_pair(line: &str) -> Option<(f64, f64)> {
    let mut tokens = line.split_whitespace();
    let bias = tokens.next()?;
    let current = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    let bias: f64 = bias.parse().ok()?;
    let current: f64 = current.parse().ok()?;
    if !bias.is_finite() || !current.is_finite() {
        return None;
    }
    Some((bias, current))
}

/// Reads a two-column sweep from any buffered source.
///
/// The first line is a title and is always discarded, whatever its encoding.
/// Malformed rows, including rows that are not valid UTF-8, are dropped
/// without notice.
pub fn parse_series<R: BufRead>(mut reader: R) -> Result<IvSeries> {
    let mut series = IvSeries::new();
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(series);
    }
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let pair = std::str::from_utf8(&buf).ok().and_then(parse_pair);
        if let Some((bias, current)) = pair {
            series.push(bias, current);
        }
    }
    Ok(series)
}

pub fn read_series(path: &Path) -> Result<IvSeries> {
    let file = File::open(path)?;
    let series = parse_series(BufReader::new(file))?;
    debug!(path = %path.display(), samples = series.len(), "read IV series");
    Ok(series)
}
