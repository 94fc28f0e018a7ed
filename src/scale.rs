use crate::errors::{IvError, Result};

/// SI prefixes between femto and peta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiPrefix {
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Unit,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
}

impl SiPrefix {
    pub const ALL: [SiPrefix; 11] = [
        SiPrefix::Femto,
        SiPrefix::Pico,
        SiPrefix::Nano,
        SiPrefix::Micro,
        SiPrefix::Milli,
        SiPrefix::Unit,
        SiPrefix::Kilo,
        SiPrefix::Mega,
        SiPrefix::Giga,
        SiPrefix::Tera,
        SiPrefix::Peta,
    ];

    /// Looks up the prefix for a multiple-of-three decimal exponent.
    pub fn from_exponent(exponent: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.exponent() == exponent)
    }

    pub fn exponent(&self) -> i32 {
        match self {
            SiPrefix::Femto => -15,
            SiPrefix::Pico => -12,
            SiPrefix::Nano => -9,
            SiPrefix::Micro => -6,
            SiPrefix::Milli => -3,
            SiPrefix::Unit => 0,
            SiPrefix::Kilo => 3,
            SiPrefix::Mega => 6,
            SiPrefix::Giga => 9,
            SiPrefix::Tera => 12,
            SiPrefix::Peta => 15,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SiPrefix::Femto => "f",
            SiPrefix::Pico => "p",
            SiPrefix::Nano => "n",
            SiPrefix::Micro => "µ",
            SiPrefix::Milli => "m",
            SiPrefix::Unit => "",
            SiPrefix::Kilo => "k",
            SiPrefix::Mega => "M",
            SiPrefix::Giga => "G",
            SiPrefix::Tera => "T",
            SiPrefix::Peta => "P",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SiPrefix::Femto => "femto",
            SiPrefix::Pico => "pico",
            SiPrefix::Nano => "nano",
            SiPrefix::Micro => "micro",
            SiPrefix::Milli => "milli",
            SiPrefix::Unit => "",
            SiPrefix::Kilo => "kilo",
            SiPrefix::Mega => "mega",
            SiPrefix::Giga => "giga",
            SiPrefix::Tera => "tera",
            SiPrefix::Peta => "peta",
        }
    }
}

/// A sequence divided by `10^exponent`, with the prefix that labels it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledSeries {
    pub values: Vec<f64>,
    pub exponent: i32,
    pub prefix: Option<SiPrefix>,
}

impl ScaledSeries {
    /// Prefix symbol for axis labels. Exponents outside femto..peta still
    /// scale the values but carry no symbol.
    pub fn label(&self) -> &'static str {
        self.prefix.map_or("", |p| p.symbol())
    }

    pub fn factor(&self) -> f64 {
        10f64.powi(self.exponent)
    }

    /// Undoes the scaling, up to floating-point rounding.
    pub fn restore(&self) -> Vec<f64> {
        let factor = self.factor();
        self.values.iter().map(|v| v * factor).collect()
    }
}

/// Picks the extremum that drives prefix selection.
///
/// Of the algebraic minimum and maximum, the one with the smaller magnitude
/// wins; on equal magnitudes the maximum is used.
pub fn reference_value(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min_value.abs() < max_value.abs() {
        Some(min_value)
    } else {
        Some(max_value)
    }
}

/// Decimal exponent, rounded down to a multiple of three, for a reference
/// value. A zero or non-finite reference maps to 0.
pub fn engineering_exponent(reference: f64) -> i32 {
    if reference == 0.0 || !reference.is_finite() {
        return 0;
    }
    let power10 = reference.abs().log10().floor() as i32;
    power10.div_euclid(3) * 3
}

pub fn scale_to_prefix(values: &[f64]) -> Result<ScaledSeries> {
    let reference = reference_value(values).ok_or(IvError::EmptySeries)?;
    let exponent = engineering_exponent(reference);
    let factor = 10f64.powi(exponent);
    Ok(ScaledSeries {
        values: values.iter().map(|v| v / factor).collect(),
        exponent,
        prefix: SiPrefix::from_exponent(exponent),
    })
}
