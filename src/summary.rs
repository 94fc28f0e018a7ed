use polars::prelude::*;

use crate::errors::Result;
use crate::reader::IvSeries;
use crate::scale::ScaledSeries;

/// Tabulates a sweep next to its scaled current. Mismatched lengths surface
/// as a polars shape error.
pub fn series_frame(series: &IvSeries, scaled: &ScaledSeries) -> Result<DataFrame> {
    let scaled_name = format!("current_scaled[{}A]", scaled.label());
    let df = df!(
        "bias" => series.bias(),
        "current" => series.current(),
        scaled_name.as_str() => scaled.values.as_slice()
    )?;
    Ok(df)
}
