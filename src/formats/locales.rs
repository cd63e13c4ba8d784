//! Locales (per-site export) parser. These files carry no classifiable
//! article codes, so every row counts as a sale.

use crate::error::{PipelineError, Result};
use crate::schema::canonical::canonicalize;
use polars::prelude::*;

pub const LOCALES_REQUIRED: &[&str] = &["cantidad_vendida"];

pub(crate) fn stamp_counts_as_sale(df: &mut DataFrame) -> Result<()> {
    let flags = vec![true; df.height()];
    df.with_column(Series::new("cuenta_ventas".into(), flags))?;
    Ok(())
}

pub fn parse_locales(df: DataFrame) -> Result<DataFrame> {
    let (mut df, missing) = canonicalize(df, LOCALES_REQUIRED)?;
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            format: "locales".to_string(),
            columns: missing,
        });
    }

    stamp_counts_as_sale(&mut df)?;
    Ok(df)
}
