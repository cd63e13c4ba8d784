//! Articulos-del-mes (monthly best-seller export) parser.

use crate::error::{PipelineError, Result};
use crate::formats::locales::stamp_counts_as_sale;
use crate::schema::canonical::canonicalize;
use polars::prelude::DataFrame;

pub const ARTICULOS_MES_REQUIRED: &[&str] = &["cantidad_vendida"];

pub fn parse_articulos_mes(df: DataFrame) -> Result<DataFrame> {
    let (mut df, missing) = canonicalize(df, ARTICULOS_MES_REQUIRED)?;
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            format: "articulos_mes".to_string(),
            columns: missing,
        });
    }

    stamp_counts_as_sale(&mut df)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_articulos_mes() {
        let df = polars::df!(
            "Producto" => ["remera", "buzo"],
            "Cantidad" => ["10", "7"],
        )
        .unwrap();

        let out = parse_articulos_mes(df).unwrap();
        let qty = out.column("cantidad_vendida").unwrap().f64().unwrap();
        assert_eq!(qty.get(0), Some(10.0));

        let cv = out.column("cuenta_ventas").unwrap().bool().unwrap();
        assert!(cv.into_iter().all(|v| v == Some(true)));
    }

    #[test]
    fn test_parse_articulos_mes_missing_quantity() {
        let df = polars::df!("Producto" => ["remera"]).unwrap();
        assert!(matches!(
            parse_articulos_mes(df),
            Err(PipelineError::MissingColumns { .. })
        ));
    }
}
