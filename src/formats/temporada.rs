//! Temporada (global season export) parser: the only profile whose article
//! codes carry classifiable semantics.

use crate::classify::apply_classification;
use crate::error::{PipelineError, Result};
use crate::schema::canonical::canonicalize;
use polars::prelude::DataFrame;

pub const TEMPORADA_REQUIRED: &[&str] = &[
    "cliente",
    "cantidad_vendida",
    "codigo_del_articulo",
    "descripcion_del_producto",
];

pub fn parse_temporada(df: DataFrame) -> Result<DataFrame> {
    let (mut df, missing) = canonicalize(df, TEMPORADA_REQUIRED)?;
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            format: "temporada".to_string(),
            columns: missing,
        });
    }

    apply_classification(&mut df)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_temporada_classifies_rows() {
        let df = polars::df!(
            "Cliente" => ["100", "100", "200"],
            "Artículo" => ["B145", "CIERRE", "1234567"],
            "Descripción" => ["remera", "cierre caja", "short niños"],
            "Unidades" => ["2", "1", "-1"],
        )
        .unwrap();

        let out = parse_temporada(df).unwrap();
        let cv = out.column("cuenta_ventas").unwrap().bool().unwrap();
        assert_eq!(cv.get(0), Some(true));
        assert_eq!(cv.get(1), Some(false));
        assert_eq!(cv.get(2), Some(true));
        assert!(out.column("tipologia").is_ok());
        assert!(out.column("genero").is_ok());
        assert!(out.column("categoria_especial").is_ok());
    }

    #[test]
    fn test_parse_temporada_reports_missing_columns() {
        let df = polars::df!(
            "Artículo" => ["B145"],
            "Unidades" => ["2"],
        )
        .unwrap();

        let err = parse_temporada(df).unwrap_err();
        match err {
            PipelineError::MissingColumns { format, columns } => {
                assert_eq!(format, "temporada");
                assert!(columns.contains(&"cliente".to_string()));
                assert!(columns.contains(&"descripcion_del_producto".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
