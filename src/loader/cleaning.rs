//! Domain cleaning applied after format parsing.
//!
//! Drops rows that carry no sales signal: null or zero quantities, and the
//! "seña"/"varios" placeholder articles the stores use for deposits and
//! sundries. Negative quantities are kept, they are returns and must keep
//! netting totals downstream.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

const PLACEHOLDER_TOKENS: &[&str] = &["seña", "senia", "varios"];

fn contains_placeholder(value: Option<&str>) -> bool {
    let Some(text) = value else { return false };
    let lowered = text.to_lowercase();
    PLACEHOLDER_TOKENS.iter().any(|t| lowered.contains(t))
}

/// Remove null/zero-quantity rows and placeholder articles. The input is
/// expected in canonical shape, with `cantidad_vendida` as Float64.
pub fn apply_domain_cleaning(df: &DataFrame) -> Result<DataFrame> {
    let before = df.height();
    let qty = df.column("cantidad_vendida")?.f64()?;

    let mut keep: Vec<bool> = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        keep.push(matches!(qty.get(i), Some(v) if v != 0.0));
    }

    for name in ["codigo_del_articulo", "descripcion_del_producto"] {
        if let Ok(col) = df.column(name) {
            let values = col.str()?;
            for (i, flag) in keep.iter_mut().enumerate() {
                if *flag && contains_placeholder(values.get(i)) {
                    *flag = false;
                }
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let cleaned = df.filter(&mask)?;
    debug!(
        "Domain cleaning removed {} of {} rows",
        before - cleaned.height(),
        before
    );
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "cliente" => &["100", "101", "102", "103", "104", "105"],
            "codigo_del_articulo" => &["B145", "SEÑA", "1234567", "CH2091", "VARIOS NEGROS", "B200"],
            "descripcion_del_producto" => &["remera", "seña cliente", "pantalon", "chaleco", "varios", "buzo"],
            "cantidad_vendida" => &[Some(3.0), Some(1.0), Some(0.0), Some(-2.0), Some(5.0), None],
        )
        .unwrap()
    }

    #[test]
    fn test_drops_zero_and_null_quantities() {
        let cleaned = apply_domain_cleaning(&sample()).unwrap();
        let clients: Vec<Option<&str>> =
            cleaned.column("cliente").unwrap().str().unwrap().into_iter().collect();
        assert!(!clients.contains(&Some("102")));
        assert!(!clients.contains(&Some("105")));
    }

    #[test]
    fn test_drops_placeholder_articles() {
        let cleaned = apply_domain_cleaning(&sample()).unwrap();
        let codes: Vec<Option<&str>> = cleaned
            .column("codigo_del_articulo")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert!(!codes.contains(&Some("SEÑA")));
        assert!(!codes.contains(&Some("VARIOS NEGROS")));
    }

    #[test]
    fn test_keeps_negative_quantities() {
        let cleaned = apply_domain_cleaning(&sample()).unwrap();
        let codes: Vec<Option<&str>> = cleaned
            .column("codigo_del_articulo")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        // Returns survive cleaning.
        assert!(codes.contains(&Some("CH2091")));
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_placeholder_matching_is_accent_and_case_tolerant() {
        assert!(contains_placeholder(Some("SEÑA")));
        assert!(contains_placeholder(Some("senia cliente")));
        assert!(contains_placeholder(Some("Varios")));
        assert!(!contains_placeholder(Some("B145")));
        assert!(!contains_placeholder(None));
    }

    #[test]
    fn test_missing_text_columns_only_filters_on_quantity() {
        let df = df!(
            "cantidad_vendida" => &[Some(2.0), Some(0.0)],
        )
        .unwrap();
        let cleaned = apply_domain_cleaning(&df).unwrap();
        assert_eq!(cleaned.height(), 1);
    }
}
