//! Canonical schema: alias mapping, type coercion, required-field validation.
//!
//! `canonicalize` never raises for malformed *data*. Only the calling parser
//! decides whether a non-empty missing list is a hard failure.

use crate::error::Result;
use crate::schema::columns::normalize_columns;
use polars::prelude::*;

/// The fixed vocabulary every input header is normalized toward.
pub const CANONICAL_COLUMNS: &[&str] = &[
    "cliente",
    "nombre_cliente",
    "localidad",
    "codigo_del_articulo",
    "descripcion_del_producto",
    "cantidad_vendida",
    "total",
];

/// Ordered alias table: for each canonical field, the accepted (already
/// normalized) synonyms. First match wins; unmatched headers pass through.
const ALIASES: &[(&str, &[&str])] = &[
    (
        "cliente",
        &["cliente", "cod_cliente", "codigo_cliente", "id_cliente"],
    ),
    (
        "nombre_cliente",
        &["nombre_cliente", "nombre", "cliente_nombre", "nom_cliente"],
    ),
    ("localidad", &["localidad", "ciudad", "local", "lugar"]),
    (
        "codigo_del_articulo",
        &[
            "codigo_del_articulo",
            "articulo",
            "codigo_articulo",
            "cod_articulo",
            "codigo_de_articulo",
            "codigo",
            "item",
        ],
    ),
    (
        "descripcion_del_producto",
        &[
            "descripcion_del_producto",
            "descripcion_original",
            "descripcion",
            "producto",
            "desc_producto",
            "articulo_desc",
            "descripcion_articulo",
        ],
    ),
    (
        "cantidad_vendida",
        &["cantidad_vendida", "unidades", "cantidad", "cant", "units", "qty"],
    ),
    ("total", &["total", "importe", "monto", "precio_total"]),
];

/// Minimal required set when no profile-specific parser applies.
pub const REQUIRED_BASE: &[&str] = &["cliente", "cantidad_vendida"];

const TEXT_FIELDS: &[&str] = &[
    "cliente",
    "nombre_cliente",
    "localidad",
    "codigo_del_articulo",
    "descripcion_del_producto",
];

const NUMERIC_FIELDS: &[&str] = &["cantidad_vendida", "total"];

/// Rename aliased headers to their canonical field name. Headers matching no
/// alias are left untouched.
pub fn map_aliases_to_canonical(df: &mut DataFrame) -> Result<()> {
    let mut cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for (canonical, aliases) in ALIASES {
        if cols.iter().any(|c| c.as_str() == *canonical) {
            continue;
        }
        if let Some(alias) = aliases
            .iter()
            .copied()
            .find(|a| cols.iter().any(|c| c.as_str() == *a))
        {
            df.rename(alias, (*canonical).into())?;
            if let Some(slot) = cols.iter_mut().find(|c| c.as_str() == alias) {
                *slot = (*canonical).to_string();
            }
        }
    }

    Ok(())
}

fn coerce_text_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let Ok(column) = df.column(name).cloned() else {
        return Ok(());
    };

    let as_str = column.cast(&DataType::String)?;
    let trimmed: Vec<Option<String>> = as_str
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect();

    df.with_column(Series::new(name.into(), trimmed))?;
    Ok(())
}

fn coerce_numeric_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let Ok(column) = df.column(name).cloned() else {
        return Ok(());
    };
    if column.dtype() == &DataType::Float64 {
        return Ok(());
    }

    // Unparseable cells become null, never an error. Row dropping is a
    // domain-cleaning concern, not a schema concern.
    let as_str = column.cast(&DataType::String)?;
    let parsed: Vec<Option<f64>> = as_str
        .str()?
        .into_iter()
        .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
        .collect();

    df.with_column(Series::new(name.into(), parsed))?;
    Ok(())
}

/// Coerce canonical fields to their expected types: text fields to trimmed
/// strings, quantity/amount fields to `f64` with nulls for garbage.
pub fn coerce_types(df: &mut DataFrame) -> Result<()> {
    for name in TEXT_FIELDS.iter().copied() {
        coerce_text_column(df, name)?;
    }
    for name in NUMERIC_FIELDS.iter().copied() {
        coerce_numeric_column(df, name)?;
    }
    Ok(())
}

/// Which of `required` are absent after alias mapping. Checks column
/// presence only, not data quality.
pub fn validate_required(df: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .copied()
        .filter(|name| df.column(*name).is_err())
        .map(|name| name.to_string())
        .collect()
}

/// Full canonicalization pass: normalize headers, map aliases, coerce types,
/// report missing required fields. Applying it twice with the same required
/// set yields the same table and the same missing list.
pub fn canonicalize(mut df: DataFrame, required: &[&str]) -> Result<(DataFrame, Vec<String>)> {
    normalize_columns(&mut df)?;
    map_aliases_to_canonical(&mut df)?;
    coerce_types(&mut df)?;
    let missing = validate_required(&df, required);
    Ok((df, missing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        polars::df!(
            "Cliente" => ["100", " 200 "],
            "Código de Artículo" => ["B145", "CIERRE"],
            "Descripción" => ["Remera lisa", "Cierre de caja"],
            "Unidades" => ["3", "no-num"],
        )
        .unwrap()
    }

    #[test]
    fn test_alias_mapping_from_accented_headers() {
        let (df, missing) = canonicalize(
            sample(),
            &["cliente", "codigo_del_articulo", "descripcion_del_producto", "cantidad_vendida"],
        )
        .unwrap();

        assert!(missing.is_empty());
        for name in [
            "cliente",
            "codigo_del_articulo",
            "descripcion_del_producto",
            "cantidad_vendida",
        ] {
            assert!(df.column(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn test_coercion_garbage_becomes_null() {
        let (df, _) = canonicalize(sample(), REQUIRED_BASE).unwrap();
        let qty = df.column("cantidad_vendida").unwrap().f64().unwrap();
        assert_eq!(qty.get(0), Some(3.0));
        assert_eq!(qty.get(1), None);
    }

    #[test]
    fn test_text_fields_trimmed() {
        let (df, _) = canonicalize(sample(), REQUIRED_BASE).unwrap();
        let cliente = df.column("cliente").unwrap().str().unwrap();
        assert_eq!(cliente.get(1), Some("200"));
    }

    #[test]
    fn test_missing_required_reported_by_name() {
        let df = polars::df!("Unidades" => ["1"]).unwrap();
        let (_, missing) = canonicalize(df, &["cliente", "cantidad_vendida"]).unwrap();
        assert_eq!(missing, vec!["cliente".to_string()]);
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let required = &["cliente", "cantidad_vendida"];
        let (once, missing_once) = canonicalize(sample(), required).unwrap();
        let (twice, missing_twice) = canonicalize(once.clone(), required).unwrap();

        assert_eq!(missing_once, missing_twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unmatched_headers_pass_through() {
        let df = polars::df!(
            "Cliente" => ["1"],
            "Columna Rara" => ["x"],
        )
        .unwrap();
        let (df, _) = canonicalize(df, REQUIRED_BASE).unwrap();
        assert!(df.column("columna_rara").is_ok());
    }
}
