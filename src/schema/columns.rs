//! Header normalization: arbitrary spreadsheet labels to stable snake_case keys.

use crate::error::Result;
use polars::prelude::*;

/// Fold Spanish diacritics to their ASCII base letter. Characters outside the
/// table pass through unchanged.
pub fn fold_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'Ñ' => 'N',
            'Ç' => 'C',
            _ => c,
        })
        .collect()
}

/// Normalize one header label: strip diacritics, lowercase, collapse any run
/// of non-alphanumeric characters into a single underscore, trim underscores.
///
/// Pure and total; normalizing an already-normalized key is a no-op.
pub fn normalize_key(raw: &str) -> String {
    let folded = fold_diacritics(raw.trim()).to_lowercase();

    let mut out = String::with_capacity(folded.len());
    let mut pending_sep = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Normalize every column header of the frame in place. Unmapped headers stay
/// (normalized) and are simply ignored downstream. A rename that would
/// collide with an existing column is skipped, keeping the original header.
pub fn normalize_columns(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for name in names {
        let normalized = normalize_key(&name);
        if normalized != name && !normalized.is_empty() {
            let _ = df.rename(&name, normalized.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_basic() {
        assert_eq!(normalize_key("Cantidad Vendida"), "cantidad_vendida");
        assert_eq!(normalize_key("  Cliente  "), "cliente");
        assert_eq!(normalize_key("TOTAL"), "total");
    }

    #[test]
    fn test_normalize_key_diacritics() {
        assert_eq!(normalize_key("Código de Artículo"), "codigo_de_articulo");
        assert_eq!(normalize_key("Descripción"), "descripcion");
        assert_eq!(normalize_key("Año"), "ano");
    }

    #[test]
    fn test_normalize_key_punctuation_runs() {
        assert_eq!(normalize_key("desc. -- producto!!"), "desc_producto");
        assert_eq!(normalize_key("__cliente__"), "cliente");
        assert_eq!(normalize_key("%%%"), "");
    }

    #[test]
    fn test_normalize_key_idempotent() {
        for raw in ["Código de Artículo", "cantidad_vendida", "Desc. Producto"] {
            let once = normalize_key(raw);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn test_normalize_columns_renames_headers() {
        let mut df = polars::df!(
            "Código de Artículo" => ["B145"],
            "Unidades" => ["3"],
        )
        .unwrap();

        normalize_columns(&mut df).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["codigo_de_articulo", "unidades"]);
    }
}
