//! Parsing-profile detection.
//!
//! The filename heuristic runs first (cheap and more specific, it can name a
//! site); the column heuristic is the fallback. Column checks run on
//! normalized headers *before* alias mapping, so the synonym sets here are
//! wider than the canonical vocabulary.

use crate::schema::columns::{fold_diacritics, normalize_key};
use polars::prelude::DataFrame;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatKind {
    Temporada,
    Locales { site: Option<String> },
    ArticulosMes,
    Desconocido,
}

impl FormatKind {
    pub fn family(&self) -> &'static str {
        match self {
            FormatKind::Temporada => "temporada",
            FormatKind::Locales { .. } => "locales",
            FormatKind::ArticulosMes => "articulos_mes",
            FormatKind::Desconocido => "desconocido",
        }
    }
}

const SITE_TOKENS: &[&str] = &["centenario", "55", "49", "5"];

const CLIENT_SYNS: &[&str] = &["cliente"];
const CODE_SYNS: &[&str] = &["codigo_del_articulo", "codigo", "articulo", "codigo_articulo"];
const DESC_SYNS: &[&str] = &["descripcion_del_producto", "descripcion", "desc_prod", "detalle"];
const QTY_SYNS: &[&str] = &["cantidad_vendida", "cantidad", "cant"];

const MONTH_NAMES: &[&str] = &[
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "setiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

static PERIOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // No word boundaries: by the time this runs the name is underscore
    // normalized, and `_` counts as a word character.
    Regex::new(r"\d{4}[-_]\d{2}|\d{2}[-_]\d{4}").expect("static period pattern")
});

fn has_any(cols: &[String], synonyms: &[&str]) -> bool {
    cols.iter().any(|c| synonyms.contains(&c.as_str()))
}

fn has_month_hint(folded: &str, tokens: &[&str]) -> bool {
    MONTH_NAMES.iter().any(|m| tokens.contains(m))
        || PERIOD_PATTERN.is_match(folded)
        || tokens.contains(&"mes")
        || tokens.contains(&"mensual")
        || folded.contains("mas_vendidos")
}

/// Filename heuristic. Returns `None` when the name gives no verdict, so the
/// caller can defer to the column heuristic.
pub fn detect_from_filename(filename: &str) -> Option<FormatKind> {
    let folded = normalize_key(filename);
    let tokens: Vec<&str> = folded.split('_').collect();

    if folded.contains("temporada") {
        return Some(FormatKind::Temporada);
    }

    let site = SITE_TOKENS
        .iter()
        .copied()
        .find(|s| tokens.contains(s))
        .map(|s| s.to_string());
    if folded.contains("local") || folded.contains("sucursal") || site.is_some() {
        return Some(FormatKind::Locales { site });
    }

    if folded.contains("articulos") && has_month_hint(&folded, &tokens) {
        return Some(FormatKind::ArticulosMes);
    }

    None
}

/// Column heuristic over normalized (pre-alias) headers. Temporada's required
/// superset is checked before locales' subset; a temporada file always has
/// the locales columns too, so the order matters.
pub fn detect_from_columns(df: &DataFrame) -> FormatKind {
    let cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| normalize_key(c.as_str()))
        .collect();

    let has_code = has_any(&cols, CODE_SYNS);
    let has_desc = has_any(&cols, DESC_SYNS);
    let has_qty = has_any(&cols, QTY_SYNS);
    let has_client = has_any(&cols, CLIENT_SYNS);

    if has_code && has_desc && has_qty && has_client {
        return FormatKind::Temporada;
    }
    if has_code && has_desc && has_qty {
        return FormatKind::Locales { site: None };
    }
    FormatKind::Desconocido
}

/// Combined detection: filename verdict wins, columns are the fallback.
pub fn detect_format(df: &DataFrame, filename: Option<&str>) -> FormatKind {
    if let Some(name) = filename {
        if let Some(kind) = detect_from_filename(name) {
            return kind;
        }
    }
    detect_from_columns(df)
}
