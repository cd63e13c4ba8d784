//! Read-through repository: raw spreadsheet bytes in, canonical sales table
//! out, memoized on the content digest so re-loading the same file is free.

use crate::error::{PipelineError, Result};
use crate::formats::{
    detect_format, parse_articulos_mes, parse_locales, parse_temporada, FormatKind,
};
use crate::loader::{apply_domain_cleaning, read_table};
use crate::schema::canonical::{canonicalize, REQUIRED_BASE};
use crate::schema::columns::normalize_columns;
use crate::uploads::identity::content_digest;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use tracing::{info, warn};

/// A parsed upload: the cleaned canonical table plus the profile that
/// produced it.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub format: FormatKind,
    pub table: DataFrame,
}

impl ParsedUpload {
    /// Versioned format label stored in upload metadata, e.g. `temporada_v1`.
    pub fn format_name(&self) -> String {
        format!("{}_v1", self.format.family())
    }
}

/// Dispatch a normalized table to the parser its detected profile demands.
/// Unknown profiles get a best-effort canonical pass; if even the base
/// columns are missing the file is rejected.
fn parse_by_format(df: DataFrame, format: &FormatKind) -> Result<DataFrame> {
    match format {
        FormatKind::Temporada => parse_temporada(df),
        FormatKind::Locales { .. } => parse_locales(df),
        FormatKind::ArticulosMes => parse_articulos_mes(df),
        FormatKind::Desconocido => {
            let (parsed, missing) = canonicalize(df, REQUIRED_BASE)?;
            if !missing.is_empty() {
                return Err(PipelineError::UnknownFormat);
            }
            warn!("No known profile matched; parsed on base columns only");
            parse_articulos_mes(parsed)
        }
    }
}

/// Invocation-scoped repository over uploaded spreadsheets.
#[derive(Default)]
pub struct DataRepository {
    cache: HashMap<String, ParsedUpload>,
}

impl DataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse bytes into the cleaned canonical table, serving repeats of the
    /// same content from cache.
    pub fn load_from_bytes(&mut self, filename: &str, bytes: &[u8]) -> Result<ParsedUpload> {
        let digest = content_digest(bytes);
        if let Some(hit) = self.cache.get(&digest) {
            info!("Cache hit for {filename}");
            return Ok(hit.clone());
        }

        let mut df = read_table(bytes)?;
        normalize_columns(&mut df)?;

        let format = detect_format(&df, Some(filename));
        info!("Detected profile '{}' for {filename}", format.family());

        let parsed = parse_by_format(df, &format)?;
        let table = apply_domain_cleaning(&parsed)?;

        let upload = ParsedUpload { format, table };
        self.cache.insert(digest, upload.clone());
        Ok(upload)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
