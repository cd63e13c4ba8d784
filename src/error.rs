//! Pipeline error taxonomy.
//!
//! Every user-facing failure mode has a named variant. Classification is
//! never an error source: unrecognized article codes degrade to
//! `desconocido` instead of raising.

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "Nombre de archivo inválido: '{name}'. Usá una de estas convenciones:\n  \
         • Global (temporada): temporada_YYYY-MM.xlsx  (ej.: temporada_2025-06.xlsx)\n  \
         • Por local (locales): local-<centenario|5|49|55>_YYYY-MM.xlsx  (ej.: local-49_2025-06.xlsx)"
    )]
    InvalidFileName { name: String },

    #[error("Columnas faltantes en formato {format}: {columns:?}")]
    MissingColumns { format: String, columns: Vec<String> },

    #[error(
        "Formato de columnas no reconocido.\n\
         • Para 'temporada' se esperan: cliente, codigo_del_articulo, descripcion_del_producto, cantidad_vendida\n\
         • Para 'locales' se esperan: codigo_del_articulo, descripcion_del_producto, cantidad_vendida"
    )]
    UnknownFormat,

    #[error(
        "Ya existe un upload para el contexto (tipo={file_type}, período={period_month}, local={local_code:?}). \
         Activá 'reemplazar' para subir uno nuevo."
    )]
    DuplicateContext {
        file_type: String,
        period_month: NaiveDate,
        local_code: Option<String>,
    },

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    DataFrame(#[from] PolarsError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
