//! Upload identity: filename-convention parsing, content digest and storage
//! key derivation.
//!
//! Two mutually exclusive naming conventions are accepted, nothing else:
//!   temporada_YYYY-MM.xlsx            (global season file)
//!   local-<site>_YYYY-MM.xlsx         (per-site file, closed site set)

use crate::error::{PipelineError, Result};
use crate::schema::columns::fold_diacritics;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Local,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Temporada,
    Locales,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Temporada => write!(f, "temporada"),
            FileType::Locales => write!(f, "locales"),
        }
    }
}

/// The (file_type, period_month, local_code) triple is the identity key for
/// an uploaded file, independent of its content or exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadContext {
    pub scope: Scope,
    pub file_type: FileType,
    pub local_code: Option<String>,
    pub period_month: NaiveDate,
}

impl UploadContext {
    pub fn period_str(&self) -> String {
        self.period_month.format("%Y-%m").to_string()
    }
}

static RE_GLOBAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^temporada_(\d{4})-(\d{2})\.(xlsx|xls)$").expect("static filename pattern")
});

static RE_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^local-(centenario|5|49|55)_(\d{4})-(\d{2})\.(xlsx|xls)$")
        .expect("static filename pattern")
});

fn first_of_month(year: i32, month: u32, original: &str) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| PipelineError::InvalidFileName {
        name: original.to_string(),
    })
}

/// Validate a filename against the two accepted conventions and extract the
/// upload context. Case-insensitive; anything else is a naming-convention
/// error that surfaces both accepted patterns.
pub fn parse_filename(original_name: &str) -> Result<UploadContext> {
    if let Some(caps) = RE_GLOBAL.captures(original_name) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        return Ok(UploadContext {
            scope: Scope::Global,
            file_type: FileType::Temporada,
            local_code: None,
            period_month: first_of_month(year, month, original_name)?,
        });
    }

    if let Some(caps) = RE_LOCAL.captures(original_name) {
        let local_code = caps[1].to_lowercase();
        let year: i32 = caps[2].parse().unwrap_or(0);
        let month: u32 = caps[3].parse().unwrap_or(0);
        return Ok(UploadContext {
            scope: Scope::Local,
            file_type: FileType::Locales,
            local_code: Some(local_code),
            period_month: first_of_month(year, month, original_name)?,
        });
    }

    Err(PipelineError::InvalidFileName {
        name: original_name.to_string(),
    })
}

/// Stable hex SHA-256 of the raw file bytes, for integrity and duplicate
/// auditing. The dedup key is the context triple, not this digest.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Keep only ASCII letters, digits, `.`, `_` and `-`; spaces become `_`.
fn slugify_filename(name: &str) -> String {
    fold_diacritics(name)
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Deterministic blob key for an upload, partitioned by scope and period.
pub fn storage_key(ctx: &UploadContext, original_name: &str) -> String {
    let year = ctx.period_month.format("%Y");
    let ym = ctx.period_str();
    let safe_name = slugify_filename(original_name);

    match (&ctx.scope, &ctx.local_code) {
        (Scope::Local, Some(site)) => format!("sales/local/{site}/{year}/{ym}/{safe_name}"),
        _ => format!("sales/global/{year}/{ym}/{safe_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_filename() {
        let ctx = parse_filename("temporada_2025-06.xlsx").unwrap();
        assert_eq!(ctx.scope, Scope::Global);
        assert_eq!(ctx.file_type, FileType::Temporada);
        assert_eq!(ctx.local_code, None);
        assert_eq!(ctx.period_month, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(ctx.period_str(), "2025-06");
    }

    #[test]
    fn test_parse_local_filename() {
        let ctx = parse_filename("local-49_2025-06.xls").unwrap();
        assert_eq!(ctx.scope, Scope::Local);
        assert_eq!(ctx.file_type, FileType::Locales);
        assert_eq!(ctx.local_code.as_deref(), Some("49"));
        assert_eq!(ctx.period_month, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_parse_filename_case_insensitive() {
        let ctx = parse_filename("Local-CENTENARIO_2024-12.XLSX").unwrap();
        assert_eq!(ctx.local_code.as_deref(), Some("centenario"));
    }

    #[test]
    fn test_parse_filename_rejects_everything_else() {
        for name in [
            "ventas.xlsx",
            "temporada-2025-06.xlsx",
            "local-7_2025-06.xlsx",
            "temporada_2025-06.csv",
            "temporada_2025-06.xlsx.bak",
        ] {
            assert!(
                matches!(parse_filename(name), Err(PipelineError::InvalidFileName { .. })),
                "accepted {name}"
            );
        }
    }

    #[test]
    fn test_parse_filename_rejects_impossible_month() {
        assert!(parse_filename("temporada_2025-13.xlsx").is_err());
        assert!(parse_filename("temporada_2025-00.xlsx").is_err());
    }

    #[test]
    fn test_content_digest_is_stable() {
        let a = content_digest(b"hello");
        let b = content_digest(b"hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_digest(b"hello!"));
    }

    #[test]
    fn test_storage_key_layout() {
        let ctx = parse_filename("temporada_2025-06.xlsx").unwrap();
        assert_eq!(
            storage_key(&ctx, "temporada_2025-06.xlsx"),
            "sales/global/2025/2025-06/temporada_2025-06.xlsx"
        );

        let ctx = parse_filename("local-55_2025-06.xls").unwrap();
        assert_eq!(
            storage_key(&ctx, "local-55_2025-06.xls"),
            "sales/local/55/2025/2025-06/local-55_2025-06.xls"
        );
    }

    #[test]
    fn test_slugify_strips_unsafe_characters() {
        assert_eq!(slugify_filename("año nuevo/ventas.xlsx"), "ano_nuevoventas.xlsx");
    }
}
