//! Upload metadata registry and context-based deduplication.
//!
//! The registry is a collaborator: the core depends on the four operations
//! below, not on any storage technology. Uniqueness is enforced on the
//! (file_type, period_month, local_code) context triple; a true concurrent
//! race on that key must be resolved by an atomic insert-if-absent in the
//! backing store, not here.

use crate::error::{PipelineError, Result};
use crate::uploads::identity::{FileType, Scope, UploadContext};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub file_type: FileType,
    pub scope: Scope,
    pub local_code: Option<String>,
    pub period_month: NaiveDate,
    pub format_name: String,
    pub original_name: String,
    pub storage_key: String,
    pub content_hash: String,
    pub status: String,
    pub source: String,
    pub supersedes_upload_id: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

/// Fields a replacement is allowed to rewrite on an existing record.
#[derive(Debug, Clone, Default)]
pub struct UploadUpdate {
    pub original_name: Option<String>,
    pub storage_key: Option<String>,
    pub content_hash: Option<String>,
    pub format_name: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadFilter {
    pub scope: Option<Scope>,
    pub file_type: Option<FileType>,
    pub local_code: Option<String>,
    pub period_month: Option<NaiveDate>,
}

#[async_trait]
pub trait UploadRegistry: Send + Sync {
    async fn find_by_context(
        &self,
        file_type: FileType,
        period_month: NaiveDate,
        local_code: Option<&str>,
    ) -> Result<Option<UploadRecord>>;

    async fn insert(&self, record: UploadRecord) -> Result<UploadRecord>;

    async fn update(&self, id: Uuid, fields: UploadUpdate) -> Result<UploadRecord>;

    async fn list(&self, filter: UploadFilter) -> Result<Vec<UploadRecord>>;
}

/// Register an upload under its context triple. An existing record for the
/// same context is a duplicate unless the caller opted into replacement, in
/// which case the record is updated in place (same id) instead of duplicated.
pub async fn register_upload(
    registry: &dyn UploadRegistry,
    ctx: &UploadContext,
    format_name: &str,
    original_name: &str,
    storage_key: &str,
    content_hash: &str,
    replace: bool,
) -> Result<UploadRecord> {
    let existing = registry
        .find_by_context(ctx.file_type, ctx.period_month, ctx.local_code.as_deref())
        .await?;

    match existing {
        Some(_) if !replace => Err(PipelineError::DuplicateContext {
            file_type: ctx.file_type.to_string(),
            period_month: ctx.period_month,
            local_code: ctx.local_code.clone(),
        }),
        Some(prev) => {
            registry
                .update(
                    prev.id,
                    UploadUpdate {
                        original_name: Some(original_name.to_string()),
                        storage_key: Some(storage_key.to_string()),
                        content_hash: Some(content_hash.to_string()),
                        format_name: Some(format_name.to_string()),
                        status: Some("processed".to_string()),
                        source: Some("upload".to_string()),
                    },
                )
                .await
        }
        None => {
            registry
                .insert(UploadRecord {
                    id: Uuid::new_v4(),
                    file_type: ctx.file_type,
                    scope: ctx.scope,
                    local_code: ctx.local_code.clone(),
                    period_month: ctx.period_month,
                    format_name: format_name.to_string(),
                    original_name: original_name.to_string(),
                    storage_key: storage_key.to_string(),
                    content_hash: content_hash.to_string(),
                    status: "processed".to_string(),
                    source: "upload".to_string(),
                    supersedes_upload_id: None,
                    uploaded_at: Utc::now(),
                })
                .await
        }
    }
}

/// In-process registry used by the CLI and tests.
#[derive(Default)]
pub struct InMemoryRegistry {
    records: Mutex<Vec<UploadRecord>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadRegistry for InMemoryRegistry {
    async fn find_by_context(
        &self,
        file_type: FileType,
        period_month: NaiveDate,
        local_code: Option<&str>,
    ) -> Result<Option<UploadRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(records
            .iter()
            .find(|r| {
                r.file_type == file_type
                    && r.period_month == period_month
                    && r.local_code.as_deref() == local_code
            })
            .cloned())
    }

    async fn insert(&self, record: UploadRecord) -> Result<UploadRecord> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, fields: UploadUpdate) -> Result<UploadRecord> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PipelineError::Storage(format!("upload {id} not found")))?;

        if let Some(v) = fields.original_name {
            record.original_name = v;
        }
        if let Some(v) = fields.storage_key {
            record.storage_key = v;
        }
        if let Some(v) = fields.content_hash {
            record.content_hash = v;
        }
        if let Some(v) = fields.format_name {
            record.format_name = v;
        }
        if let Some(v) = fields.status {
            record.status = v;
        }
        if let Some(v) = fields.source {
            record.source = v;
        }

        Ok(record.clone())
    }

    async fn list(&self, filter: UploadFilter) -> Result<Vec<UploadRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        let mut out: Vec<UploadRecord> = records
            .iter()
            .filter(|r| filter.scope.is_none_or(|s| r.scope == s))
            .filter(|r| filter.file_type.is_none_or(|t| r.file_type == t))
            .filter(|r| {
                filter
                    .local_code
                    .as_deref()
                    .is_none_or(|c| r.local_code.as_deref() == Some(c))
            })
            .filter(|r| filter.period_month.is_none_or(|p| r.period_month == p))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(out)
    }
}
