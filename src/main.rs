use anyhow::{Context, Result};
use config::StorageConfig;
use dotenv;
use polars::prelude::*;
use repo::DataRepository;
use std::env;
use std::path::Path;
use storage::SpreadsheetStore;
use tracing::{error, info, warn};
use tracing_subscriber;
use uploads::identity::{content_digest, parse_filename, storage_key};
use uploads::registry::{register_upload, InMemoryRegistry};

mod analysis;
mod classify;
mod config;
mod error;
mod formats;
mod loader;
mod repo;
mod schema;
mod storage;
mod uploads;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let replace = args.iter().any(|a| a == "--replace");
    let upload = args.iter().any(|a| a == "--upload");
    let files: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    if files.is_empty() {
        error!("Usage: sales-pipeline [--upload] [--replace] <file.xlsx> [file2.xls ...]");
        std::process::exit(1);
    }

    info!("🚀 Starting sales ingest pipeline ({} file(s))", files.len());

    // The blob store is only wired up when uploads were requested; pure
    // analysis runs need no storage configuration at all.
    let store = if upload {
        let config_path =
            env::var("STORAGE_CONFIG").unwrap_or_else(|_| "configs/storage.toml".to_string());
        let storage_config = StorageConfig::from_file(&config_path)
            .with_context(|| format!("Failed to load storage configuration: {config_path}"))?;
        info!(
            "Loaded storage configuration: {}@{}",
            storage_config.endpoint, storage_config.bucket_name
        );

        let store = SpreadsheetStore::from_config(&storage_config)
            .context("Failed to initialize blob store")?;
        store.ensure_bucket().await?;
        Some(store)
    } else {
        None
    };

    let mut repository = DataRepository::new();
    let registry = InMemoryRegistry::new();

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for path in &files {
        info!("=== Processing {path} ===");
        match process_file(path, &mut repository, &registry, store.as_ref(), replace).await {
            Ok(()) => succeeded += 1,
            Err(e) => {
                error!("Failed to process {path}: {e:#}");
                failed += 1;
            }
        }
    }

    info!(
        "🏁 Pipeline finished: {} succeeded, {} failed, {} table(s) cached",
        succeeded,
        failed,
        repository.cached_count()
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

async fn process_file(
    path: &str,
    repository: &mut DataRepository,
    registry: &InMemoryRegistry,
    store: Option<&SpreadsheetStore>,
    replace: bool,
) -> Result<()> {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .context("Path has no usable file name")?;

    let ctx = parse_filename(file_name)?;
    info!(
        "Upload context: {} / {} / {}",
        ctx.file_type,
        ctx.period_str(),
        ctx.local_code.as_deref().unwrap_or("-")
    );

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path}"))?;
    let parsed = repository.load_from_bytes(file_name, &bytes)?;

    info!(
        "Parsed {} rows as '{}'",
        parsed.table.height(),
        parsed.format_name()
    );
    report_aggregates(&parsed.table)?;

    if let Some(store) = store {
        let key = storage_key(&ctx, file_name);
        let digest = content_digest(&bytes);

        store.put(&key, &bytes, replace).await?;
        let record = register_upload(
            registry,
            &ctx,
            &parsed.format_name(),
            file_name,
            &key,
            &digest,
            replace,
        )
        .await?;
        info!("Registered upload {} at {}", record.id, record.storage_key);
    }

    Ok(())
}

fn report_aggregates(table: &DataFrame) -> Result<()> {
    let top = analysis::top_selling_products(table, 5)?;
    info!("Top products:\n{top}");

    let typologies = analysis::top_selling_typologies(table, 5)?;
    info!("Top typologies:\n{typologies}");

    let genders = analysis::sales_by_gender(table)?;
    info!("Sales by gender:\n{genders}");

    let shares = analysis::client_share_of_sales(table)?;
    info!("Clients with net sales: {}", shares.height());

    let returns = analysis::client_returns(table)?;
    if returns.height() > 0 {
        info!("Clients with returns:\n{returns}");
    }

    let specials = analysis::special_categories_summary(table)?;
    info!(
        "Special rows: cierres {}, ch {}, sorteos {}, perfuminas {}, otros {}",
        specials.cierres.cantidad,
        specials.ch.cantidad,
        specials.sorteos.cantidad,
        specials.perfuminas.cantidad,
        specials.otros_codigos.cantidad
    );
    if specials.total_unidades() != 0.0 {
        warn!(
            "Special categories hold {} signed units outside normal sales",
            specials.total_unidades()
        );
    }

    Ok(())
}
