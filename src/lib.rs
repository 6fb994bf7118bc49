//! dac2sql: split a SQL Server dacpac into per-object script files
//!
//! The schema model inside a `.dacpac` is loaded, every user-defined object is
//! classified into an output category, tables and views are merged with their
//! indexes, keys, triggers and extended properties, and each resulting group is
//! written to `<root>/<schema>/<category>/<name>.sql`.

pub mod dacpac;
pub mod error;
pub mod extract;
pub mod model;
pub mod script;
pub mod util;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use extract::{AggregationStats, DefinitionAggregator, ScriptWriter};
use model::SchemaModel;
use script::{DacpacScriptRenderer, ScriptExtractor};

pub use error::Dac2SqlError;

/// Options for extracting a dacpac
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Path to the .dacpac file
    pub dacpac_path: PathBuf,
    /// Directory the database folder is created in
    pub output_dir: PathBuf,
    /// Database folder name (defaults to the dacpac file stem)
    pub database_name: Option<String>,
    /// Write files on the rayon thread pool
    pub parallel_writes: bool,
}

impl ExtractOptions {
    /// The directory scripts are written under: `output_dir/<database name>`.
    pub fn output_root(&self) -> PathBuf {
        let database_name = self.database_name.clone().unwrap_or_else(|| {
            self.dacpac_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Database")
                .to_string()
        });
        self.output_dir.join(database_name)
    }
}

/// What an extraction run produced
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub output_root: PathBuf,
    /// Number of definition groups produced by aggregation
    pub definitions: usize,
    pub stats: AggregationStats,
    /// Files written, in write order
    pub files: Vec<PathBuf>,
}

/// Extract every object of a dacpac into script files
pub fn extract_dacpac(options: ExtractOptions) -> Result<ExtractSummary> {
    info!("Loading dacpac: {}", options.dacpac_path.display());
    let model = dacpac::load_dacpac(&options.dacpac_path)?;
    info!("Loaded {} objects", model.len());

    let renderer = DacpacScriptRenderer::new(&model);
    extract_model(
        &model,
        &renderer,
        &options.output_root(),
        options.parallel_writes,
    )
}

/// Aggregate an already-loaded model with any [`ScriptExtractor`] and write the result under `output_root`.
pub fn extract_model<E: ScriptExtractor + ?Sized>(
    model: &SchemaModel,
    extractor: &E,
    output_root: &Path,
    parallel_writes: bool,
) -> Result<ExtractSummary> {
    let (definitions, stats) = DefinitionAggregator::new(extractor).aggregate(model);
    info!(
        "Grouped {} objects into {} definitions ({} skipped)",
        stats.objects_visited,
        definitions.len(),
        stats.skipped
    );

    let files = ScriptWriter::new(output_root)
        .parallel(parallel_writes)
        .write_all(&definitions)?;
    info!("Wrote {} files to {}", files.len(), output_root.display());

    Ok(ExtractSummary {
        output_root: output_root.to_path_buf(),
        definitions: definitions.len(),
        stats,
        files,
    })
}
