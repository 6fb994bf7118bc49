//! Writes grouped definitions to `<root>/<schema>/<category>/<name>.sql`

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::Dac2SqlError;
use crate::util::join_batches;

use super::{ObjectCategory, SchemaDefinition};

/// Minimum number of files before writes are fanned out across the rayon pool.
const PARALLEL_THRESHOLD: usize = 8;

/// Characters that cannot appear in a file name on at least one supported platform.
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Serializes [`SchemaDefinition`]s into a directory tree, one file per group.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    root: PathBuf,
    parallel: bool,
}

impl ScriptWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parallel: false,
        }
    }

    /// Write files concurrently once there are enough of them.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a definition is written to.
    pub fn path_for(&self, definition: &SchemaDefinition) -> PathBuf {
        let file_name = format!("{}.sql", sanitize_file_name(&definition.object_name));
        match definition.object_type {
            ObjectCategory::Security => self
                .root
                .join(ObjectCategory::Security.folder_name())
                .join(file_name),
            category => self
                .root
                .join(sanitize_file_name(&definition.schema))
                .join(category.folder_name())
                .join(file_name),
        }
    }

    /// Write one file per definition, overwriting existing files.
    ///
    /// A group whose scripts all failed still gets its (empty) file.
    ///
    /// Files are processed in path order. When two definitions map to the same
    /// path the later one in `definitions` wins. Returns the written paths.
    pub fn write_all(&self, definitions: &[SchemaDefinition]) -> Result<Vec<PathBuf>> {
        let plan = self.plan(definitions);
        if let Some((path, _)) = plan.iter().find(|(path, _)| !self.contains(path)) {
            return Err(Dac2SqlError::PathOutsideOutput { path: path.clone() }.into());
        }

        if self.parallel && plan.len() >= PARALLEL_THRESHOLD {
            let results: Vec<Result<PathBuf>> = plan
                .par_iter()
                .map(|(path, definition)| write_definition(path, definition))
                .collect();

            // Propagate the first error if any
            results.into_iter().collect()
        } else {
            plan.iter()
                .map(|(path, definition)| write_definition(path, definition))
                .collect()
        }
    }

    /// True when `path` lies strictly beneath the root.
    fn contains(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root).is_ok_and(|relative| {
            relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        })
    }

    /// Resolve paths and collapse collisions.
    fn plan<'d>(
        &self,
        definitions: &'d [SchemaDefinition],
    ) -> Vec<(PathBuf, &'d SchemaDefinition)> {
        let mut plan: Vec<(PathBuf, &SchemaDefinition)> = definitions
            .iter()
            .map(|definition| (self.path_for(definition), definition))
            .collect();

        // Stable sort keeps input order among equal paths
        plan.sort_by(|a, b| a.0.cmp(&b.0));

        let mut unique: Vec<(PathBuf, &SchemaDefinition)> = Vec::with_capacity(plan.len());
        for (path, definition) in plan {
            if let Some(last) = unique.last_mut() {
                if last.0 == path {
                    warn!(
                        "{} and {} both write {}, keeping the latter",
                        last.1.key(),
                        definition.key(),
                        path.display()
                    );
                    last.1 = definition;
                    continue;
                }
            }
            unique.push((path, definition));
        }
        unique
    }
}

fn write_definition(path: &Path, definition: &SchemaDefinition) -> Result<PathBuf> {
    if definition.is_empty() {
        debug!("No scripts for {}, writing an empty file", definition.key());
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Dac2SqlError::DirectoryCreateError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, join_batches(&definition.definitions)).map_err(|e| {
        Dac2SqlError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    info!("Exported: {}", path.display());
    Ok(path.to_path_buf())
}

/// Replace characters that are not valid in file names with `_`.
///
/// Names made only of dots (`.`, `..`) would be read as directory references,
/// so their dots are replaced too. An empty name becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    if name.chars().all(|c| c == '.') {
        return "_".repeat(name.len().max(1));
    }
    name.chars()
        .map(|c| {
            if INVALID_FILE_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
