//! Read dacpac ZIP contents into memory

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::UTF_8;
use zip::ZipArchive;

use crate::error::Dac2SqlError;

/// Name of the schema model entry inside a dacpac.
pub const MODEL_XML: &str = "model.xml";

/// All files from a dacpac ZIP, loaded into memory.
pub struct DacpacContents {
    path: PathBuf,
    files: HashMap<String, Vec<u8>>,
}

impl DacpacContents {
    /// Read all entries from a dacpac ZIP file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Dac2SqlError::DacpacReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = ZipArchive::new(file).map_err(|e| Dac2SqlError::ZipError {
            message: format!("Failed to read dacpac {}: {}", path.display(), e),
        })?;

        let mut files = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| Dac2SqlError::ZipError {
                message: format!("Failed to read entry {} in {}: {}", i, path.display(), e),
            })?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| Dac2SqlError::DacpacReadError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            files.insert(name, data);
        }

        Ok(Self {
            path: path.to_path_buf(),
            files,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get raw file contents. Entry names are matched case-insensitively.
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.files
            .get(name)
            .or_else(|| {
                self.files
                    .iter()
                    .find(|(entry, _)| entry.eq_ignore_ascii_case(name))
                    .map(|(_, data)| data)
            })
            .map(Vec::as_slice)
    }

    /// List all file names in the dacpac.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Decode `model.xml`, honouring a UTF-8 or UTF-16 byte order mark.
    pub fn model_xml(&self) -> Result<String> {
        let bytes = self
            .get_bytes(MODEL_XML)
            .ok_or_else(|| Dac2SqlError::ModelXmlMissing {
                path: self.path.clone(),
            })?;

        let (text, encoding, had_errors) = UTF_8.decode(bytes);
        if had_errors {
            return Err(Dac2SqlError::ModelEncodingError {
                path: self.path.clone(),
                message: format!("invalid {} byte sequence", encoding.name()),
            }
            .into());
        }
        Ok(text.into_owned())
    }
}
