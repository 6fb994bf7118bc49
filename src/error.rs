//! Error types for dac2sql

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an extraction run
#[derive(Error, Debug)]
pub enum Dac2SqlError {
    #[error("Failed to read dacpac: {path}")]
    DacpacReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP read error: {message}")]
    ZipError { message: String },

    #[error("Dacpac {path} does not contain model.xml")]
    ModelXmlMissing { path: PathBuf },

    #[error("model.xml in {path} is not valid text: {message}")]
    ModelEncodingError { path: PathBuf, message: String },

    #[error("Failed to parse model.xml in {path}")]
    ModelParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("model.xml in {path} has no Model element")]
    ModelElementMissing { path: PathBuf },

    #[error("Failed to create directory: {path}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Script path is outside the output directory: {path}")]
    PathOutsideOutput { path: PathBuf },

    #[error("Failed to write script file: {path}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<zip::result::ZipError> for Dac2SqlError {
    fn from(err: zip::result::ZipError) -> Self {
        Dac2SqlError::ZipError {
            message: err.to_string(),
        }
    }
}
