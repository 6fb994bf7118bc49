//! Dacpac loading

mod model_xml;
mod reader;

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::model::SchemaModel;

pub use model_xml::parse_model_xml;
pub use reader::{DacpacContents, MODEL_XML};

/// Load the schema model stored in a `.dacpac` archive.
pub fn load_dacpac(path: &Path) -> Result<SchemaModel> {
    let contents = DacpacContents::from_path(path)?;
    debug!(
        "Read {} entries from {}",
        contents.file_names().count(),
        path.display()
    );

    let xml = contents.model_xml()?;
    parse_model_xml(&xml, path)
}
