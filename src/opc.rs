//! OPC (Open Packaging Conventions) access for 3MF input files
//!
//! 3MF files are ZIP archives following the OPC standard. Only the parts
//! needed to reach the model XML are read: the content types, the package
//! relationships, and the model part they point to.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Main 3D model file path within the 3MF archive
pub const MODEL_PATH: &str = "3D/3dmodel.model";

/// Content types file path
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// An opened OPC package
pub struct Package<R: Read> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a 3MF package from a reader
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let mut package = Self { archive };

        for required in [CONTENT_TYPES_PATH, RELS_PATH] {
            if !package.has_file(required) {
                return Err(Error::invalid_format_context(
                    "OPC structure",
                    &format!("missing required part {}", required),
                ));
            }
        }

        Ok(package)
    }

    /// Get the main 3D model part content
    pub fn get_model(&mut self) -> Result<String> {
        let model_path = match self.discover_model_path()? {
            Some(path) => path,
            None => MODEL_PATH.to_string(),
        };
        tracing::trace!(part = %model_path, "reading 3MF model part");
        self.get_file(&model_path)
    }

    /// Find the model part named by the package relationships
    fn discover_model_path(&mut self) -> Result<Option<String>> {
        let rels_content = self.get_file(RELS_PATH)?;
        let mut reader = Reader::from_str(&rels_content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut target = None;
                    let mut rel_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = std::str::from_utf8(&attr.value)
                            .map_err(|e| Error::InvalidXml(e.to_string()))?;
                        match attr.key.as_ref() {
                            b"Target" => target = Some(value.to_string()),
                            b"Type" => rel_type = Some(value.to_string()),
                            _ => {}
                        }
                    }

                    if let (Some(t), Some(MODEL_REL_TYPE)) = (target, rel_type.as_deref()) {
                        let path = t.strip_prefix('/').unwrap_or(&t).to_string();
                        return Ok(Some(path));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(None)
    }

    /// Get a file by name from the archive
    pub fn get_file(&mut self, name: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingFile(name.to_string()))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Check if a file exists in the archive
    pub fn has_file(&mut self, name: &str) -> bool {
        self.archive.by_name(name).is_ok()
    }
}
