//! Shared helpers for Office Open XML packages (DOCX, XLSX)

use super::LoadError;
use quick_xml::events::BytesStart;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened OOXML zip package
pub(super) struct Package {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl Package {
    pub(super) fn open(bytes: &[u8]) -> Result<Self, LoadError> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec()))?;
        Ok(Self { archive })
    }

    /// Read a part as UTF-8, `None` if the package does not contain it
    pub(super) fn read_part(&mut self, name: &str) -> Result<Option<String>, LoadError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    /// Read a part that must exist
    pub(super) fn require_part(&mut self, name: &str) -> Result<String, LoadError> {
        self.read_part(name)?
            .ok_or_else(|| LoadError::Malformed(format!("missing part {}", name)))
    }
}

/// Value of the attribute whose local name (namespace prefix ignored) matches
pub(super) fn attribute(element: &BytesStart<'_>, local_name: &[u8]) -> Result<Option<String>, LoadError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| LoadError::Xml(e.to_string()))?;
        if attr.key.local_name().as_ref() == local_name {
            let value = attr
                .unescape_value()
                .map_err(|e| LoadError::Xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

pub(super) fn xml_error(e: quick_xml::Error) -> LoadError {
    LoadError::Xml(e.to_string())
}
