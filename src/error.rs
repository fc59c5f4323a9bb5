//! Error types for mesh loading and component output
//!
//! All errors carry an error code for categorization and a message with enough
//! context to find the offending file element.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: File framing, XML parsing and structure errors
//! - **E3xxx**: Mesh validation and numeric errors
//! - **E4xxx**: Unsupported formats and features
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading or writing a file
//! - `E1002`: ZIP archive format error (3MF)
//! - `E1003`: Missing required part in a 3MF archive
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E2004`: Invalid file format (PLY/OFF header, OPC layout)
//! - `E3001`: Invalid mesh (bad face, out-of-range index)
//! - `E3002`: Numeric parse error
//! - `E4001`: Unsupported format or feature

use std::io;
use thiserror::Error;

/// Result type for mesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading meshes or writing components
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing a file
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    /// - Truncated binary PLY body
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted or truncated 3MF archive
    /// - Unsupported compression method
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required part in a 3MF archive
    ///
    /// **Error Code**: E1003
    ///
    /// **Suggestions**:
    /// - Check for [Content_Types].xml, _rels/.rels and 3D/3dmodel.model
    #[error("[E1003] Missing required file: {0}")]
    MissingFile(String),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Missing required attributes on vertex or triangle elements
    /// - Invalid UTF-8 in element or attribute names
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Invalid file framing
    ///
    /// **Error Code**: E2004
    ///
    /// **Common Causes**:
    /// - PLY file without `ply` magic or `end_header`
    /// - OFF file without an `OFF`/`COFF` keyword or counts line
    /// - Non-compliant OPC structure in a 3MF package
    #[error("[E2004] Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid mesh structure
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - Triangle referencing a vertex index past the end of the vertex list
    /// - Face with fewer than three vertices
    /// - Color property index past the end of its color group
    #[error("[E3001] Invalid mesh: {0}")]
    InvalidModel(String),

    /// Parse error for numeric values
    ///
    /// **Error Code**: E3002
    ///
    /// **Suggestions**:
    /// - Verify numeric values use proper format (e.g., "1.5" not "1,5")
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// Unsupported format or feature
    ///
    /// **Error Code**: E4001
    ///
    /// **Common Causes**:
    /// - Unknown input file extension
    /// - PLY scalar type or encoding not understood by the reader
    #[error("[E4001] Unsupported feature: {0}")]
    Unsupported(String),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create an InvalidXml error for a missing required attribute
    ///
    /// # Example
    /// ```ignore
    /// Error::missing_attribute("vertex", "x")
    /// ```
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create an InvalidFormat error with context about which structure is invalid
    ///
    /// # Arguments
    /// * `context` - What part of the format is invalid (e.g., "PLY header")
    /// * `message` - Description of the error
    pub fn invalid_format_context(context: &str, message: &str) -> Self {
        Error::InvalidFormat(format!("{}: {}", context, message))
    }

    /// Create a ParseError with context about what was being parsed
    ///
    /// # Arguments
    /// * `field_name` - The name of the field being parsed (e.g., "vertex x coordinate")
    /// * `value` - The value that failed to parse
    /// * `expected_type` - The expected type (e.g., "floating-point number")
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'",
            field_name, expected_type, value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(io_err.to_string().contains("[E1001]"));

        let missing_file = Error::MissingFile("3D/3dmodel.model".to_string());
        assert!(missing_file.to_string().contains("[E1003]"));

        let invalid_model = Error::InvalidModel("test error".to_string());
        assert!(invalid_model.to_string().contains("[E3001]"));

        let parse_err = Error::ParseError("test".to_string());
        assert!(parse_err.to_string().contains("[E3002]"));

        let unsupported = Error::Unsupported("stl".to_string());
        assert!(unsupported.to_string().contains("[E4001]"));
    }

    #[test]
    fn test_missing_attribute_helper() {
        let err = Error::missing_attribute("triangle", "v2");
        assert!(err.to_string().contains("Element '<triangle>'"));
        assert!(err.to_string().contains("missing required attribute 'v2'"));
        assert!(err.to_string().contains("[E2003]"));
    }

    #[test]
    fn test_invalid_format_context_helper() {
        let err = Error::invalid_format_context("PLY header", "missing end_header");
        assert!(err.to_string().contains("PLY header"));
        assert!(err.to_string().contains("missing end_header"));
        assert!(err.to_string().contains("[E2004]"));
    }

    #[test]
    fn test_parse_error_with_context_helper() {
        let err =
            Error::parse_error_with_context("vertex x coordinate", "abc", "floating-point number");
        assert!(err.to_string().contains("vertex x coordinate"));
        assert!(err.to_string().contains("floating-point number"));
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("[E3002]"));
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_err: std::num::ParseIntError = "seven".parse::<usize>().unwrap_err();
        let err = Error::from(parse_err);
        assert!(err.to_string().contains("Failed to parse integer"));
        assert!(err.to_string().contains("[E3002]"));
    }
}
