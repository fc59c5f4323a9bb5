//! Triangle mesh loading
//!
//! [`read_triangle_mesh`] picks a reader from the file extension and returns a
//! [`TriangleMesh`] with per-vertex colors when the source carries them.
//!
//! Supported formats:
//! - PLY (ascii, binary little endian, binary big endian)
//! - Wavefront OBJ, with the common `v x y z r g b` color extension
//! - OFF and COFF
//! - 3MF, with colors from color groups and base materials

mod obj;
mod off;
mod ply;
mod threemf;

pub use obj::read_obj;
pub use off::read_off;
pub use ply::read_ply;
pub use threemf::{flatten_model, read_3mf};

use crate::error::{Error, Result};
use crate::model::TriangleMesh;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;
use std::str::FromStr;

/// Mesh file formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Stanford polygon file format
    Ply,
    /// Wavefront OBJ
    Obj,
    /// Object File Format (OFF/COFF)
    Off,
    /// 3D Manufacturing Format
    ThreeMf,
}

impl MeshFormat {
    /// Get the format for a file extension, ignoring case
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ply" => Some(MeshFormat::Ply),
            "obj" => Some(MeshFormat::Obj),
            "off" => Some(MeshFormat::Off),
            "3mf" => Some(MeshFormat::ThreeMf),
            _ => None,
        }
    }

    /// Get the format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::Unsupported(format!(
                    "Cannot determine mesh format of '{}': no file extension",
                    path.display()
                ))
            })?;

        Self::from_extension(extension).ok_or_else(|| {
            Error::Unsupported(format!(
                "Unknown mesh file extension '.{}' (expected ply, obj, off or 3mf)",
                extension
            ))
        })
    }

    /// The canonical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Ply => "ply",
            MeshFormat::Obj => "obj",
            MeshFormat::Off => "off",
            MeshFormat::ThreeMf => "3mf",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MeshFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('.');
        Self::from_extension(trimmed)
            .ok_or_else(|| Error::Unsupported(format!("Unknown mesh format '{}'", s)))
    }
}

/// Options for [`read_triangle_mesh_with_config`]
///
/// # Example
///
/// ```
/// use meshcc::io::{LoadConfig, MeshFormat};
///
/// let config = LoadConfig::new().with_format(MeshFormat::Ply);
/// assert_eq!(config.format(), Some(MeshFormat::Ply));
/// assert!(config.validates_indices());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    format: Option<MeshFormat>,
    validate_indices: bool,
}

impl LoadConfig {
    /// Create the default configuration: format from the extension, index validation on
    pub fn new() -> Self {
        Self {
            format: None,
            validate_indices: true,
        }
    }

    /// Read every file as `format`, regardless of its extension
    pub fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Enable or disable the triangle index range check after parsing
    pub fn with_index_validation(mut self, validate: bool) -> Self {
        self.validate_indices = validate;
        self
    }

    /// The forced format, if any
    pub fn format(&self) -> Option<MeshFormat> {
        self.format
    }

    /// Whether triangle indices are range-checked
    pub fn validates_indices(&self) -> bool {
        self.validate_indices
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a triangle mesh from a file, choosing the reader by extension
pub fn read_triangle_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    read_triangle_mesh_with_config(path, &LoadConfig::default())
}

/// Read a triangle mesh from a file with explicit options
pub fn read_triangle_mesh_with_config<P: AsRef<Path>>(
    path: P,
    config: &LoadConfig,
) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let format = match config.format() {
        Some(format) => format,
        None => MeshFormat::from_path(path)?,
    };

    tracing::debug!(path = %path.display(), %format, "loading triangle mesh");
    let file = File::open(path)?;
    read_triangle_mesh_from(BufReader::new(file), format, config)
}

/// Read a triangle mesh of a known format from a reader
pub fn read_triangle_mesh_from<R: BufRead + Seek>(
    reader: R,
    format: MeshFormat,
    config: &LoadConfig,
) -> Result<TriangleMesh> {
    let mesh = match format {
        MeshFormat::Ply => read_ply(reader)?,
        MeshFormat::Obj => read_obj(reader)?,
        MeshFormat::Off => read_off(reader)?,
        MeshFormat::ThreeMf => read_3mf(reader)?,
    };

    if config.validates_indices() {
        mesh.validate_indices()?;
    }

    tracing::debug!(
        vertices = mesh.vertices.len(),
        triangles = mesh.triangles.len(),
        colors = mesh.vertex_colors.len(),
        "mesh loaded"
    );

    Ok(mesh)
}

/// Upper bound on capacity reserved from counts declared in a file header
///
/// Vectors grow past this as data actually arrives.
pub(crate) const MAX_PREALLOCATION: usize = 1 << 16;

/// Fan-triangulate a polygon given as vertex indices
///
/// Shared by the PLY, OBJ and OFF readers.
pub(crate) fn push_polygon(
    mesh: &mut TriangleMesh,
    polygon: &[usize],
    context: &str,
) -> Result<()> {
    if polygon.len() < 3 {
        return Err(Error::InvalidModel(format!(
            "{}: face has {} vertices, at least 3 are required",
            context,
            polygon.len()
        )));
    }

    for i in 1..polygon.len() - 1 {
        mesh.triangles.push(crate::model::Triangle::new(
            polygon[0],
            polygon[i],
            polygon[i + 1],
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            MeshFormat::from_path(Path::new("a/b/mesh.PLY")).unwrap(),
            MeshFormat::Ply
        );
        assert_eq!(
            MeshFormat::from_path(Path::new("model.3mf")).unwrap(),
            MeshFormat::ThreeMf
        );
        assert!(matches!(
            MeshFormat::from_path(Path::new("mesh.stl")),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            MeshFormat::from_path(&PathBuf::from("mesh")),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("off".parse::<MeshFormat>().unwrap(), MeshFormat::Off);
        assert_eq!(".obj".parse::<MeshFormat>().unwrap(), MeshFormat::Obj);
        assert!("gltf".parse::<MeshFormat>().is_err());
        assert_eq!(MeshFormat::ThreeMf.to_string(), "3mf");
    }

    #[test]
    fn test_load_config_builder() {
        let config = LoadConfig::new();
        assert_eq!(config.format(), None);
        assert!(config.validates_indices());

        let config = config
            .with_format(MeshFormat::Obj)
            .with_index_validation(false);
        assert_eq!(config.format(), Some(MeshFormat::Obj));
        assert!(!config.validates_indices());
    }

    #[test]
    fn test_push_polygon_fans_quads() {
        let mut mesh = TriangleMesh::new();
        push_polygon(&mut mesh, &[4, 5, 6, 7], "test").unwrap();
        let triangles: Vec<[usize; 3]> = mesh.triangles.iter().map(|t| t.indices()).collect();
        assert_eq!(triangles, vec![[4, 5, 6], [4, 6, 7]]);

        assert!(matches!(
            push_polygon(&mut mesh, &[1, 2], "test"),
            Err(Error::InvalidModel(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_triangle_mesh("/nonexistent/dir/mesh.ply");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
