//! Core mesh types and the 3MF document types they are flattened from

use crate::error::{Error, Result};

/// A 3D vertex with x, y, z coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A triangle defined by three vertex indices
///
/// The property fields are only filled in by the 3MF reader, where they select
/// a color from a color group or base material group.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: usize,
    /// Index of second vertex
    pub v2: usize,
    /// Index of third vertex
    pub v3: usize,
    /// Optional property group ID
    pub pid: Option<usize>,
    /// Optional property index for the entire triangle
    pub pindex: Option<usize>,
    /// Optional property index for vertex 1
    pub p1: Option<usize>,
    /// Optional property index for vertex 2
    pub p2: Option<usize>,
    /// Optional property index for vertex 3
    pub p3: Option<usize>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self {
            v1,
            v2,
            v3,
            pid: None,
            pindex: None,
            p1: None,
            p2: None,
            p3: None,
        }
    }

    /// The three vertex indices in winding order
    pub fn indices(&self) -> [usize; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// An RGB color with channels normalized to `[0, 1]`
///
/// Equality is exact per channel. Two colors read from the same 8-bit values
/// always compare equal because the conversion is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
}

impl Color {
    /// Create a color from normalized channels
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Create a color from an RGBA tuple, dropping alpha
    pub fn from_rgba_tuple((r, g, b, _a): (u8, u8, u8, u8)) -> Self {
        Self::from_rgb8(r, g, b)
    }
}

/// A triangle mesh with optional per-vertex colors
///
/// This is what every reader in [`crate::io`] produces. The mesh has vertex
/// colors only when `vertex_colors` holds exactly one entry per vertex.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// List of vertices
    pub vertices: Vec<Vertex>,
    /// List of triangles
    pub triangles: Vec<Triangle>,
    /// Per-vertex colors, empty when the source carried none
    pub vertex_colors: Vec<Color>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mesh with pre-allocated capacity
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
            vertex_colors: Vec::new(),
        }
    }

    /// Check if the mesh has any vertices
    pub fn has_vertices(&self) -> bool {
        !self.vertices.is_empty()
    }

    /// Check if the mesh has any triangles
    pub fn has_triangles(&self) -> bool {
        !self.triangles.is_empty()
    }

    /// Check if every vertex carries a color
    pub fn has_vertex_colors(&self) -> bool {
        self.has_vertices() && self.vertex_colors.len() == self.vertices.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Verify that every triangle references an existing vertex
    pub fn validate_indices(&self) -> Result<()> {
        let count = self.vertices.len();
        for (i, triangle) in self.triangles.iter().enumerate() {
            for index in triangle.indices() {
                if index >= count {
                    return Err(Error::InvalidModel(format!(
                        "Triangle {} references vertex {} but the mesh has only {} vertices",
                        i, index, count
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Mesh of a single 3MF object, before flattening
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// List of vertices
    pub vertices: Vec<Vertex>,
    /// List of triangles
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }
}

/// A 3MF object
#[derive(Debug, Clone)]
pub struct Object {
    /// Object ID
    pub id: usize,
    /// Object name (optional)
    pub name: Option<String>,
    /// Optional mesh data
    pub mesh: Option<Mesh>,
    /// Default property group for triangles that carry none
    pub pid: Option<usize>,
    /// Default property index, used with `pid`
    pub pindex: Option<usize>,
}

impl Object {
    /// Create a new object
    pub fn new(id: usize) -> Self {
        Self {
            id,
            name: None,
            mesh: None,
            pid: None,
            pindex: None,
        }
    }
}

/// Resources section containing objects and color sources
#[derive(Debug, Clone, Default)]
pub struct Resources {
    /// List of objects, in document order
    pub objects: Vec<Object>,
    /// List of color groups (materials extension)
    pub color_groups: Vec<super::ColorGroup>,
    /// List of base material groups
    pub base_material_groups: Vec<super::BaseMaterialGroup>,
}

impl Resources {
    /// Create a new empty resources section
    pub fn new() -> Self {
        Self::default()
    }
}

/// A parsed 3MF model document
#[derive(Debug, Clone)]
pub struct Model {
    /// Unit of measurement (e.g., "millimeter", "inch")
    pub unit: String,
    /// Resources (objects, colors)
    pub resources: Resources,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self {
            unit: "millimeter".to_string(),
            resources: Resources::new(),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_rgb8_is_normalized() {
        let c = Color::from_rgb8(255, 0, 51);
        assert_eq!(c, Color::new(1.0, 0.0, 0.2));
    }

    #[test]
    fn test_color_equality_is_exact() {
        assert_eq!(Color::from_rgb8(10, 20, 30), Color::from_rgb8(10, 20, 30));
        assert_ne!(Color::from_rgb8(10, 20, 30), Color::from_rgb8(10, 20, 31));
        assert_eq!(
            Color::from_rgba_tuple((10, 20, 30, 0)),
            Color::from_rgba_tuple((10, 20, 30, 255))
        );
    }

    #[test]
    fn test_has_vertex_colors_requires_one_per_vertex() {
        let mut mesh = TriangleMesh::new();
        assert!(!mesh.has_vertex_colors());

        mesh.vertices.push(Vertex::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(1.0, 0.0, 0.0));
        assert!(!mesh.has_vertex_colors());

        mesh.vertex_colors.push(Color::default());
        assert!(!mesh.has_vertex_colors());

        mesh.vertex_colors.push(Color::default());
        assert!(mesh.has_vertex_colors());
    }

    #[test]
    fn test_validate_indices_rejects_out_of_range() {
        let mut mesh = TriangleMesh::new();
        mesh.vertices.push(Vertex::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(0.0, 1.0, 0.0));
        assert!(!mesh.has_triangles());
        mesh.triangles.push(Triangle::new(0, 1, 2));
        assert!(mesh.has_triangles());
        assert!(mesh.validate_indices().is_ok());

        mesh.triangles.push(Triangle::new(0, 2, 3));
        let err = mesh.validate_indices().unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
        assert!(err.to_string().contains("Triangle 1 references vertex 3"));
    }

    #[test]
    fn test_mesh_with_capacity_is_empty() {
        let mesh = TriangleMesh::with_capacity(100, 50);
        assert!(mesh.is_empty());
        assert!(mesh.vertices.capacity() >= 100);
        assert!(mesh.triangles.capacity() >= 50);
    }
}
