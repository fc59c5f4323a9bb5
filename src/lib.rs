//! # meshcc
//!
//! Identically colored connected components of triangle meshes.
//!
//! A component is a set of vertices joined by triangle edges where every
//! vertex has exactly the same color. This crate loads colored meshes and
//! extracts those components, and the `meshcc` binary writes them to a text
//! file, one line per component.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - PLY (ascii and binary), OBJ, OFF/COFF and 3MF input
//! - Per-vertex colors from PLY/OBJ/OFF vertex data and 3MF color groups or
//!   base materials
//! - Deterministic component order: ascending by smallest vertex index
//!
//! ## Example
//!
//! ```no_run
//! use meshcc::TriangleMesh;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mesh = TriangleMesh::from_path("painted.ply")?;
//! for component in mesh.identically_colored_connected_components() {
//!     println!("{:?}", component);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod components;
pub mod driver;
pub mod error;
pub mod io;
pub mod model;
pub mod opc;
pub mod output;
pub mod parser;

pub use components::{ConnectedComponent, ConnectedComponentList};
pub use driver::{DefaultBackend, MeshBackend};
pub use error::{Error, Result};
pub use io::{LoadConfig, MeshFormat};
pub use model::{
    BaseMaterial, BaseMaterialGroup, Color, ColorGroup, Mesh, Model, Object, Resources, Triangle,
    TriangleMesh, Vertex,
};

use std::io::{Read, Seek};
use std::path::Path;

impl TriangleMesh {
    /// Load a triangle mesh from a file, picking the format from its extension
    ///
    /// # Example
    ///
    /// ```no_run
    /// use meshcc::TriangleMesh;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mesh = TriangleMesh::from_path("model.obj")?;
    /// println!("{} vertices", mesh.vertices.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        io::read_triangle_mesh(path)
    }
}

impl Model {
    /// Parse a 3MF package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        parser::parse_3mf(reader)
    }
}
