//! The command-line pipeline: load a mesh, extract components, write them out
//!
//! [`run`] only talks to the mesh library through [`MeshBackend`], so the
//! pipeline can be exercised with a scripted backend.

use crate::components::ConnectedComponentList;
use crate::error::Result;
use crate::io::{LoadConfig, read_triangle_mesh_with_config};
use crate::model::TriangleMesh;
use crate::output::write_components_to_path;
use std::fs;
use std::path::Path;

/// The two mesh operations the pipeline needs
pub trait MeshBackend {
    /// Loaded mesh representation, opaque to the pipeline
    type Mesh;

    /// Load the mesh stored at `path`
    fn load(&self, path: &Path) -> Result<Self::Mesh>;

    /// Identically colored connected components, in output order
    fn components(&self, mesh: &Self::Mesh) -> ConnectedComponentList;
}

/// Backend built on this crate's loaders and component extraction
#[derive(Debug, Clone, Default)]
pub struct DefaultBackend {
    config: LoadConfig,
}

impl DefaultBackend {
    /// Create a backend that loads with `config`
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// The load configuration in use
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }
}

impl MeshBackend for DefaultBackend {
    type Mesh = TriangleMesh;

    fn load(&self, path: &Path) -> Result<TriangleMesh> {
        read_triangle_mesh_with_config(path, &self.config)
    }

    fn components(&self, mesh: &TriangleMesh) -> ConnectedComponentList {
        mesh.identically_colored_connected_components()
    }
}

/// Delete `path` if a file exists there. Returns whether one was removed.
pub fn remove_stale_output(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    tracing::debug!(path = %path.display(), "removed existing output file");
    Ok(true)
}

/// Run the pipeline and return the number of components written
///
/// The old output file is removed before the mesh is loaded, so a failed load
/// leaves no output behind.
pub fn run<B: MeshBackend>(backend: &B, input: &Path, output: &Path) -> Result<usize> {
    remove_stale_output(output)?;

    let mesh = backend.load(input)?;
    let components = backend.components(&mesh);
    write_components_to_path(output, &components)?;

    Ok(components.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Returns canned components and records the paths it was asked to load
    struct ScriptedBackend {
        components: ConnectedComponentList,
        fail_load: bool,
        loaded: RefCell<Vec<PathBuf>>,
    }

    impl ScriptedBackend {
        fn returning(components: ConnectedComponentList) -> Self {
            Self {
                components,
                fail_load: false,
                loaded: RefCell::new(Vec::new()),
            }
        }
    }

    impl MeshBackend for ScriptedBackend {
        type Mesh = ();

        fn load(&self, path: &Path) -> Result<()> {
            self.loaded.borrow_mut().push(path.to_path_buf());
            if self.fail_load {
                return Err(Error::InvalidModel("scripted failure".to_string()));
            }
            Ok(())
        }

        fn components(&self, _mesh: &()) -> ConnectedComponentList {
            self.components.clone()
        }
    }

    #[test]
    fn test_run_writes_components_in_backend_order() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.txt");
        let backend = ScriptedBackend::returning(vec![vec![3, 4], vec![0, 1, 2]]);

        let count = run(&backend, Path::new("mesh.ply"), &output).unwrap();
        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "3 4 \n0 1 2 \n");
        assert_eq!(*backend.loaded.borrow(), vec![PathBuf::from("mesh.ply")]);
    }

    #[test]
    fn test_zero_components_creates_empty_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.txt");
        let backend = ScriptedBackend::returning(Vec::new());

        assert_eq!(run(&backend, Path::new("in.ply"), &output).unwrap(), 0);
        assert!(output.exists());
        assert_eq!(fs::read(&output).unwrap(), b"");
    }

    #[test]
    fn test_failed_load_leaves_no_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.txt");
        fs::write(&output, "previous run\n").unwrap();

        let mut backend = ScriptedBackend::returning(vec![vec![0]]);
        backend.fail_load = true;

        let err = run(&backend, Path::new("in.ply"), &output).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_remove_stale_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.txt");

        assert!(!remove_stale_output(&path).unwrap());
        fs::write(&path, "old").unwrap();
        assert!(remove_stale_output(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_default_backend_unknown_extension() {
        let backend = DefaultBackend::default();
        assert!(backend.config().validates_indices());
        assert!(matches!(
            backend.load(Path::new("mesh.stl")),
            Err(Error::Unsupported(_))
        ));
    }
}
