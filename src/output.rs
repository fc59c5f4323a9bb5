//! Text output of connected components
//!
//! One line per component. Each vertex index is followed by a single space,
//! so a line always ends with `" \n"`:
//!
//! ```text
//! 0 1 2 \n
//! 3 4 \n
//! ```

use crate::components::ConnectedComponentList;
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `components` to `writer`, one line per component
///
/// # Example
///
/// ```
/// use meshcc::output::write_components;
///
/// let mut out = Vec::new();
/// write_components(&mut out, &vec![vec![0, 1, 2], vec![3, 4]]).unwrap();
/// assert_eq!(out, b"0 1 2 \n3 4 \n");
/// ```
pub fn write_components<W: Write>(
    mut writer: W,
    components: &ConnectedComponentList,
) -> std::io::Result<()> {
    for component in components {
        for index in component {
            write!(writer, "{} ", index)?;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write `components` into it
///
/// An empty list still creates an empty file.
pub fn write_components_to_path<P: AsRef<Path>>(
    path: P,
    components: &ConnectedComponentList,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_components(&mut writer, components)?;
    writer.flush()?;

    tracing::debug!(
        path = %path.display(),
        components = components.len(),
        "components written"
    );
    Ok(())
}
