//! OBJ (Wavefront Object) reading
//!
//! Geometry only: `v` and `f` statements. A vertex line with six or more
//! numbers carries an RGB color after the position, which is a widespread
//! extension of the format.

use crate::error::{Error, Result};
use crate::model::{Color, TriangleMesh, Vertex};
use std::io::BufRead;

/// Read an OBJ mesh
pub fn read_obj<R: BufRead>(reader: R) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new();
    let mut polygon: Vec<usize> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let values = parts
                    .map(|s| {
                        s.parse::<f64>().map_err(|_| {
                            Error::parse_error_with_context(
                                &format!("OBJ vertex on line {}", line_no + 1),
                                s,
                                "floating-point number",
                            )
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;

                if values.len() < 3 {
                    return Err(Error::InvalidModel(format!(
                        "OBJ line {}: vertex needs 3 coordinates, got {}",
                        line_no + 1,
                        values.len()
                    )));
                }
                mesh.vertices.push(Vertex::new(values[0], values[1], values[2]));

                if values.len() >= 6 {
                    let rgb = [values[3], values[4], values[5]];
                    let scale = if rgb.iter().any(|&c| c > 1.0) { 255.0 } else { 1.0 };
                    mesh.vertex_colors
                        .push(Color::new(rgb[0] / scale, rgb[1] / scale, rgb[2] / scale));
                }
            }
            Some("f") => {
                polygon.clear();
                for token in parts {
                    polygon.push(resolve_index(token, mesh.vertices.len(), line_no + 1)?);
                }
                super::push_polygon(&mut mesh, &polygon, &format!("OBJ line {}", line_no + 1))?;
            }
            _ => {}
        }
    }

    if mesh.vertex_colors.len() != mesh.vertices.len() {
        if !mesh.vertex_colors.is_empty() {
            tracing::debug!(
                colored = mesh.vertex_colors.len(),
                vertices = mesh.vertices.len(),
                "OBJ colors present on only some vertices, ignoring them"
            );
        }
        mesh.vertex_colors.clear();
    }

    Ok(mesh)
}

/// Resolve a face token (`i`, `i/t`, `i//n`, `i/t/n`) to a 0-based vertex index
fn resolve_index(token: &str, defined: usize, line: usize) -> Result<usize> {
    let raw = token.split('/').next().unwrap_or(token);
    let index = raw.parse::<i64>().map_err(|_| {
        Error::parse_error_with_context(&format!("OBJ face on line {}", line), token, "integer")
    })?;

    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => (defined as i64 + i).try_into().ok(),
    };

    resolved.ok_or_else(|| {
        Error::InvalidModel(format!(
            "OBJ line {}: face index {} does not name a vertex",
            line, index
        ))
    })
}
