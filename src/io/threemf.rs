//! 3MF reading: flatten a parsed model into one colored triangle mesh
//!
//! 3MF stores colors per triangle corner, as references into color groups or
//! base material groups. A vertex takes the color of the first corner that
//! names it. Object meshes are concatenated in document order and build
//! transforms are not applied.

use crate::error::{Error, Result};
use crate::model::{Color, Model, Object, Resources, Triangle, TriangleMesh};
use crate::parser::parse_3mf;
use std::io::{Read, Seek};

/// Read a 3MF package into a single triangle mesh
pub fn read_3mf<R: Read + Seek>(reader: R) -> Result<TriangleMesh> {
    let model = parse_3mf(reader)?;
    flatten_model(&model)
}

/// Concatenate every object mesh of `model` and resolve per-vertex colors
pub fn flatten_model(model: &Model) -> Result<TriangleMesh> {
    let resources = &model.resources;
    let mut mesh = TriangleMesh::new();
    let mut colors: Vec<Option<Color>> = Vec::new();
    let mut conflicts = 0usize;
    let mut unresolved = 0usize;

    for object in &resources.objects {
        let Some(ref object_mesh) = object.mesh else {
            continue;
        };

        let offset = mesh.vertices.len();
        let count = object_mesh.vertices.len();
        mesh.vertices.extend(object_mesh.vertices.iter().cloned());
        colors.resize(offset + count, None);

        for (t, triangle) in object_mesh.triangles.iter().enumerate() {
            let corners = triangle.indices();
            if let Some(&bad) = corners.iter().find(|&&v| v >= count) {
                return Err(Error::InvalidModel(format!(
                    "Object {} triangle {} references vertex {} but the object has only {} vertices",
                    object.id, t, bad, count
                )));
            }

            mesh.triangles.push(Triangle::new(
                corners[0] + offset,
                corners[1] + offset,
                corners[2] + offset,
            ));

            let corner_props = [triangle.p1, triangle.p2, triangle.p3];
            for (vertex, corner) in corners.into_iter().zip(corner_props) {
                let color = match corner_color(resources, object, triangle, corner)? {
                    Some(color) => color,
                    None => {
                        unresolved += 1;
                        continue;
                    }
                };

                let slot = &mut colors[vertex + offset];
                match *slot {
                    None => *slot = Some(color),
                    Some(existing) if existing != color => conflicts += 1,
                    Some(_) => {}
                }
            }
        }

        if let Some(default) = object_default_color(resources, object)? {
            for slot in &mut colors[offset..] {
                slot.get_or_insert(default);
            }
        }
    }

    if conflicts > 0 || unresolved > 0 {
        tracing::debug!(
            conflicts,
            unresolved,
            "3MF corner colors that did not set a vertex color"
        );
    }

    if colors.iter().any(Option::is_some) {
        mesh.vertex_colors = colors.into_iter().map(Option::unwrap_or_default).collect();
    }

    Ok(mesh)
}

/// Color of one triangle corner, or `None` when no known group is referenced
fn corner_color(
    resources: &Resources,
    object: &Object,
    triangle: &Triangle,
    corner: Option<usize>,
) -> Result<Option<Color>> {
    let pid = triangle.pid.or(object.pid);
    let index = corner.or(triangle.pindex).or(object.pindex);

    match (pid, index) {
        (Some(pid), Some(index)) => lookup(resources, pid, index),
        _ => Ok(None),
    }
}

fn object_default_color(resources: &Resources, object: &Object) -> Result<Option<Color>> {
    match (object.pid, object.pindex) {
        (Some(pid), Some(index)) => lookup(resources, pid, index),
        _ => Ok(None),
    }
}

/// Resolve `(pid, index)`. Unknown groups (textures, composites) give `None`,
/// an index past the end of a known group is an error.
fn lookup(resources: &Resources, pid: usize, index: usize) -> Result<Option<Color>> {
    let Some(group) = resources.property_group(pid) else {
        return Ok(None);
    };

    group.color(index).map(Some).ok_or_else(|| {
        Error::InvalidModel(format!(
            "Property index {} is out of range for group {} with {} entries",
            index,
            pid,
            group.len()
        ))
    })
}
