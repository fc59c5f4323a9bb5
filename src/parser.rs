//! XML parsing for 3MF model files
//!
//! Only the subset needed to recover colored geometry is read: object meshes,
//! color groups and base materials. Other elements are skipped.

use crate::error::{Error, Result};
use crate::model::*;
use crate::opc::Package;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Parse a 3MF file from a reader
pub fn parse_3mf<R: Read + Seek>(reader: R) -> Result<Model> {
    let mut package = Package::open(reader)?;
    let model_xml = package.get_model()?;
    parse_model_xml(&model_xml)
}

/// Parse the 3D model XML content
pub fn parse_model_xml(xml: &str) -> Result<Model> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut model = Model::new();
    let mut buf = Vec::new();
    let mut in_resources = false;
    let mut current_object: Option<Object> = None;
    let mut current_mesh: Option<Mesh> = None;
    let mut current_colorgroup: Option<ColorGroup> = None;
    let mut current_basematerials: Option<BaseMaterialGroup> = None;

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf)?;
        let is_empty = matches!(event, Event::Empty(_));

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"model" => {
                        let attrs = parse_attributes(e)?;
                        if let Some(unit) = attrs.get("unit") {
                            model.unit = unit.clone();
                        }
                    }
                    b"resources" => in_resources = !is_empty,
                    b"object" if in_resources => {
                        let object = parse_object(e)?;
                        if is_empty {
                            model.resources.objects.push(object);
                        } else {
                            current_object = Some(object);
                        }
                    }
                    b"mesh" if current_object.is_some() => {
                        current_mesh = Some(Mesh::new());
                        if is_empty {
                            finish_mesh(&mut current_object, &mut current_mesh);
                        }
                    }
                    b"vertex" => {
                        if let Some(ref mut mesh) = current_mesh {
                            mesh.vertices.push(parse_vertex(e)?);
                        }
                    }
                    b"triangle" => {
                        if let Some(ref mut mesh) = current_mesh {
                            mesh.triangles.push(parse_triangle(e)?);
                        }
                    }
                    b"colorgroup" if in_resources => {
                        let group = ColorGroup::new(parse_id(e, "colorgroup")?);
                        if is_empty {
                            model.resources.color_groups.push(group);
                        } else {
                            current_colorgroup = Some(group);
                        }
                    }
                    b"color" => {
                        if let Some(ref mut group) = current_colorgroup {
                            let attrs = parse_attributes(e)?;
                            let value = attrs
                                .get("color")
                                .ok_or_else(|| Error::missing_attribute("color", "color"))?;
                            let color = parse_color(value).ok_or_else(|| {
                                Error::parse_error_with_context("color", value, "#RRGGBB[AA]")
                            })?;
                            group.colors.push(color);
                        }
                    }
                    b"basematerials" if in_resources => {
                        let group = BaseMaterialGroup::new(parse_id(e, "basematerials")?);
                        if is_empty {
                            model.resources.base_material_groups.push(group);
                        } else {
                            current_basematerials = Some(group);
                        }
                    }
                    b"base" => {
                        if let Some(ref mut group) = current_basematerials {
                            group.materials.push(parse_base_material(e)?);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"resources" => in_resources = false,
                b"mesh" => finish_mesh(&mut current_object, &mut current_mesh),
                b"object" => {
                    if let Some(obj) = current_object.take() {
                        model.resources.objects.push(obj);
                    }
                }
                b"colorgroup" => {
                    if let Some(group) = current_colorgroup.take() {
                        model.resources.color_groups.push(group);
                    }
                }
                b"basematerials" => {
                    if let Some(group) = current_basematerials.take() {
                        model.resources.base_material_groups.push(group);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(model)
}

fn finish_mesh(object: &mut Option<Object>, mesh: &mut Option<Mesh>) {
    if let (Some(obj), Some(mesh)) = (object.as_mut(), mesh.take()) {
        obj.mesh = Some(mesh);
    }
}

/// Parse object element attributes
fn parse_object(e: &BytesStart) -> Result<Object> {
    let attrs = parse_attributes(e)?;

    let id = attrs
        .get("id")
        .ok_or_else(|| Error::missing_attribute("object", "id"))?
        .parse::<usize>()?;

    let mut object = Object::new(id);
    object.name = attrs.get("name").cloned();

    if let Some(pid) = attrs.get("pid") {
        object.pid = Some(pid.parse::<usize>()?);
    }

    if let Some(pindex) = attrs.get("pindex") {
        object.pindex = Some(pindex.parse::<usize>()?);
    }

    Ok(object)
}

fn parse_id(e: &BytesStart, element: &str) -> Result<usize> {
    let attrs = parse_attributes(e)?;
    Ok(attrs
        .get("id")
        .ok_or_else(|| Error::missing_attribute(element, "id"))?
        .parse::<usize>()?)
}

/// Parse vertex element attributes
fn parse_vertex(e: &BytesStart) -> Result<Vertex> {
    let mut x_opt: Option<f64> = None;
    let mut y_opt: Option<f64> = None;
    let mut z_opt: Option<f64> = None;

    let parse_f64 = |value: &[u8]| -> Result<f64> {
        let value_str = std::str::from_utf8(value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        Ok(value_str.trim().parse::<f64>()?)
    };

    for attr_result in e.attributes() {
        let attr = attr_result?;
        match attr.key.as_ref() {
            b"x" => x_opt = Some(parse_f64(&attr.value)?),
            b"y" => y_opt = Some(parse_f64(&attr.value)?),
            b"z" => z_opt = Some(parse_f64(&attr.value)?),
            _ => {}
        }
    }

    let x = x_opt.ok_or_else(|| Error::missing_attribute("vertex", "x"))?;
    let y = y_opt.ok_or_else(|| Error::missing_attribute("vertex", "y"))?;
    let z = z_opt.ok_or_else(|| Error::missing_attribute("vertex", "z"))?;

    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(Error::InvalidXml(format!(
            "Vertex coordinates must be finite (got {}, {}, {})",
            x, y, z
        )));
    }

    Ok(Vertex::new(x, y, z))
}

/// Parse triangle element attributes
fn parse_triangle(e: &BytesStart) -> Result<Triangle> {
    let mut v1_opt: Option<usize> = None;
    let mut v2_opt: Option<usize> = None;
    let mut v3_opt: Option<usize> = None;
    let mut triangle = Triangle::new(0, 0, 0);

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = attr.key.as_ref();
        if !matches!(
            key,
            b"v1" | b"v2" | b"v3" | b"pid" | b"pindex" | b"p1" | b"p2" | b"p3"
        ) {
            continue;
        }

        let value_str =
            std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let value = value_str.trim().parse::<usize>()?;

        match key {
            b"v1" => v1_opt = Some(value),
            b"v2" => v2_opt = Some(value),
            b"v3" => v3_opt = Some(value),
            b"pid" => triangle.pid = Some(value),
            b"pindex" => triangle.pindex = Some(value),
            b"p1" => triangle.p1 = Some(value),
            b"p2" => triangle.p2 = Some(value),
            b"p3" => triangle.p3 = Some(value),
            _ => {}
        }
    }

    triangle.v1 = v1_opt.ok_or_else(|| Error::missing_attribute("triangle", "v1"))?;
    triangle.v2 = v2_opt.ok_or_else(|| Error::missing_attribute("triangle", "v2"))?;
    triangle.v3 = v3_opt.ok_or_else(|| Error::missing_attribute("triangle", "v3"))?;

    Ok(triangle)
}

/// Parse a `<base>` element of a base material group
fn parse_base_material(e: &BytesStart) -> Result<BaseMaterial> {
    let attrs = parse_attributes(e)?;
    let name = attrs.get("name").cloned().unwrap_or_default();
    let value = attrs
        .get("displaycolor")
        .ok_or_else(|| Error::missing_attribute("base", "displaycolor"))?;
    let displaycolor = parse_color(value)
        .ok_or_else(|| Error::parse_error_with_context("displaycolor", value, "#RRGGBB[AA]"))?;
    Ok(BaseMaterial::new(name, displaycolor))
}

/// Parse color string in format #RRGGBBAA or #RRGGBB
fn parse_color(color_str: &str) -> Option<(u8, u8, u8, u8)> {
    let color_str = color_str.trim().trim_start_matches('#');
    if !color_str.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&color_str[i..i + 2], 16).ok();

    match color_str.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

/// Parse attributes from an XML element, keyed by local name
fn parse_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();

    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|e| Error::InvalidXml(e.to_string()))?
            .to_string();
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| Error::InvalidXml(e.to_string()))?
            .to_string();

        attrs.insert(key, value);
    }

    Ok(attrs)
}
