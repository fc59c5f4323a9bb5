//! PLY (Polygon File Format) reading
//!
//! The header declares elements and their properties; the body follows in
//! ascii or binary encoding. Only the `vertex` and `face` elements contribute
//! to the mesh, every other element is read and discarded.

use crate::error::{Error, Result};
use crate::model::{Color, TriangleMesh, Vertex};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use std::collections::VecDeque;
use std::io::BufRead;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl ScalarType {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "char" | "int8" => ScalarType::Int8,
            "uchar" | "uint8" => ScalarType::UInt8,
            "short" | "int16" => ScalarType::Int16,
            "ushort" | "uint16" => ScalarType::UInt16,
            "int" | "int32" => ScalarType::Int32,
            "uint" | "uint32" => ScalarType::UInt32,
            "float" | "float32" => ScalarType::Float32,
            "double" | "float64" => ScalarType::Float64,
            _ => {
                return Err(Error::Unsupported(format!("PLY property type '{}'", name)));
            }
        })
    }

    fn is_float(self) -> bool {
        matches!(self, ScalarType::Float32 | ScalarType::Float64)
    }

    /// Divisor that maps an integer color channel onto `[0, 1]`
    fn color_scale(self) -> f64 {
        match self {
            ScalarType::Int8 => f64::from(i8::MAX),
            ScalarType::UInt8 => f64::from(u8::MAX),
            ScalarType::Int16 => f64::from(i16::MAX),
            ScalarType::UInt16 => f64::from(u16::MAX),
            ScalarType::Int32 => f64::from(i32::MAX),
            ScalarType::UInt32 => f64::from(u32::MAX),
            ScalarType::Float32 | ScalarType::Float64 => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    kind: PropertyKind,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

impl Element {
    fn position(&self, names: &[&str]) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| names.contains(&p.name.as_str()))
    }
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
}

/// Read a PLY mesh
pub fn read_ply<R: BufRead>(mut reader: R) -> Result<TriangleMesh> {
    let header = read_header(&mut reader)?;
    tracing::trace!(encoding = ?header.encoding, elements = header.elements.len(), "PLY header");

    match header.encoding {
        Encoding::Ascii => read_body(&header, &mut AsciiBody::new(reader)),
        Encoding::BinaryLittleEndian => {
            read_body(&header, &mut BinaryBody::<_, LittleEndian>::new(reader))
        }
        Encoding::BinaryBigEndian => {
            read_body(&header, &mut BinaryBody::<_, BigEndian>::new(reader))
        }
    }
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let mut line = String::new();
    let mut next_line = |reader: &mut R| -> Result<Option<String>> {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    };

    if next_line(&mut *reader)?.as_deref() != Some("ply") {
        return Err(Error::invalid_format_context(
            "PLY header",
            "file does not start with 'ply'",
        ));
    }

    let mut encoding = None;
    let mut elements: Vec<Element> = Vec::new();

    loop {
        let line = next_line(&mut *reader)?.ok_or_else(|| {
            Error::invalid_format_context("PLY header", "missing end_header")
        })?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            [] | ["comment", ..] | ["obj_info", ..] => {}
            ["end_header"] => break,
            ["format", kind, _version] => {
                encoding = Some(match *kind {
                    "ascii" => Encoding::Ascii,
                    "binary_little_endian" => Encoding::BinaryLittleEndian,
                    "binary_big_endian" => Encoding::BinaryBigEndian,
                    other => {
                        return Err(Error::Unsupported(format!("PLY encoding '{}'", other)));
                    }
                });
            }
            ["element", name, count] => {
                let count = count.parse::<usize>().map_err(|_| {
                    Error::parse_error_with_context("PLY element count", count, "integer")
                })?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", count, item, name] => {
                let element = elements.last_mut().ok_or_else(|| {
                    Error::invalid_format_context("PLY header", "property before any element")
                })?;
                element.properties.push(Property {
                    name: name.to_string(),
                    kind: PropertyKind::List {
                        count: ScalarType::parse(count)?,
                        item: ScalarType::parse(item)?,
                    },
                });
            }
            ["property", ty, name] => {
                let element = elements.last_mut().ok_or_else(|| {
                    Error::invalid_format_context("PLY header", "property before any element")
                })?;
                element.properties.push(Property {
                    name: name.to_string(),
                    kind: PropertyKind::Scalar(ScalarType::parse(ty)?),
                });
            }
            _ => {
                return Err(Error::invalid_format_context(
                    "PLY header",
                    &format!("unrecognized line '{}'", line),
                ));
            }
        }
    }

    let encoding = encoding
        .ok_or_else(|| Error::invalid_format_context("PLY header", "missing format line"))?;

    Ok(Header { encoding, elements })
}

/// Source of scalar values in the PLY body
trait ScalarSource {
    fn read_scalar(&mut self, ty: ScalarType) -> Result<f64>;
}

struct AsciiBody<R> {
    reader: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> AsciiBody<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            tokens: VecDeque::new(),
        }
    }
}

impl<R: BufRead> ScalarSource for AsciiBody<R> {
    fn read_scalar(&mut self, ty: ScalarType) -> Result<f64> {
        while self.tokens.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(Error::invalid_format_context("PLY body", "unexpected end of data"));
            }
            self.tokens.extend(line.split_whitespace().map(str::to_string));
        }

        let token = self.tokens.pop_front().unwrap_or_default();
        let parsed = if ty.is_float() {
            token.parse::<f64>().ok()
        } else {
            token.parse::<i64>().ok().map(|v| v as f64)
        };
        parsed.ok_or_else(|| Error::parse_error_with_context("PLY value", &token, "number"))
    }
}

struct BinaryBody<R, E> {
    reader: R,
    order: PhantomData<E>,
}

impl<R: BufRead, E: ByteOrder> BinaryBody<R, E> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            order: PhantomData,
        }
    }
}

impl<R: BufRead, E: ByteOrder> ScalarSource for BinaryBody<R, E> {
    fn read_scalar(&mut self, ty: ScalarType) -> Result<f64> {
        let reader = &mut self.reader;
        Ok(match ty {
            ScalarType::Int8 => f64::from(reader.read_i8()?),
            ScalarType::UInt8 => f64::from(reader.read_u8()?),
            ScalarType::Int16 => f64::from(reader.read_i16::<E>()?),
            ScalarType::UInt16 => f64::from(reader.read_u16::<E>()?),
            ScalarType::Int32 => f64::from(reader.read_i32::<E>()?),
            ScalarType::UInt32 => f64::from(reader.read_u32::<E>()?),
            ScalarType::Float32 => f64::from(reader.read_f32::<E>()?),
            ScalarType::Float64 => reader.read_f64::<E>()?,
        })
    }
}

/// Column layout of the vertex element
struct VertexLayout {
    position: [usize; 3],
    color: Option<([usize; 3], [f64; 3])>,
}

impl VertexLayout {
    fn new(element: &Element) -> Result<Self> {
        let column = |names: &[&str], axis: &str| {
            element.position(names).ok_or_else(|| {
                Error::invalid_format_context(
                    "PLY header",
                    &format!("vertex element has no '{}' property", axis),
                )
            })
        };
        let position = [column(&["x"], "x")?, column(&["y"], "y")?, column(&["z"], "z")?];

        let red = element.position(&["red", "r", "diffuse_red"]);
        let green = element.position(&["green", "g", "diffuse_green"]);
        let blue = element.position(&["blue", "b", "diffuse_blue"]);

        let color = match (red, green, blue) {
            (Some(r), Some(g), Some(b)) => {
                let scale = |i: usize| match element.properties[i].kind {
                    PropertyKind::Scalar(ty) => Ok(ty.color_scale()),
                    PropertyKind::List { .. } => Err(Error::invalid_format_context(
                        "PLY header",
                        "color property cannot be a list",
                    )),
                };
                Some(([r, g, b], [scale(r)?, scale(g)?, scale(b)?]))
            }
            _ => None,
        };

        Ok(Self { position, color })
    }
}

fn read_body<S: ScalarSource>(header: &Header, source: &mut S) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new();
    let mut values: Vec<f64> = Vec::new();
    let mut polygon: Vec<usize> = Vec::new();

    for element in &header.elements {
        match element.name.as_str() {
            "vertex" => {
                let layout = VertexLayout::new(element)?;
                mesh.vertices.reserve(element.count.min(super::MAX_PREALLOCATION));

                for _ in 0..element.count {
                    values.clear();
                    for property in &element.properties {
                        match property.kind {
                            PropertyKind::Scalar(ty) => values.push(source.read_scalar(ty)?),
                            PropertyKind::List { count, item } => {
                                skip_list(source, count, item)?;
                                values.push(0.0);
                            }
                        }
                    }

                    let [x, y, z] = layout.position.map(|i| values[i]);
                    mesh.vertices.push(Vertex::new(x, y, z));

                    if let Some((columns, scale)) = layout.color {
                        mesh.vertex_colors.push(Color::new(
                            values[columns[0]] / scale[0],
                            values[columns[1]] / scale[1],
                            values[columns[2]] / scale[2],
                        ));
                    }
                }
            }
            "face" => {
                let indices = element
                    .position(&["vertex_indices", "vertex_index"])
                    .ok_or_else(|| {
                        Error::invalid_format_context(
                            "PLY header",
                            "face element has no vertex_indices property",
                        )
                    })?;
                mesh.triangles.reserve(element.count.min(super::MAX_PREALLOCATION));

                for face in 0..element.count {
                    for (i, property) in element.properties.iter().enumerate() {
                        match property.kind {
                            PropertyKind::List { count, item } if i == indices => {
                                polygon.clear();
                                let n = read_count(source, count)?;
                                for _ in 0..n {
                                    polygon.push(read_index(source, item)?);
                                }
                                let context = format!("PLY face {}", face);
                                super::push_polygon(&mut mesh, &polygon, &context)?;
                            }
                            PropertyKind::List { count, item } => skip_list(source, count, item)?,
                            PropertyKind::Scalar(ty) if i == indices => {
                                return Err(Error::Unsupported(format!(
                                    "PLY face indices declared as scalar {:?}",
                                    ty
                                )));
                            }
                            PropertyKind::Scalar(ty) => {
                                source.read_scalar(ty)?;
                            }
                        }
                    }
                }
            }
            other => {
                tracing::trace!(element = other, count = element.count, "skipping PLY element");
                for _ in 0..element.count {
                    for property in &element.properties {
                        match property.kind {
                            PropertyKind::Scalar(ty) => {
                                source.read_scalar(ty)?;
                            }
                            PropertyKind::List { count, item } => skip_list(source, count, item)?,
                        }
                    }
                }
            }
        }
    }

    Ok(mesh)
}

fn read_count<S: ScalarSource>(source: &mut S, ty: ScalarType) -> Result<usize> {
    let value = source.read_scalar(ty)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(Error::InvalidModel(format!("Invalid PLY list length {}", value)));
    }
    Ok(value as usize)
}

fn read_index<S: ScalarSource>(source: &mut S, ty: ScalarType) -> Result<usize> {
    let value = source.read_scalar(ty)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(Error::InvalidModel(format!("Invalid PLY vertex index {}", value)));
    }
    Ok(value as usize)
}

fn skip_list<S: ScalarSource>(source: &mut S, count: ScalarType, item: ScalarType) -> Result<()> {
    let n = read_count(source, count)?;
    for _ in 0..n {
        source.read_scalar(item)?;
    }
    Ok(())
}
