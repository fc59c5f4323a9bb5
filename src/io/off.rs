//! OFF (Object File Format) reading
//!
//! Handles `OFF` and `COFF`. Vertex colors follow the position on each vertex
//! line, either as 0-255 integers or as floats in `[0, 1]`.

use crate::error::{Error, Result};
use crate::model::{Color, TriangleMesh, Vertex};
use std::io::BufRead;

/// Read an OFF or COFF mesh
pub fn read_off<R: BufRead>(reader: R) -> Result<TriangleMesh> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.map(|l| {
                let content = l.split('#').next().unwrap_or("").trim().to_string();
                (i + 1, content)
            })
        })
        .filter(|entry| !matches!(entry, Ok((_, l)) if l.is_empty()));

    let mut next = || -> Result<(usize, String)> {
        lines
            .next()
            .transpose()?
            .ok_or_else(|| Error::invalid_format_context("OFF", "unexpected end of file"))
    };

    let (_, header) = next()?;
    let mut header_tokens = header.split_whitespace();
    let colored = match header_tokens.next() {
        Some("OFF") => false,
        Some("COFF") => true,
        _ => {
            return Err(Error::invalid_format_context(
                "OFF header",
                &format!("expected OFF or COFF, got '{}'", header),
            ));
        }
    };

    let mut counts: Vec<String> = header_tokens.map(str::to_string).collect();
    if counts.is_empty() {
        counts = next()?.1.split_whitespace().map(str::to_string).collect();
    }
    if counts.len() < 2 {
        return Err(Error::invalid_format_context(
            "OFF header",
            "expected vertex and face counts",
        ));
    }
    let vertex_count = parse_count(&counts[0], "vertex count")?;
    let face_count = parse_count(&counts[1], "face count")?;

    let mut mesh = TriangleMesh::with_capacity(
        vertex_count.min(super::MAX_PREALLOCATION),
        face_count.min(super::MAX_PREALLOCATION),
    );

    for _ in 0..vertex_count {
        let (line_no, line) = next()?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(Error::InvalidModel(format!(
                "OFF line {}: vertex needs 3 coordinates",
                line_no
            )));
        }

        let coord = |i: usize| -> Result<f64> {
            tokens[i].parse::<f64>().map_err(|_| {
                Error::parse_error_with_context(
                    &format!("OFF vertex on line {}", line_no),
                    tokens[i],
                    "floating-point number",
                )
            })
        };
        mesh.vertices.push(Vertex::new(coord(0)?, coord(1)?, coord(2)?));

        if tokens.len() >= 6 {
            mesh.vertex_colors.push(parse_color(&tokens[3..6], line_no)?);
        } else if colored {
            return Err(Error::InvalidModel(format!(
                "OFF line {}: COFF vertex is missing its color",
                line_no
            )));
        }
    }

    let mut polygon: Vec<usize> = Vec::new();
    for _ in 0..face_count {
        let (line_no, line) = next()?;
        let mut tokens = line.split_whitespace();
        let n = parse_count(tokens.next().unwrap_or(""), "face vertex count")?;

        polygon.clear();
        for _ in 0..n {
            let token = tokens.next().ok_or_else(|| {
                Error::InvalidModel(format!(
                    "OFF line {}: face declares {} vertices but lists fewer",
                    line_no, n
                ))
            })?;
            polygon.push(parse_count(token, "face vertex index")?);
        }
        super::push_polygon(&mut mesh, &polygon, &format!("OFF line {}", line_no))?;
    }

    if mesh.vertex_colors.len() != mesh.vertices.len() {
        mesh.vertex_colors.clear();
    }

    Ok(mesh)
}

fn parse_count(token: &str, field: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| Error::parse_error_with_context(field, token, "non-negative integer"))
}

fn parse_color(tokens: &[&str], line_no: usize) -> Result<Color> {
    let integers: Option<Vec<u8>> = tokens.iter().map(|t| t.parse::<u8>().ok()).collect();
    if let Some(rgb) = integers {
        return Ok(Color::from_rgb8(rgb[0], rgb[1], rgb[2]));
    }

    let floats = tokens
        .iter()
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                Error::parse_error_with_context(
                    &format!("OFF color on line {}", line_no),
                    t,
                    "color channel",
                )
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Color::new(floats[0], floats[1], floats[2]))
}
