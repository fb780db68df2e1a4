// Copyright @yucwang 2023

use std::fs;
use std::path::Path;

use crate::core::error::ConfigError;
use crate::core::material::GraphicParams;
use crate::math::constants::Vector3f;
use crate::shapes::polygon::Polygon;

use wavefront_obj::{obj, ParseError};
use std::fmt;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Parse(ParseError),
    MalformedVertex { line: usize, text: String },
    Geometry(ConfigError),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::Io(err)
    }
}

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        ImportError::Parse(err)
    }
}

impl From<ConfigError> for ImportError {
    fn from(err: ConfigError) -> Self {
        ImportError::Geometry(err)
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "io error: {}", err),
            ImportError::Parse(err) => write!(f, "parse error: {}", err),
            ImportError::MalformedVertex { line, text } => write!(f, "malformed vertex at line {}: {}", line, text),
            ImportError::Geometry(err) => write!(f, "geometry error: {}", err),
        }
    }
}

impl std::error::Error for ImportError {}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ImportError> {
    let normalized = normalize_obj_text(input.as_ref())?;
    Ok(obj::parse(normalized)?)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ImportError> {
    let data = fs::read_to_string(path)?;
    load_obj_from_str(data)
}

/// Triangles of every object in `input`, all sharing `params`. Zero-area
/// faces are skipped.
pub fn load_polygons_from_str<S: AsRef<str>>(input: S, params: GraphicParams) -> Result<Vec<Polygon>, ImportError> {
    let obj_set = load_obj_from_str(input)?;
    let mut polygons = Vec::new();
    let mut skipped = 0usize;

    for object in obj_set.objects.iter() {
        let vertices: Vec<Vector3f> = object
            .vertices
            .iter()
            .map(|v| Vector3f::new(v.x as f32, v.y as f32, v.z as f32))
            .collect();

        for geom in object.geometry.iter() {
            for shape in geom.shapes.iter() {
                if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                    let corners = (vertices.get(a.0), vertices.get(b.0), vertices.get(c.0));
                    let (p0, p1, p2) = match corners {
                        (Some(p0), Some(p1), Some(p2)) => (*p0, *p1, *p2),
                        _ => {
                            skipped += 1;
                            continue;
                        }
                    };
                    match Polygon::new(p0, p1, p2, params) {
                        Ok(polygon) => polygons.push(polygon),
                        Err(ConfigError::Degenerate(_)) => skipped += 1,
                        Err(err) => return Err(err.into()),
                    }
                }
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} degenerate faces while importing mesh.", skipped);
    }

    Ok(polygons)
}

// Keeps only `v` and `f` records. Vertex lines must carry three finite
// coordinates. Face indices keep the part before the first '/', indices that
// resolve to no vertex are dropped, faces left with fewer than three corners
// are skipped and larger ones are fanned into triangles.
fn normalize_obj_text(input: &str) -> Result<String, ImportError> {
    let mut vertex_lines = Vec::new();
    let mut faces: Vec<(Vec<i64>, usize)> = Vec::new();

    for (line_idx, line) in input.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords: Vec<f64> = tokens
                    .take(3)
                    .map(|t| t.parse::<f64>())
                    .collect::<Result<Vec<f64>, _>>()
                    .map_err(|_| malformed(line_idx, line))?;
                if coords.len() < 3 || coords.iter().any(|c| !c.is_finite()) {
                    return Err(malformed(line_idx, line));
                }
                vertex_lines.push(format!("v {} {} {}", coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let indices = tokens
                    .filter_map(|t| t.split('/').next())
                    .filter_map(|t| t.parse::<i64>().ok())
                    .collect();
                faces.push((indices, vertex_lines.len()));
            }
            _ => {}
        }
    }

    let vertex_count = vertex_lines.len();
    let mut out = String::with_capacity(input.len());
    for v in vertex_lines.iter() {
        out.push_str(v);
        out.push('\n');
    }

    for (indices, seen_vertices) in faces.iter() {
        // Negative indices count back from the last vertex read so far.
        let resolved: Vec<usize> = indices
            .iter()
            .filter_map(|&idx| {
                let absolute = if idx < 0 { *seen_vertices as i64 + idx + 1 } else { idx };
                if absolute >= 1 && absolute <= vertex_count as i64 {
                    Some(absolute as usize)
                } else {
                    None
                }
            })
            .collect();

        if resolved.len() < 3 {
            continue;
        }

        for i in 1..(resolved.len() - 1) {
            out.push_str(&format!("f {} {} {}\n", resolved[0], resolved[i], resolved[i + 1]));
        }
    }

    Ok(out)
}

fn malformed(line_idx: usize, line: &str) -> ImportError {
    ImportError::MalformedVertex { line: line_idx + 1, text: line.trim().to_string() }
}
