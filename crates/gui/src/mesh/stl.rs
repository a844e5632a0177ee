//! STL reading (binary and ASCII) and binary STL encoding

use std::path::Path;

use glam::Vec3;

use super::{face_normal, MeshData};
use crate::error::MeshLoadError;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Source of mesh data for a part.
///
/// The viewer only ever asks for "the mesh at this path"; file formats live
/// behind this trait.
pub trait MeshReader {
    fn read(&self, path: &Path) -> Result<MeshData, MeshLoadError>;
}

/// Reads binary and ASCII STL files
#[derive(Debug, Default, Clone, Copy)]
pub struct StlReader;

impl MeshReader for StlReader {
    fn read(&self, path: &Path) -> Result<MeshData, MeshLoadError> {
        let bytes = std::fs::read(path)?;
        parse_stl(&bytes)
    }
}

/// Parse an STL file held in memory.
///
/// A file is treated as binary when its length matches the facet count in
/// its header, even if it starts with `solid` (many exporters do that).
pub fn parse_stl(bytes: &[u8]) -> Result<MeshData, MeshLoadError> {
    if binary_size_matches(bytes) {
        return parse_binary(bytes);
    }
    let trimmed = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|start| &bytes[start..])
        .unwrap_or(&[]);
    if trimmed.starts_with(b"solid") {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

fn binary_size_matches(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN + 4 {
        return false;
    }
    let count = read_u32(bytes, HEADER_LEN) as usize;
    count
        .checked_mul(FACET_LEN)
        .and_then(|n| n.checked_add(HEADER_LEN + 4))
        == Some(bytes.len())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_vec3(bytes: &[u8], at: usize) -> Vec3 {
    let f = |o: usize| f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
    Vec3::new(f(at), f(at + 4), f(at + 8))
}

/// Use the file's normal unless it is missing or unusable
fn resolve_normal(stored: Vec3, tri: [Vec3; 3]) -> Vec3 {
    if stored.is_finite() && stored.length_squared() > 1e-12 {
        stored.normalize()
    } else {
        face_normal(tri)
    }
}

fn parse_binary(bytes: &[u8]) -> Result<MeshData, MeshLoadError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(MeshLoadError::Truncated {
            expected: HEADER_LEN + 4,
            found: bytes.len(),
        });
    }
    let count = read_u32(bytes, HEADER_LEN) as usize;
    let expected = count
        .checked_mul(FACET_LEN)
        .and_then(|n| n.checked_add(HEADER_LEN + 4))
        .unwrap_or(usize::MAX);
    if bytes.len() < expected {
        return Err(MeshLoadError::Truncated {
            expected,
            found: bytes.len(),
        });
    }
    if count == 0 {
        return Err(MeshLoadError::Empty);
    }

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(count * 3 * super::STRIDE),
        indices: Vec::with_capacity(count * 3),
    };
    for index in 0..count {
        let base = HEADER_LEN + 4 + index * FACET_LEN;
        let stored = read_vec3(bytes, base);
        let tri = [
            read_vec3(bytes, base + 12),
            read_vec3(bytes, base + 24),
            read_vec3(bytes, base + 36),
        ];
        if tri.iter().any(|v| !v.is_finite()) {
            return Err(MeshLoadError::BadFacet {
                index,
                reason: "non-finite vertex".to_string(),
            });
        }
        mesh.push_triangle_with_normal(tri, resolve_normal(stored, tri));
    }
    Ok(mesh)
}

fn parse_floats<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, MeshLoadError> {
    let values: Vec<f32> = tokens
        .map(|t| {
            t.parse::<f32>().map_err(|_| MeshLoadError::Malformed {
                line,
                reason: format!("expected a number, found '{t}'"),
            })
        })
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(MeshLoadError::Malformed {
            line,
            reason: "expected three finite numbers".to_string(),
        }),
    }
}

fn parse_ascii(bytes: &[u8]) -> Result<MeshData, MeshLoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| MeshLoadError::Malformed {
        line: 0,
        reason: format!("not valid UTF-8: {e}"),
    })?;

    let mut mesh = MeshData::new();
    let mut normal = Vec3::ZERO;
    let mut corners: Vec<Vec3> = Vec::with_capacity(3);
    let mut in_facet = false;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        match keyword {
            "solid" | "endsolid" | "outer" | "endloop" => {}
            "facet" => {
                if in_facet {
                    return Err(MeshLoadError::Malformed {
                        line,
                        reason: "facet started before previous endfacet".to_string(),
                    });
                }
                in_facet = true;
                corners.clear();
                normal = match tokens.next() {
                    Some("normal") => parse_floats(tokens, line)?,
                    _ => Vec3::ZERO,
                };
            }
            "vertex" => {
                if !in_facet || corners.len() == 3 {
                    return Err(MeshLoadError::Malformed {
                        line,
                        reason: "unexpected vertex".to_string(),
                    });
                }
                corners.push(parse_floats(tokens, line)?);
            }
            "endfacet" => {
                if !in_facet || corners.len() != 3 {
                    return Err(MeshLoadError::Malformed {
                        line,
                        reason: format!("facet has {} vertices", corners.len()),
                    });
                }
                let tri = [corners[0], corners[1], corners[2]];
                mesh.push_triangle_with_normal(tri, resolve_normal(normal, tri));
                in_facet = false;
            }
            other => {
                return Err(MeshLoadError::Malformed {
                    line,
                    reason: format!("unknown keyword '{other}'"),
                });
            }
        }
    }

    if in_facet {
        return Err(MeshLoadError::Malformed {
            line: text.lines().count(),
            reason: "unterminated facet".to_string(),
        });
    }
    if mesh.is_empty() {
        return Err(MeshLoadError::Empty);
    }
    Ok(mesh)
}

/// Encode a mesh as binary STL
pub fn encode_binary_stl(mesh: &MeshData) -> Vec<u8> {
    let count = mesh.triangle_count();
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + count * FACET_LEN);

    let mut header = [0u8; HEADER_LEN];
    let label = b"partview binary stl";
    header[..label.len()].copy_from_slice(label);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(count as u32).to_le_bytes());

    for t in 0..count {
        let tri = mesh.triangle(t);
        let n = mesh.triangle_normal(t);
        for v in std::iter::once(n).chain(tri) {
            out.extend_from_slice(&v.x.to_le_bytes());
            out.extend_from_slice(&v.y.to_le_bytes());
            out.extend_from_slice(&v.z.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}
