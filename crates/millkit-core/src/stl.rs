//! # STL Loader
//!
//! Parses binary and ASCII STL data into a [`Mesh`].
//!
//! Parsing never fails: malformed or truncated input yields fewer (possibly
//! zero) triangles. Only [`load_stl`] can return an error, and only for I/O.

use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const PREAMBLE_LEN: usize = 84;
const TRIANGLE_RECORD_LEN: usize = 50;

/// On-disk STL encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Binary,
    Ascii,
}

/// Decide whether `bytes` hold a binary or an ASCII STL.
///
/// A header that does not start with `solid` is binary. A header that does is
/// still binary when the declared triangle count matches the file length
/// exactly, since some exporters write `solid` into binary headers.
pub fn detect_format(bytes: &[u8]) -> StlFormat {
    if bytes.len() < PREAMBLE_LEN {
        return StlFormat::Ascii;
    }

    if !header_starts_with_solid(&bytes[..HEADER_LEN]) {
        return StlFormat::Binary;
    }

    let expected =
        PREAMBLE_LEN as u64 + declared_triangle_count(bytes) as u64 * TRIANGLE_RECORD_LEN as u64;
    if expected == bytes.len() as u64 {
        StlFormat::Binary
    } else {
        StlFormat::Ascii
    }
}

/// Parse STL bytes of either encoding.
pub fn parse_stl(bytes: &[u8]) -> Mesh {
    let format = detect_format(bytes);
    let mesh = match format {
        StlFormat::Binary => parse_binary(bytes),
        StlFormat::Ascii => parse_ascii(bytes),
    };
    debug!("Parsed {:?} STL: {} triangles", format, mesh.len());
    mesh
}

/// Read and parse an STL file.
pub fn load_stl(path: &Path) -> CoreResult<Mesh> {
    if !path.exists() {
        return Err(CoreError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    Ok(parse_stl(&bytes))
}

fn header_starts_with_solid(header: &[u8]) -> bool {
    header.len() >= 5 && header[..5].eq_ignore_ascii_case(b"solid")
}

fn declared_triangle_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]])
}

fn parse_binary(bytes: &[u8]) -> Mesh {
    if bytes.len() < PREAMBLE_LEN {
        return Mesh::default();
    }

    let declared = declared_triangle_count(bytes) as usize;
    let available = (bytes.len() - PREAMBLE_LEN) / TRIANGLE_RECORD_LEN;
    if available < declared {
        debug!(
            "Binary STL truncated: {} triangles declared, {} present",
            declared, available
        );
    }

    let mut triangles = Vec::with_capacity(declared.min(available));
    let mut skipped = 0usize;
    let mut offset = PREAMBLE_LEN;

    for _ in 0..declared.min(available) {
        // 12-byte facet normal is recomputed on demand and skipped here.
        let a = read_point(bytes, offset + 12);
        let b = read_point(bytes, offset + 24);
        let c = read_point(bytes, offset + 36);
        offset += TRIANGLE_RECORD_LEN;

        let triangle = Triangle::new(a, b, c);
        if triangle.is_finite() {
            triangles.push(triangle);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        debug!("Skipped {} non-finite triangles", skipped);
    }
    Mesh::new(triangles)
}

fn read_point(bytes: &[u8], offset: usize) -> Point3<f64> {
    Point3::new(
        read_f32(bytes, offset) as f64,
        read_f32(bytes, offset + 4) as f64,
        read_f32(bytes, offset + 8) as f64,
    )
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(buf)
}

fn parse_ascii(bytes: &[u8]) -> Mesh {
    let text = String::from_utf8_lossy(bytes);
    let mut triangles = Vec::new();
    let mut pending: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if !tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("vertex")) {
            continue;
        }

        let coords: Vec<f64> = tokens.take(3).filter_map(|t| t.parse().ok()).collect();
        if coords.len() != 3 || coords.iter().any(|c| !c.is_finite()) {
            continue;
        }
        pending.push(Point3::new(coords[0], coords[1], coords[2]));

        if pending.len() == 3 {
            triangles.push(Triangle::new(pending[0], pending[1], pending[2]));
            pending.clear();
        }
    }

    Mesh::new(triangles)
}
