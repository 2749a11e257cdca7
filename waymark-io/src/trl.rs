//! The `.trl` binary trail format.
//!
//! Layout: 4 reserved zero bytes, a little-endian `u32` map id, then one
//! 12-byte record per point (`x`, `y`, `z` as little-endian `f32`). No
//! alignment, no terminator, no checksum.

use waymark_common::kv;
use waymark_geometry::Point;

use thiserror::Error;

const HEADER_LEN: usize = 8;
const POINT_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum TrlError {
    #[error("invalid file, no mapid")]
    MissingMapId,

    #[error("invalid mapid: {0}")]
    InvalidMapId(String),

    #[error("mapid header not found")]
    TruncatedHeader,

    #[error("trail length {0} is not a whole number of points")]
    TruncatedPoints(usize),

    #[error("error on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: waymark_common::Error,
    },
}

/// Serialize a built trail.
pub fn points_to_trl_bytes(map_id: u32, points: &[Point]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + POINT_LEN * points.len());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&map_id.to_le_bytes());
    for p in points {
        out.extend_from_slice(&(p.x as f32).to_le_bytes());
        out.extend_from_slice(&(p.y as f32).to_le_bytes());
        out.extend_from_slice(&(p.z as f32).to_le_bytes());
    }
    out
}

/// Compile `.rtrl` text lines (map id first, then one point per line) into
/// trail bytes.
pub fn lines_to_trl_bytes(lines: &[&str]) -> Result<Vec<u8>, TrlError> {
    let mut iter = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty());
    let id_line = iter.next().ok_or(TrlError::MissingMapId)?;
    let map_id: u32 = id_line
        .parse()
        .map_err(|_| TrlError::InvalidMapId(id_line.to_string()))?;

    let mut points = Vec::new();
    for (index, line) in iter.enumerate() {
        let map = kv::parse_line(line);
        let (x, y, z) = kv::position(&map).map_err(|source| TrlError::Line {
            line: index + 1,
            source,
        })?;
        points.push(Point::new(x, y, z));
    }
    Ok(points_to_trl_bytes(map_id, &points))
}

/// Decompile trail bytes back into `.rtrl` text lines.
pub fn trl_bytes_to_lines(bytes: &[u8]) -> Result<Vec<String>, TrlError> {
    if bytes.len() < HEADER_LEN {
        return Err(TrlError::TruncatedHeader);
    }
    let body = &bytes[HEADER_LEN..];
    if body.len() % POINT_LEN != 0 {
        return Err(TrlError::TruncatedPoints(bytes.len()));
    }

    let map_id = u32::from_le_bytes(bytes[4..8].try_into().expect("header length checked"));
    let mut out = vec![map_id.to_string()];
    for record in body.chunks_exact(POINT_LEN) {
        let x = f32::from_le_bytes(record[0..4].try_into().expect("record length checked"));
        let y = f32::from_le_bytes(record[4..8].try_into().expect("record length checked"));
        let z = f32::from_le_bytes(record[8..12].try_into().expect("record length checked"));
        out.push(format!(r#"xpos="{x:.6}" ypos="{y:.6}" zpos="{z:.6}""#));
    }
    Ok(out)
}
