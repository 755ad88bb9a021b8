//! Binary STL output.
//!
//! Layout:
//! - 80 bytes: header text, zero padded
//! - 4 bytes: u32 LE triangle count
//! - Per triangle (50 bytes each):
//!   - 12 bytes: normal (3 x f32 LE), always zero since fiber strips have no orientation
//!   - 36 bytes: 3 vertices (3 x 3 x f32 LE)
//!   - 2 bytes: attribute byte count (0u16)

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::utils::error::{Error, Result};
use crate::utils::geometry::Triangle;

pub const STL_HEADER_SIZE: usize = 80;
pub const STL_TRIANGLE_SIZE: usize = 50;

pub fn write_stl<W: Write>(writer: &mut W, triangles: &[Triangle], name: &str) -> io::Result<()> {
    let mut header = [0u8; STL_HEADER_SIZE];
    let text = format!("binary STL: {}", name);
    let len = text.len().min(STL_HEADER_SIZE);
    header[..len].copy_from_slice(&text.as_bytes()[..len]);
    writer.write_all(&header)?;

    writer.write_all(&(triangles.len() as u32).to_le_bytes())?;

    let mut record = [0u8; STL_TRIANGLE_SIZE];
    for triangle in triangles {
        let mut offset = 12;
        for vertex in &triangle.vertices {
            for value in [vertex.x, vertex.y, vertex.z] {
                record[offset..offset + 4].copy_from_slice(&(value as f32).to_le_bytes());
                offset += 4;
            }
        }
        writer.write_all(&record)?;
    }
    Ok(())
}

/// Writes `triangles` to a binary STL file at `path`.
pub fn save_stl(path: &Path, triangles: &[Triangle]) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = File::create(path).map_err(|e| Error::write(path, e))?;
    let mut writer = BufWriter::new(file);
    write_stl(&mut writer, triangles, &name)
        .and_then(|_| writer.flush())
        .map_err(|e| Error::write(path, e))?;
    info!(
        "saved {} triangles to \"{}\"",
        triangles.len(),
        path.display()
    );
    Ok(())
}
