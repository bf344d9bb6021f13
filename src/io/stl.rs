//! ASCII STL export.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::modeler::mesh::TriangleMesh;

/// Write `mesh` as ASCII STL. Coordinates are multiplied by `scale` (cm → mm uses `10.0`).
///
/// The solid is written to `<path>.part` and renamed into place, so a failed
/// write never leaves a truncated file under `path`.
pub fn write_ascii_stl(path: &Path, name: &str, mesh: &TriangleMesh, scale: f64) -> Result<(), AppError> {
    let part = part_path(path);
    let result = write_part(&part, name, mesh, scale).and_then(|()| {
        fs::rename(&part, path)
            .map_err(|e| AppError::new(4, format!("Failed to replace STL '{}': {e}", path.display())))
    });
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

fn write_part(part: &Path, name: &str, mesh: &TriangleMesh, scale: f64) -> Result<(), AppError> {
    let file = File::create(part)
        .map_err(|e| AppError::new(4, format!("Failed to create STL '{}': {e}", part.display())))?;
    let mut out = BufWriter::new(file);

    write_solid(&mut out, name, mesh, scale)
        .and_then(|()| out.flush())
        .map_err(|e| AppError::new(4, format!("Failed to write STL '{}': {e}", part.display())))
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn write_solid<W: Write>(out: &mut W, name: &str, mesh: &TriangleMesh, scale: f64) -> std::io::Result<()> {
    // STL solid names end at whitespace.
    let name: String = name.split_whitespace().collect::<Vec<_>>().join("_");

    writeln!(out, "solid {name}")?;
    for &tri in &mesh.triangles {
        let n = mesh.facet_normal(tri);
        writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(out, "    outer loop")?;
        for idx in tri {
            let v = mesh.vertices[idx] * scale;
            writeln!(out, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid {name}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn writes_one_facet_per_triangle() {
        let mut mesh = TriangleMesh::default();
        let a = mesh.add_vertex(Vector3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vector3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vector3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(a, b, c);

        let mut buf = Vec::new();
        write_solid(&mut buf, "bolt 1", &mesh, 10.0).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("solid bolt_1\n"));
        assert!(text.trim_end().ends_with("endsolid bolt_1"));
        assert_eq!(text.matches("facet normal").count(), 1);
        assert!(text.contains("facet normal 0e0 0e0 1e0"));
        assert!(text.contains("vertex 1e1 0e0 0e0"));
    }

    #[test]
    fn failed_replace_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("bolt_3.stl");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupied"), "x").unwrap();

        let err = write_ascii_stl(&target, "bolt_3", &TriangleMesh::default(), 10.0).unwrap_err();

        assert_eq!(err.exit_code(), 4);
        assert!(!dir.path().join("bolt_3.stl.part").exists());
        assert!(target.is_dir());
    }
}
