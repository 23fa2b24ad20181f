//! Minimal permissive Wavefront OBJ loader.
//!
//! Only `v` (vertex) and `f` (triangle/quad face) records are understood;
//! everything else (`vt`, `vn`, `mtllib`, groups, comments) is ignored. A
//! face line with more than four indices is fan-triangulated from its first
//! vertex. Any I/O failure degrades to an empty `Mesh` rather than aborting
//! the render, per the crate's "best-effort asset loading" stance.

use std::path::Path;

use crate::error::Error;
use crate::material::PBRMaterial;
use crate::math::{Point3, Vec2};
use crate::mesh::Mesh;
use crate::primitive::{Object, Triangle};

pub fn load(path: impl AsRef<Path>, material: PBRMaterial) -> Result<Mesh, Error> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| Error::ObjRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut vertices = Vec::new();
    let mut objects = Vec::new();

    for (line_number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(tag) = fields.next() else {
            continue;
        };

        match tag {
            "v" => {
                let coordinates: Vec<f32> = fields.filter_map(|f| f.parse().ok()).collect();
                if coordinates.len() < 3 {
                    return Err(Error::ObjParse {
                        path: path.to_path_buf(),
                        line: line_number + 1,
                        reason: "vertex record needs three coordinates".to_string(),
                    });
                }
                vertices.push(Point3::new(coordinates[0], coordinates[1], coordinates[2]));
            }
            "f" => {
                let indices: Vec<usize> = fields
                    .filter_map(|token| token.split('/').next())
                    .filter_map(|token| token.parse::<i64>().ok())
                    .map(|i| resolve_index(i, vertices.len()))
                    .collect();

                if indices.len() < 3 {
                    continue;
                }

                for i in 1..indices.len() - 1 {
                    let (Some(v0), Some(v1), Some(v2)) =
                        (vertices.get(indices[0]), vertices.get(indices[i]), vertices.get(indices[i + 1]))
                    else {
                        continue;
                    };
                    objects.push(Object::Triangle(Triangle::new(
                        *v0,
                        *v1,
                        *v2,
                        Vec2::default(),
                        Vec2::default(),
                        Vec2::default(),
                        material.clone(),
                    )));
                }
            }
            _ => continue,
        }
    }

    Ok(Mesh::new(objects))
}

/// Resolves an OBJ index (1-based, or negative for relative-from-end) to a
/// 0-based `Vec` index.
fn resolve_index(index: i64, vertex_count: usize) -> usize {
    if index > 0 {
        (index - 1) as usize
    } else {
        (vertex_count as i64 + index) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes `contents` to a uniquely-named file under the OS temp
    /// directory and returns its path, since the crate carries no
    /// `tempfile` dependency.
    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("irradiance-test-{name}-{}.obj", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_a_single_triangle() {
        let path = write_temp_obj("triangle", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mesh = load(&path, PBRMaterial::default()).unwrap();
        assert_eq!(mesh.objects.len(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn fan_triangulates_a_quad() {
        let path = write_temp_obj("quad", "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        let mesh = load(&path, PBRMaterial::default()).unwrap();
        assert_eq!(mesh.objects.len(), 2);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_reports_read_error() {
        let result = load("/nonexistent/path/to/mesh.obj", PBRMaterial::default());
        assert!(matches!(result, Err(Error::ObjRead { .. })));
    }
}
