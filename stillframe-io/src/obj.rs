//! OBJ format support

use crate::{MeshReader, MeshWriter};
use obj::{load_obj, Obj, Position, Vertex};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use stillframe_core::{Error, Point3f, Result, TriangleMesh, Vector3f};

pub struct ObjReader;
pub struct ObjWriter;

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();

        // Try the full position+normal layout first; fall back to plain
        // positions for files without normal indices.
        match load_obj::<Vertex, _, u32>(open(path)?) {
            Ok(model) => {
                let vertices = model
                    .vertices
                    .iter()
                    .map(|v| Point3f::new(v.position[0], v.position[1], v.position[2]))
                    .collect();
                let normals = model
                    .vertices
                    .iter()
                    .map(|v| Vector3f::new(v.normal[0], v.normal[1], v.normal[2]))
                    .collect();

                let mut mesh =
                    TriangleMesh::from_vertices_and_faces(vertices, triples(&model.indices));
                mesh.set_normals(normals);
                Ok(mesh)
            }
            Err(_) => {
                let model: Obj<Position, u32> = load_obj(open(path)?).map_err(|e| {
                    Error::Load(format!("invalid OBJ file {}: {}", path.display(), e))
                })?;

                let vertices = model
                    .vertices
                    .iter()
                    .map(|v| Point3f::new(v.position[0], v.position[1], v.position[2]))
                    .collect();

                Ok(TriangleMesh::from_vertices_and_faces(
                    vertices,
                    triples(&model.indices),
                ))
            }
        }
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }
        for face in &mesh.faces {
            // OBJ indices are 1-based
            if mesh.normals.is_some() {
                writeln!(
                    writer,
                    "f {0}//{0} {1}//{1} {2}//{2}",
                    face[0] + 1,
                    face[1] + 1,
                    face[2] + 1
                )?;
            } else {
                writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).map_err(|e| Error::Load(format!("cannot open {}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

fn triples(indices: &[u32]) -> Vec<[usize; 3]> {
    indices
        .chunks_exact(3)
        .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stillframe_obj_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_read_positions_only() {
        let path = temp_path("plain.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mesh = ObjReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert!(mesh.normals.is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_read_with_normals() {
        let path = temp_path("with_normals.obj");
        fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
        )
        .unwrap();

        let mesh = ObjReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        let normals = mesh.normals.expect("normals parsed");
        assert!((normals[0].z - 1.0).abs() < 1e-6);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_garbage_is_load_error() {
        let path = temp_path("garbage.obj");
        fs::write(&path, "f 1 2\nnot an obj line\n").unwrap();

        let result = ObjReader::read_mesh(&path);
        assert!(matches!(result, Err(Error::Load(_))));

        let _ = fs::remove_file(path);
    }
}
