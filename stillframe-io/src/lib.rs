//! Model loading for stillframe
//!
//! This crate provides the loader boundary the offscreen renderer consumes:
//! PLY and OBJ readers (and the matching writers, mainly used to produce
//! fixtures), plus extension-based auto-detection.

pub mod obj;
pub mod ply;

use std::path::Path;
use stillframe_core::{Aabb, Error, Point3f, PointCloud, Result, TriangleMesh};

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>>;
}

/// Trait for writing point clouds to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3f>, path: P) -> Result<()>;
}

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Geometry loaded from a model file
///
/// A PLY file with faces loads as a mesh, one without faces as a point
/// cloud; OBJ files always load as meshes.
#[derive(Debug, Clone)]
pub enum Model {
    Mesh(TriangleMesh),
    PointCloud(PointCloud<Point3f>),
}

impl Model {
    /// Whether the model carries no renderable geometry
    pub fn is_empty(&self) -> bool {
        match self {
            Model::Mesh(mesh) => mesh.is_empty(),
            Model::PointCloud(cloud) => cloud.is_empty(),
        }
    }

    /// Axis-aligned bounds of the geometry
    pub fn bounds(&self) -> Aabb {
        match self {
            Model::Mesh(mesh) => mesh.bounds(),
            Model::PointCloud(cloud) => cloud.bounds(),
        }
    }
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "obj" => obj::ObjReader::read_mesh(path),
        "ply" => ply::PlyReader::read_mesh(path),
        ext => Err(Error::Load(format!(
            "unsupported mesh format '.{}': {}",
            ext,
            path.display()
        ))),
    }
}

/// Auto-detect format and read point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "ply" => ply::PlyReader::read_point_cloud(path),
        ext => Err(Error::Load(format!(
            "unsupported point cloud format '.{}': {}",
            ext,
            path.display()
        ))),
    }
}

/// Load a model file, deciding between mesh and point cloud from its content
///
/// Fails with [`Error::Load`] if the file is missing, unparsable, of an
/// unknown format, or holds no geometry at all.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Load(format!("file not found: {}", path.display())));
    }

    let model = match extension(path)?.as_str() {
        "obj" => Model::Mesh(obj::ObjReader::read_mesh(path)?),
        "ply" => {
            let mesh = ply::PlyReader::read_mesh(path)?;
            if mesh.faces.is_empty() {
                Model::PointCloud(PointCloud::from_points(mesh.vertices))
            } else {
                Model::Mesh(mesh)
            }
        }
        ext => {
            return Err(Error::Load(format!(
                "unsupported model format '.{}': {}",
                ext,
                path.display()
            )))
        }
    };

    if model.is_empty() {
        return Err(Error::Load(format!(
            "no geometry in model file: {}",
            path.display()
        )));
    }

    log::debug!("loaded model from {}", path.display());
    Ok(model)
}

fn extension(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .ok_or_else(|| Error::Load(format!("path has no file extension: {}", path.display())))
}
