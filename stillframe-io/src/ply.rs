//! PLY format support

use crate::{MeshReader, MeshWriter, PointCloudReader, PointCloudWriter};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use stillframe_core::{Error, Point3f, PointCloud, Result, TriangleMesh, Vector3f};

pub struct PlyReader;
pub struct PlyWriter;

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let ply = parse_ply(path)?;

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut colors = Vec::new();
        let mut has_normals = true;
        let mut has_colors = true;

        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = scalar_property(vertex, "x")?;
                let y = scalar_property(vertex, "y")?;
                let z = scalar_property(vertex, "z")?;
                vertices.push(Point3f::new(x, y, z));

                if has_normals {
                    match (
                        scalar_property(vertex, "nx"),
                        scalar_property(vertex, "ny"),
                        scalar_property(vertex, "nz"),
                    ) {
                        (Ok(nx), Ok(ny), Ok(nz)) => normals.push(Vector3f::new(nx, ny, nz)),
                        _ => has_normals = false,
                    }
                }

                if has_colors {
                    match (
                        color_property(vertex, "red"),
                        color_property(vertex, "green"),
                        color_property(vertex, "blue"),
                    ) {
                        (Ok(r), Ok(g), Ok(b)) => colors.push([r, g, b]),
                        _ => has_colors = false,
                    }
                }
            }
        }

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = face_indices(face)?;
                // Fan-triangulate polygonal faces
                for i in 1..indices.len().saturating_sub(1) {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if !mesh.faces_in_range() {
            return Err(Error::Load(format!(
                "face index out of range: {}",
                path.display()
            )));
        }
        if has_normals {
            mesh.set_normals(normals);
        }
        if has_colors {
            mesh.set_colors(colors);
        }

        Ok(mesh)
    }
}

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        let ply = parse_ply(path.as_ref())?;

        let mut points = Vec::new();
        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = scalar_property(vertex, "x")?;
                let y = scalar_property(vertex, "y")?;
                let z = scalar_property(vertex, "z")?;
                points.push(Point3f::new(x, y, z));
            }
        }

        Ok(PointCloud::from_points(points))
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_def = ElementDef::new("vertex".to_string());
        vertex_def.count = mesh.vertices.len();
        for name in ["x", "y", "z"] {
            vertex_def.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        if mesh.normals.is_some() {
            for name in ["nx", "ny", "nz"] {
                vertex_def.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::Float),
                ));
            }
        }
        ply.header.elements.add(vertex_def);

        let mut face_def = ElementDef::new("face".to_string());
        face_def.count = mesh.faces.len();
        face_def.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_def);

        let mut vertices = Vec::new();
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(vertex.x));
            element.insert("y".to_string(), Property::Float(vertex.y));
            element.insert("z".to_string(), Property::Float(vertex.z));
            if let Some(normals) = &mesh.normals {
                element.insert("nx".to_string(), Property::Float(normals[i].x));
                element.insert("ny".to_string(), Property::Float(normals[i].y));
                element.insert("nz".to_string(), Property::Float(normals[i].z));
            }
            vertices.push(element);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let mut faces = Vec::new();
        for face in &mesh.faces {
            let mut element = DefaultElement::new();
            let indices = vec![face[0] as i32, face[1] as i32, face[2] as i32];
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        Writer::new().write_ply(&mut writer, &mut ply)?;
        Ok(())
    }
}

impl PointCloudWriter for PlyWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3f>, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_def = ElementDef::new("vertex".to_string());
        vertex_def.count = cloud.len();
        for name in ["x", "y", "z"] {
            vertex_def.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        ply.header.elements.add(vertex_def);

        let mut vertices = Vec::new();
        for point in &cloud.points {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(point.x));
            element.insert("y".to_string(), Property::Float(point.y));
            element.insert("z".to_string(), Property::Float(point.z));
            vertices.push(element);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        Writer::new().write_ply(&mut writer, &mut ply)?;
        Ok(())
    }
}

fn parse_ply(path: &Path) -> Result<Ply<DefaultElement>> {
    let file = File::open(path)
        .map_err(|e| Error::Load(format!("cannot open {}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);

    Parser::<DefaultElement>::new()
        .read_ply(&mut reader)
        .map_err(|e| Error::Load(format!("invalid PLY file {}: {}", path.display(), e)))
}

/// Extract a scalar property value as f32 from a PLY element
fn scalar_property(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::UChar(val)) => Ok(*val as f32),
        _ => Err(Error::Load(format!(
            "vertex property '{}' missing or of unexpected type",
            name
        ))),
    }
}

/// Extract a color channel as u8 from a PLY element
fn color_property(element: &DefaultElement, name: &str) -> Result<u8> {
    match element.get(name) {
        Some(Property::UChar(val)) => Ok(*val),
        Some(Property::Int(val)) => Ok((*val).clamp(0, 255) as u8),
        _ => Err(Error::Load(format!(
            "color property '{}' missing or of unexpected type",
            name
        ))),
    }
}

/// Extract face indices from a PLY face element
fn face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    match element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
    {
        Some(Property::ListInt(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        _ => Err(Error::Load("face indices missing from PLY element".to_string())),
    }
}
