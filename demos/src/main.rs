//! Offscreen rendering demo
//!
//! Loads a model from the resource directory (generating a stand-in sphere
//! on first run), renders a snapshot, moves the camera a little, and renders
//! a second one. No window is opened at any point.

use anyhow::{Context, Result};
use std::path::PathBuf;
use stillframe_core::{Point3f, TriangleMesh, Vector3f};
use stillframe_io::{ply::PlyWriter, MeshWriter};
use stillframe_render::{resource_directory, OffscreenRenderer};

fn main() -> Result<()> {
    stillframe_render::initialize(false);

    let model_path = locate_model()?;
    let stem = model_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();

    let mut renderer = OffscreenRenderer::new(800, 600)?;
    renderer.add_model(&model_path)?;

    let out_1 = PathBuf::from(format!("{}_1.png", stem));
    renderer.render(&out_1)?;
    println!("saved {}", out_1.display());

    // Nudge the camera and take a second snapshot
    let pos = renderer.camera().position();
    renderer
        .camera_mut()
        .set_position(pos + Vector3f::new(0.2, 0.2, 0.2));

    let out_2 = PathBuf::from(format!("{}_2.png", stem));
    renderer.render(&out_2)?;
    println!("saved {}", out_2.display());

    stillframe_render::shutdown();
    Ok(())
}

/// Find a model to render, writing a generated sphere if none is present
fn locate_model() -> Result<PathBuf> {
    let data_dir = resource_directory().join("data");
    let bunny = data_dir.join("bunny.ply");
    if bunny.exists() {
        return Ok(bunny);
    }

    let generated = data_dir.join("sphere.ply");
    if !generated.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating {}", data_dir.display()))?;
        PlyWriter::write_mesh(&uv_sphere(24, 48), &generated)
            .with_context(|| format!("writing {}", generated.display()))?;
        log::info!("generated stand-in model at {}", generated.display());
    }
    Ok(generated)
}

/// Build a unit sphere from latitude/longitude bands
fn uv_sphere(stacks: usize, slices: usize) -> TriangleMesh {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = 2.0 * std::f32::consts::PI * j as f32 / slices as f32;
            vertices.push(Point3f::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            ));
        }
    }

    let ring = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * ring + j;
            let b = a + ring;
            faces.push([a, b, a + 1]);
            faces.push([a + 1, b, b + 1]);
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    let normals = mesh.calculate_vertex_normals();
    mesh.set_normals(normals);
    mesh
}
