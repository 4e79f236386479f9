//! Software rasterization into a [`Framebuffer`]
//!
//! Pure CPU arithmetic, so repeated draws of the same scene produce
//! bit-identical pixels. Triangles are Gouraud-shaded with a headlight at
//! the eye; point clouds are splatted as fixed-size squares.

use crate::framebuffer::Framebuffer;
use nalgebra::Matrix4;
use stillframe_core::{Point3f, PointCloud, TriangleMesh, Vector3f};

/// A vertex mapped to screen space, keeping its NDC depth
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    z: f32,
}

/// Draw a triangle mesh with the given view-projection and eye position
pub fn draw_mesh(
    fb: &mut Framebuffer,
    mesh: &TriangleMesh,
    view_proj: &Matrix4<f32>,
    eye: &Point3f,
    surface_color: [f32; 3],
    ambient: f32,
) {
    if mesh.is_empty() {
        return;
    }

    let normals = match &mesh.normals {
        Some(normals) => normals.clone(),
        None => mesh.calculate_vertex_normals(),
    };

    // Per-vertex lighting, interpolated across each triangle
    let shaded: Vec<[f32; 3]> = mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, vertex)| {
            let base = match &mesh.colors {
                Some(colors) => [
                    colors[i][0] as f32 / 255.0,
                    colors[i][1] as f32 / 255.0,
                    colors[i][2] as f32 / 255.0,
                ],
                None => surface_color,
            };
            let intensity = headlight_intensity(vertex, &normals[i], eye, ambient);
            [base[0] * intensity, base[1] * intensity, base[2] * intensity]
        })
        .collect();

    let projected: Vec<Option<ScreenVertex>> = mesh
        .vertices
        .iter()
        .map(|v| project(view_proj, v, fb.width(), fb.height()))
        .collect();

    for face in &mesh.faces {
        // Triangles touching the near/far planes are rejected whole
        let (Some(v0), Some(v1), Some(v2)) =
            (projected[face[0]], projected[face[1]], projected[face[2]])
        else {
            continue;
        };
        fill_triangle(
            fb,
            [v0, v1, v2],
            [shaded[face[0]], shaded[face[1]], shaded[face[2]]],
        );
    }
}

/// Draw a point cloud as depth-tested square splats
pub fn draw_point_cloud(
    fb: &mut Framebuffer,
    cloud: &PointCloud<Point3f>,
    view_proj: &Matrix4<f32>,
    color: [f32; 3],
    point_size: f32,
) {
    let rgba = to_rgba(color);
    let half = ((point_size * 0.5).round() as i64).max(0);

    for point in cloud.iter() {
        let Some(v) = project(view_proj, point, fb.width(), fb.height()) else {
            continue;
        };
        let cx = v.x.floor() as i64;
        let cy = v.y.floor() as i64;
        for dy in -half..=half {
            for dx in -half..=half {
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 {
                    fb.set_pixel(x as u32, y as u32, v.z, rgba);
                }
            }
        }
    }
}

/// Map a world-space point to screen space; `None` when clipped
fn project(view_proj: &Matrix4<f32>, p: &Point3f, width: u32, height: u32) -> Option<ScreenVertex> {
    let clip = view_proj * p.to_homogeneous();
    if clip.w <= 1e-6 {
        return None;
    }
    let inv_w = 1.0 / clip.w;
    let ndc_x = clip.x * inv_w;
    let ndc_y = clip.y * inv_w;
    let ndc_z = clip.z * inv_w;
    if !(-1.0..=1.0).contains(&ndc_z) {
        return None;
    }

    Some(ScreenVertex {
        x: (ndc_x * 0.5 + 0.5) * width as f32,
        y: (0.5 - ndc_y * 0.5) * height as f32,
        z: ndc_z,
    })
}

/// Lambertian term for a light sitting at the eye, lit on both sides
fn headlight_intensity(vertex: &Point3f, normal: &Vector3f, eye: &Point3f, ambient: f32) -> f32 {
    let to_eye = eye - vertex;
    let len = to_eye.norm();
    let diffuse = if len > 1e-6 {
        (normal.dot(&to_eye) / len).abs()
    } else {
        1.0
    };
    ambient + (1.0 - ambient) * diffuse
}

fn fill_triangle(fb: &mut Framebuffer, verts: [ScreenVertex; 3], colors: [[f32; 3]; 3]) {
    let [v0, v1, v2] = verts;
    let mut area = edge(&v0, &v1, v2.x, v2.y);
    if area.abs() < 1e-8 {
        return;
    }

    // Orient so the inside test works for both windings
    let flip = if area < 0.0 { -1.0 } else { 1.0 };
    area *= flip;
    let inv_area = 1.0 / area;

    let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as u32;
    let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as u32;
    let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(fb.width() as i64 - 1);
    let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(fb.height() as i64 - 1);
    if max_x < min_x as i64 || max_y < min_y as i64 {
        return;
    }

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let w0 = edge(&v1, &v2, px, py) * flip;
            let w1 = edge(&v2, &v0, px, py) * flip;
            let w2 = edge(&v0, &v1, px, py) * flip;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let b0 = w0 * inv_area;
            let b1 = w1 * inv_area;
            let b2 = w2 * inv_area;

            let depth = b0 * v0.z + b1 * v1.z + b2 * v2.z;
            let color = [
                b0 * colors[0][0] + b1 * colors[1][0] + b2 * colors[2][0],
                b0 * colors[0][1] + b1 * colors[1][1] + b2 * colors[2][1],
                b0 * colors[0][2] + b1 * colors[1][2] + b2 * colors[2][2],
            ];
            fb.set_pixel(x, y, depth, to_rgba(color));
        }
    }
}

fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn to_rgba(color: [f32; 3]) -> [u8; 4] {
    [
        (color[0].clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        (color[1].clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        (color[2].clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use stillframe_core::Aabb;

    fn facing_triangle() -> TriangleMesh {
        // Sits at z=0, visible from the default camera at +z
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, -1.0, 0.0),
                Point3f::new(1.0, -1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn framed_camera(mesh: &TriangleMesh, aspect: f32) -> Camera {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(aspect);
        camera.fit_bounds(&mesh.bounds());
        camera
    }

    fn non_background_pixels(fb: &Framebuffer) -> usize {
        fb.pixels()
            .chunks_exact(4)
            .filter(|&p| p != [0, 0, 0, 255])
            .count()
    }

    #[test]
    fn test_mesh_covers_pixels() {
        let mesh = facing_triangle();
        let camera = framed_camera(&mesh, 1.0);

        let mut fb = Framebuffer::new(64, 64).unwrap();
        fb.clear([0.0, 0.0, 0.0, 1.0]);
        draw_mesh(
            &mut fb,
            &mesh,
            &camera.view_projection(),
            &camera.position(),
            [0.8, 0.8, 0.8],
            0.1,
        );

        // A framed triangle should cover a substantial part of the surface
        assert!(non_background_pixels(&fb) > 64);
    }

    #[test]
    fn test_winding_independent() {
        let mesh = facing_triangle();
        let mut flipped = mesh.clone();
        flipped.faces[0] = [0, 2, 1];

        let camera = framed_camera(&mesh, 1.0);
        let vp = camera.view_projection();
        let eye = camera.position();

        let mut fb_a = Framebuffer::new(32, 32).unwrap();
        let mut fb_b = Framebuffer::new(32, 32).unwrap();
        fb_a.clear([0.0, 0.0, 0.0, 1.0]);
        fb_b.clear([0.0, 0.0, 0.0, 1.0]);
        draw_mesh(&mut fb_a, &mesh, &vp, &eye, [0.8, 0.8, 0.8], 0.1);
        draw_mesh(&mut fb_b, &flipped, &vp, &eye, [0.8, 0.8, 0.8], 0.1);

        assert_eq!(non_background_pixels(&fb_a), non_background_pixels(&fb_b));
    }

    #[test]
    fn test_behind_camera_clipped() {
        let mesh = facing_triangle();
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1.0);
        // Look away from the triangle
        camera.look_at(
            Point3f::new(0.0, 0.0, 5.0),
            Point3f::new(0.0, 0.0, 10.0),
            Vector3f::new(0.0, 1.0, 0.0),
        );

        let mut fb = Framebuffer::new(32, 32).unwrap();
        fb.clear([0.0, 0.0, 0.0, 1.0]);
        draw_mesh(
            &mut fb,
            &mesh,
            &camera.view_projection(),
            &camera.position(),
            [0.8, 0.8, 0.8],
            0.1,
        );

        assert_eq!(non_background_pixels(&fb), 0);
    }

    #[test]
    fn test_nearer_triangle_wins_depth() {
        let near = facing_triangle();
        let mut far = facing_triangle();
        for v in &mut far.vertices {
            v.z = -2.0;
        }

        let mut bounds = near.bounds();
        bounds.merge(&far.bounds());
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1.0);
        camera.fit_bounds(&bounds);

        let vp = camera.view_projection();
        let eye = camera.position();

        let mut fb = Framebuffer::new(64, 64).unwrap();
        fb.clear([0.0, 0.0, 0.0, 1.0]);
        // Draw the near (red) triangle first, then the far (blue) one; depth
        // testing must keep red in front regardless of order
        draw_mesh(&mut fb, &near, &vp, &eye, [1.0, 0.0, 0.0], 0.1);
        draw_mesh(&mut fb, &far, &vp, &eye, [0.0, 0.0, 1.0], 0.1);

        let center = ((32 * 64 + 32) * 4) as usize;
        let pixel = &fb.pixels()[center..center + 3];
        assert!(pixel[0] > pixel[2], "near triangle must occlude the far one");
    }

    #[test]
    fn test_point_cloud_splats() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.5, 0.5, 0.0),
        ]);
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1.0);
        camera.fit_bounds(&Aabb::from_points(cloud.iter()));

        let mut fb = Framebuffer::new(64, 64).unwrap();
        fb.clear([0.0, 0.0, 0.0, 1.0]);
        draw_point_cloud(&mut fb, &cloud, &camera.view_projection(), [1.0, 1.0, 1.0], 2.0);

        assert!(non_background_pixels(&fb) >= 2);
    }
}
