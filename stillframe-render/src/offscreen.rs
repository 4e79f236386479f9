//! Offscreen renderer: attached models, a camera, and a hidden surface
//!
//! The renderer owns everything it draws. A render call is synchronous and
//! leaves models and camera untouched, so the same instance can produce any
//! number of snapshots with camera mutations in between.

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::image_write::write_image;
use crate::raster;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use stillframe_core::{Aabb, Error, Point3f, PointCloud, Result, TriangleMesh};
use stillframe_io::{load_model, Model};

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background_color: [f32; 4],
    /// Surface color for meshes without per-vertex colors
    pub surface_color: [f32; 3],
    pub point_color: [f32; 3],
    /// Ambient lighting floor in `0..=1`
    pub ambient: f32,
    /// Point splat size in pixels
    pub point_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: [0.1, 0.1, 0.1, 1.0],
            surface_color: [0.8, 0.8, 0.8],
            point_color: [0.8, 0.8, 0.8],
            ambient: 0.15,
            point_size: 2.0,
        }
    }
}

/// Identifier of a model attached to an [`OffscreenRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(usize);

struct SceneModel {
    model: Model,
    source: Option<PathBuf>,
}

/// Renders attached models against a hidden surface and writes image files
pub struct OffscreenRenderer {
    models: Vec<SceneModel>,
    camera: Camera,
    framebuffer: Framebuffer,
    config: RenderConfig,
    scene_bounds: Aabb,
}

impl OffscreenRenderer {
    /// Create a renderer with an offscreen surface of the given resolution
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_config(width, height, RenderConfig::default())
    }

    /// Create a renderer with explicit rendering configuration
    pub fn with_config(width: u32, height: u32, config: RenderConfig) -> Result<Self> {
        let framebuffer = Framebuffer::new(width, height)?;
        let mut camera = Camera::default();
        camera.set_aspect_ratio(framebuffer.aspect_ratio());

        Ok(Self {
            models: Vec::new(),
            camera,
            framebuffer,
            config,
            scene_bounds: Aabb::empty(),
        })
    }

    /// Load a model file and attach it to the scene
    ///
    /// Fails with [`Error::Load`] without changing the attached set; on
    /// success the camera is re-framed to the grown scene bounds.
    pub fn add_model<P: AsRef<Path>>(&mut self, path: P) -> Result<ModelHandle> {
        let path = path.as_ref();
        let model = load_model(path)?;
        log::info!(
            "attached model from {} ({} total)",
            path.display(),
            self.models.len() + 1
        );
        self.attach(model, Some(path.to_path_buf()))
    }

    /// Attach an in-memory mesh to the scene
    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> Result<ModelHandle> {
        self.attach(Model::Mesh(mesh), None)
    }

    /// Attach an in-memory point cloud to the scene
    pub fn add_point_cloud(&mut self, cloud: PointCloud<Point3f>) -> Result<ModelHandle> {
        self.attach(Model::PointCloud(cloud), None)
    }

    fn attach(&mut self, model: Model, source: Option<PathBuf>) -> Result<ModelHandle> {
        if model.is_empty() {
            return Err(Error::Load("model has no geometry".to_string()));
        }
        if let Model::Mesh(mesh) = &model {
            if !mesh.faces_in_range() {
                return Err(Error::InvalidData(
                    "mesh face index out of range".to_string(),
                ));
            }
            let n = mesh.vertex_count();
            if mesh.normals.as_ref().is_some_and(|v| v.len() != n) {
                return Err(Error::InvalidData(
                    "mesh normal count does not match vertices".to_string(),
                ));
            }
            if mesh.colors.as_ref().is_some_and(|v| v.len() != n) {
                return Err(Error::InvalidData(
                    "mesh color count does not match vertices".to_string(),
                ));
            }
        }

        self.scene_bounds.merge(&model.bounds());
        self.camera.fit_bounds(&self.scene_bounds);
        self.models.push(SceneModel { model, source });
        Ok(ModelHandle(self.models.len() - 1))
    }

    /// Number of attached models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Resolve a handle to its model
    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle.0).map(|m| &m.model)
    }

    /// The file a model was loaded from, if any
    pub fn model_source(&self, handle: ModelHandle) -> Option<&Path> {
        self.models.get(handle.0).and_then(|m| m.source.as_deref())
    }

    /// The renderer's camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera; changes apply to the next render call
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Render the scene and persist it at `path`
    ///
    /// Synchronous and blocking: returns once the file is written or an
    /// error is raised. The attached models and the camera are left
    /// unchanged either way.
    pub fn render<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = self.render_to_image()?;
        write_image(path, &image)
    }

    /// Render the scene and hand the pixel buffer to the caller
    ///
    /// The returned image is an independent snapshot, unaffected by later
    /// render calls.
    pub fn render_to_image(&mut self) -> Result<RgbaImage> {
        let camera = self.camera.clone();
        self.draw(&camera)?;
        self.framebuffer.to_image()
    }

    /// Render with an explicit camera, leaving the owned camera untouched
    pub fn render_with_camera<P: AsRef<Path>>(&mut self, camera: &Camera, path: P) -> Result<()> {
        self.draw(camera)?;
        let image = self.framebuffer.to_image()?;
        write_image(path, &image)
    }

    fn draw(&mut self, camera: &Camera) -> Result<()> {
        let mut camera = camera.clone();
        camera.set_aspect_ratio(self.framebuffer.aspect_ratio());

        let view_proj = camera.view_projection();
        if !view_proj.iter().all(|c| c.is_finite()) {
            return Err(Error::Render("camera matrices are not finite".to_string()));
        }
        let eye = camera.position();

        let fb = &mut self.framebuffer;
        fb.clear(self.config.background_color);
        for entry in &self.models {
            match &entry.model {
                Model::Mesh(mesh) => raster::draw_mesh(
                    fb,
                    mesh,
                    &view_proj,
                    &eye,
                    self.config.surface_color,
                    self.config.ambient,
                ),
                Model::PointCloud(cloud) => raster::draw_point_cloud(
                    fb,
                    cloud,
                    &view_proj,
                    self.config.point_color,
                    self.config.point_size,
                ),
            }
        }

        log::debug!(
            "rendered {} model(s) at {}x{}",
            self.models.len(),
            fb.width(),
            fb.height()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pyramid() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, 0.0, -1.0),
                Point3f::new(1.0, 0.0, -1.0),
                Point3f::new(1.0, 0.0, 1.0),
                Point3f::new(-1.0, 0.0, 1.0),
                Point3f::new(0.0, 1.5, 0.0),
            ],
            vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        )
    }

    #[test]
    fn test_zero_resolution_is_render_error() {
        assert!(matches!(
            OffscreenRenderer::new(0, 600),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_add_mesh_returns_sequential_handles() {
        let mut renderer = OffscreenRenderer::new(64, 64).unwrap();
        let a = renderer.add_mesh(pyramid()).unwrap();
        let b = renderer.add_mesh(pyramid()).unwrap();

        assert_ne!(a, b);
        assert_eq!(renderer.model_count(), 2);
        assert!(renderer.model(a).is_some());
        assert!(renderer.model_source(a).is_none());
    }

    #[test]
    fn test_add_empty_mesh_rejected() {
        let mut renderer = OffscreenRenderer::new(64, 64).unwrap();
        let result = renderer.add_mesh(TriangleMesh::new());

        assert!(matches!(result, Err(Error::Load(_))));
        assert_eq!(renderer.model_count(), 0);
    }

    #[test]
    fn test_add_mesh_out_of_range_faces_rejected() {
        let mut renderer = OffscreenRenderer::new(64, 64).unwrap();
        let mut mesh = pyramid();
        mesh.faces.push([0, 1, 99]);

        let result = renderer.add_mesh(mesh);
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert_eq!(renderer.model_count(), 0);
    }

    #[test]
    fn test_add_mesh_mismatched_attributes_rejected() {
        let mut renderer = OffscreenRenderer::new(64, 64).unwrap();

        let mut mesh = pyramid();
        mesh.normals = Some(vec![stillframe_core::Vector3f::new(0.0, 0.0, 1.0); 2]);
        assert!(matches!(
            renderer.add_mesh(mesh),
            Err(Error::InvalidData(_))
        ));

        let mut mesh = pyramid();
        mesh.colors = Some(vec![[255, 0, 0]; 2]);
        assert!(matches!(
            renderer.add_mesh(mesh),
            Err(Error::InvalidData(_))
        ));
        assert_eq!(renderer.model_count(), 0);
    }

    #[test]
    fn test_add_model_invalid_path_leaves_set_unchanged() {
        let mut renderer = OffscreenRenderer::new(64, 64).unwrap();
        renderer.add_mesh(pyramid()).unwrap();

        let before = renderer.model_count();
        let result = renderer.add_model("/definitely/not/here.ply");
        assert!(matches!(result, Err(Error::Load(_))));
        assert_eq!(renderer.model_count(), before);
    }

    #[test]
    fn test_render_to_image_dimensions() {
        let mut renderer = OffscreenRenderer::new(120, 80).unwrap();
        renderer.add_mesh(pyramid()).unwrap();

        let image = renderer.render_to_image().unwrap();
        assert_eq!(image.dimensions(), (120, 80));
    }

    #[test]
    fn test_empty_scene_renders_background() {
        let mut renderer = OffscreenRenderer::with_config(
            8,
            8,
            RenderConfig {
                background_color: [0.0, 0.0, 1.0, 1.0],
                ..Default::default()
            },
        )
        .unwrap();

        let image = renderer.render_to_image().unwrap();
        assert!(image.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn test_camera_framed_on_add() {
        let mut renderer = OffscreenRenderer::new(64, 64).unwrap();
        let default_position = renderer.camera().position();

        renderer.add_mesh(pyramid()).unwrap();
        assert_ne!(renderer.camera().position(), default_position);
    }
}
