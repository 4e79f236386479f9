//! Offscreen rendering for stillframe
//!
//! Produces raster images of 3D scenes without a window: construct an
//! [`OffscreenRenderer`], attach models, optionally adjust the [`Camera`],
//! and call [`OffscreenRenderer::render`] for each snapshot. The default
//! backend is a deterministic CPU rasterizer; the `gpu` feature adds a
//! wgpu-based offscreen surface with texture readback.
//!
//! ```no_run
//! use stillframe_render::OffscreenRenderer;
//!
//! # fn main() -> stillframe_core::Result<()> {
//! stillframe_render::initialize(false);
//!
//! let mut renderer = OffscreenRenderer::new(800, 600)?;
//! renderer.add_model("bunny.ply")?;
//! renderer.render("bunny_1.png")?;
//!
//! let pos = renderer.camera().position();
//! renderer.camera_mut().set_position(pos + stillframe_core::Vector3f::new(0.2, 0.2, 0.2));
//! renderer.render("bunny_2.png")?;
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod framebuffer;
pub mod image_write;
pub mod init;
pub mod offscreen;
pub mod raster;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use camera::Camera;
pub use framebuffer::Framebuffer;
pub use image_write::write_image;
pub use init::{initialize, is_initialized, resource_directory, shutdown};
pub use offscreen::{ModelHandle, OffscreenRenderer, RenderConfig};
