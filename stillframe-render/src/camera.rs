//! Camera state for offscreen rendering

use nalgebra::{Matrix4, Perspective3};
use stillframe_core::{Aabb, Point3f, Vector3f};

/// A 3D camera for viewing meshes and point clouds
///
/// Setters replace state that takes effect on the next render call; nothing
/// re-renders implicitly. Every setter guards against values that would make
/// the camera unrenderable, so the view and projection matrices are always
/// well defined.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3f,
    target: Point3f,
    up: Vector3f,
    fov: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3f,
        target: Point3f,
        up: Vector3f,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self::default();
        camera.look_at(position, target, up);
        camera.set_fov(fov);
        camera.set_aspect_ratio(aspect_ratio);
        camera.set_clip_planes(near, far);
        camera
    }

    /// Current eye position
    pub fn position(&self) -> Point3f {
        self.position
    }

    /// Replace the eye position; takes effect on the next render call
    ///
    /// Non-finite coordinates are ignored.
    pub fn set_position(&mut self, position: Point3f) {
        if position.iter().all(|c| c.is_finite()) {
            self.position = position;
        } else {
            log::warn!("ignoring non-finite camera position {:?}", position);
        }
    }

    /// Point the camera looks at
    pub fn target(&self) -> Point3f {
        self.target
    }

    /// Replace the look-at target
    pub fn set_target(&mut self, target: Point3f) {
        if target.iter().all(|c| c.is_finite()) {
            self.target = target;
        } else {
            log::warn!("ignoring non-finite camera target {:?}", target);
        }
    }

    /// Up direction
    pub fn up(&self) -> Vector3f {
        self.up
    }

    /// Replace the up direction; zero or non-finite vectors are ignored
    pub fn set_up(&mut self, up: Vector3f) {
        if up.iter().all(|c| c.is_finite()) && up.norm() > 1e-6 {
            self.up = up.normalize();
        } else {
            log::warn!("ignoring degenerate camera up vector {:?}", up);
        }
    }

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Replace the vertical field of view, clamped to a renderable range
    pub fn set_fov(&mut self, fov: f32) {
        if fov.is_finite() {
            self.fov = fov.clamp(0.01, std::f32::consts::PI - 0.01);
        }
    }

    /// Width over height of the output surface
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Replace the aspect ratio; non-positive values are ignored
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    /// Near and far clip plane distances
    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Replace the clip planes; requires 0 < near < far
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        if near.is_finite() && far.is_finite() && near > 0.0 && far > near {
            self.near = near;
            self.far = far;
        } else {
            log::warn!("ignoring degenerate clip planes near={} far={}", near, far);
        }
    }

    /// Reposition the camera in one call
    pub fn look_at(&mut self, position: Point3f, target: Point3f, up: Vector3f) {
        self.set_position(position);
        self.set_target(target);
        self.set_up(up);
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far).into_inner()
    }

    /// Combined projection * view matrix
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Frame the camera so the given bounds fill the view
    ///
    /// Keeps the current viewing direction, retargets to the bounds center,
    /// and pulls the clip planes around the scene. Empty bounds are ignored.
    pub fn fit_bounds(&mut self, bounds: &Aabb) {
        if bounds.is_empty() {
            return;
        }

        let center = bounds.center();
        let radius = bounds.radius().max(1e-4);

        let mut direction = self.position - self.target;
        if direction.norm() < 1e-6 || !direction.iter().all(|c| c.is_finite()) {
            direction = Vector3f::new(0.0, 0.0, 1.0);
        } else {
            direction = direction.normalize();
        }

        // Distance that fits the enclosing sphere in the narrower half-angle,
        // with a small margin so silhouettes do not touch the frame.
        let tan_vertical = (0.5 * self.fov).tan();
        let tan_horizontal = tan_vertical * self.aspect_ratio;
        let tan_narrow = tan_vertical.min(tan_horizontal).max(1e-3);
        let distance = radius / tan_narrow * 1.2;

        self.target = center;
        self.position = center + direction * distance;
        self.near = (distance - 2.0 * radius).max(distance * 1e-2);
        self.far = distance + 4.0 * radius;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3f::new(0.0, 0.0, 5.0),
            target: Point3f::new(0.0, 0.0, 0.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_set_position_takes_effect() {
        let mut camera = Camera::default();
        camera.set_position(Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(camera.position(), Point3f::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_degenerate_values_ignored() {
        let mut camera = Camera::default();
        let before = camera.position();

        camera.set_position(Point3f::new(f32::NAN, 0.0, 0.0));
        assert_eq!(camera.position(), before);

        camera.set_up(Vector3f::zeros());
        assert_relative_eq!(camera.up().norm(), 1.0);

        camera.set_clip_planes(-1.0, 0.5);
        assert_eq!(camera.clip_planes(), (0.1, 100.0));
    }

    #[test]
    fn test_matrices_are_finite() {
        let camera = Camera::default();
        assert!(camera.view_projection().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_fit_bounds_centers_scene() {
        let mut camera = Camera::default();
        let bounds = Aabb::from_points(
            [
                Point3f::new(-1.0, -1.0, -1.0),
                Point3f::new(1.0, 1.0, 1.0),
            ]
            .iter(),
        );
        camera.fit_bounds(&bounds);

        // The bounds center must project inside clip space
        let vp = camera.view_projection();
        let clip = vp * bounds.center().to_homogeneous();
        assert!(clip.w > 0.0);
        let ndc = Point3::from_homogeneous(clip).unwrap();
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0 && ndc.z.abs() <= 1.0);

        // Viewing direction is preserved (default camera looks down -z)
        let dir = (camera.position() - camera.target()).normalize();
        assert_relative_eq!(dir.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_fit_empty_bounds_is_noop() {
        let mut camera = Camera::default();
        let before = camera.position();
        camera.fit_bounds(&Aabb::empty());
        assert_eq!(camera.position(), before);
    }
}
