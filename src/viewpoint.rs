//! The active viewpoint: a perspective camera with a cached projection.

use glam::{Mat4, Vec3};

/// Perspective viewpoint for a scene.
///
/// The projection matrix is recomputed whenever the aspect ratio (or field of
/// view) changes; the frame coordinator calls [`set_aspect`](Self::set_aspect)
/// when it detects a surface resize.
#[derive(Clone, Copy, Debug)]
pub struct Viewpoint {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    projection: Mat4,
}

impl Viewpoint {
    /// Create a viewpoint with the given vertical FOV (degrees) and aspect.
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let fov_y = fov_degrees.to_radians();
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y,
            near,
            far,
            aspect,
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.target = Vec3::new(x, y, z);
        self
    }

    /// Current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio and recompute the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.recompute();
    }

    /// Change the vertical field of view (degrees) and recompute.
    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.fov_y = fov_degrees.to_radians();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    /// Cached projection matrix.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// View matrix looking from `position` toward `target`.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }

    /// Unit vector from the viewpoint toward its target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Unit vector to the viewpoint's right.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Up vector re-orthogonalized against forward and right.
    pub fn orthogonal_up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or_zero()
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::new(65.0, 16.0 / 9.0, 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_aspect_recomputes_projection() {
        let mut vp = Viewpoint::new(65.0, 1.0, 0.1, 100.0);
        let before = vp.projection();
        vp.set_aspect(2.0);
        assert_eq!(vp.aspect(), 2.0);
        assert_ne!(vp.projection(), before);
        // Widening the aspect shrinks the x scale.
        assert!(vp.projection().col(0).x < before.col(0).x);
    }

    #[test]
    fn basis_vectors_are_orthonormal() {
        let vp = Viewpoint::default().at(3.0, 2.0, 5.0).looking_at(0.0, 0.0, 0.0);
        let f = vp.forward();
        let r = vp.right();
        let u = vp.orthogonal_up();
        assert!(f.dot(r).abs() < 1e-5);
        assert!(f.dot(u).abs() < 1e-5);
        assert!((f.length() - 1.0).abs() < 1e-5);
    }
}
