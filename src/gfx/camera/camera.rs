use cgmath::{
    ortho, perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3,
    Vector4,
};

use crate::error::{RenderError, Result};
use crate::gfx::geometry::{Aabb, Containment};

use super::frustum::Frustum;

/// Maps OpenGL clip depth (-1..1) onto wgpu clip depth (0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// How the projection matrix is derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Vertical field of view; aspect follows the viewport on [`Camera::refresh`]
    Perspective { fovy: Rad<f32>, aspect: f32 },
    /// Explicit view volume size in world units
    Orthographic { width: f32, height: f32 },
}

/// A view into the scene with cached culling volumes
///
/// The frustum and the conservative world-space bounds are rebuilt whenever the
/// transform, the depth range or the viewport changes, so [`Camera::contains`]
/// never sees stale state.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3<f32>,
    up: Vector3<f32>,
    forward: Vector3<f32>,
    projection_kind: Projection,
    near: f32,
    far: f32,

    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    view_projection: Matrix4<f32>,
    frustum: Frustum,
    bounds: Aabb,
}

impl Camera {
    /// Perspective camera at the origin looking down -Z
    ///
    /// Fails unless `0 < near < far`, the aspect is positive and the field of
    /// view lies strictly between zero and half a turn.
    pub fn perspective(fovy: impl Into<Rad<f32>>, aspect: f32, near: f32, far: f32) -> Result<Self> {
        let projection_kind = Projection::Perspective {
            fovy: fovy.into(),
            aspect,
        };
        validate_projection(projection_kind)?;
        validate_depth_range(projection_kind, near, far)?;
        Ok(Self::with_projection(projection_kind, near, far))
    }

    /// Orthographic camera at the origin looking down -Z
    ///
    /// Fails unless the volume has a positive size and `near < far`.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Result<Self> {
        let projection_kind = Projection::Orthographic { width, height };
        validate_projection(projection_kind)?;
        validate_depth_range(projection_kind, near, far)?;
        Ok(Self::with_projection(projection_kind, near, far))
    }

    /// Expects arguments that already passed validation
    fn with_projection(projection_kind: Projection, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Point3::origin(),
            up: Vector3::unit_y(),
            forward: -Vector3::unit_z(),
            projection_kind,
            near,
            far,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            view_projection: Matrix4::identity(),
            frustum: Frustum::from_matrix(&Matrix4::identity()),
            bounds: Aabb::new(Point3::origin(), Point3::origin()),
        };
        camera.rebuild_view();
        camera.rebuild_projection();
        camera
    }

    /// Places the camera at `position` looking along `forward`
    pub fn set_transform_by_look_forward(
        &mut self,
        position: Point3<f32>,
        up: Vector3<f32>,
        forward: Vector3<f32>,
    ) -> Result<()> {
        if forward.magnitude2() <= f32::EPSILON {
            return Err(RenderError::InvalidArgument(format!(
                "camera forward vector must not be zero (position {:?})",
                position
            )));
        }
        if up.magnitude2() <= f32::EPSILON {
            return Err(RenderError::InvalidArgument(
                "camera up vector must not be zero".to_string(),
            ));
        }

        self.position = position;
        self.forward = forward.normalize();
        self.up = up.normalize();
        self.rebuild_view();
        self.rebuild_bounds();
        Ok(())
    }

    /// Places the camera at `position` looking at `target`
    pub fn set_transform_by_look_target(
        &mut self,
        position: Point3<f32>,
        up: Vector3<f32>,
        target: Point3<f32>,
    ) -> Result<()> {
        self.set_transform_by_look_forward(position, up, target - position)
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Unit view direction
    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    /// A point one unit ahead of the camera
    pub fn look_target(&self) -> Point3<f32> {
        self.position + self.forward
    }

    pub fn projection_kind(&self) -> Projection {
        self.projection_kind
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_near_plane(&mut self, near: f32) -> Result<()> {
        self.set_depth_range(near, self.far)
    }

    pub fn set_far_plane(&mut self, far: f32) -> Result<()> {
        self.set_depth_range(self.near, far)
    }

    /// Moves both clip planes at once; the camera is untouched on error
    pub fn set_depth_range(&mut self, near: f32, far: f32) -> Result<()> {
        validate_depth_range(self.projection_kind, near, far)?;
        self.near = near;
        self.far = far;
        self.rebuild_projection();
        Ok(())
    }

    /// Resizes an orthographic view volume; ignored for perspective cameras
    pub fn set_orthographic_size(&mut self, width: f32, height: f32) -> Result<()> {
        if let Projection::Orthographic { .. } = self.projection_kind {
            let projection_kind = Projection::Orthographic { width, height };
            validate_projection(projection_kind)?;
            self.projection_kind = projection_kind;
            self.rebuild_projection();
        }
        Ok(())
    }

    /// Per-frame refresh against the current viewport
    ///
    /// Perspective cameras pick up the viewport aspect ratio. The projection and
    /// bounds are rebuilt either way.
    pub fn refresh(&mut self, viewport_width: u32, viewport_height: u32) {
        if let Projection::Perspective { fovy, .. } = self.projection_kind {
            if viewport_width == 0 || viewport_height == 0 {
                log::warn!(
                    "Ignoring zero-sized viewport {}x{} for camera refresh",
                    viewport_width,
                    viewport_height
                );
            } else {
                self.projection_kind = Projection::Perspective {
                    fovy,
                    aspect: viewport_width as f32 / viewport_height as f32,
                };
            }
        }
        self.rebuild_projection();
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.view_projection
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Conservative world-space bounds of the view volume
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Classifies a world-space box against the view volume
    ///
    /// The cached bounds reject first; the frustum planes are only consulted
    /// when that test overlaps.
    pub fn contains(&self, bounds: &Aabb) -> Containment {
        if !self.bounds.intersects(bounds) {
            return Containment::Disjoint;
        }
        self.frustum.contains(bounds)
    }

    /// Unprojects a clip-space point (wgpu depth range) into world space
    pub fn clip_to_world(&self, clip: Point3<f32>) -> Point3<f32> {
        unproject(&self.inverse_view_projection(), clip)
    }

    fn inverse_view_projection(&self) -> Matrix4<f32> {
        self.view_projection
            .invert()
            .unwrap_or_else(Matrix4::identity)
    }

    fn rebuild_view(&mut self) {
        let up = if self.forward.cross(self.up).magnitude2() <= 1e-8 {
            // Looking straight along `up`; any perpendicular axis will do
            if self.forward.x.abs() < 0.9 {
                Vector3::unit_x()
            } else {
                Vector3::unit_z()
            }
        } else {
            self.up
        };
        self.view = Matrix4::look_to_rh(self.position, self.forward, up);
    }

    fn rebuild_projection(&mut self) {
        let base = match self.projection_kind {
            Projection::Perspective { fovy, aspect } => perspective(fovy, aspect, self.near, self.far),
            Projection::Orthographic { width, height } => ortho(
                -width * 0.5,
                width * 0.5,
                -height * 0.5,
                height * 0.5,
                self.near,
                self.far,
            ),
        };
        self.projection = OPENGL_TO_WGPU_MATRIX * base;
        self.rebuild_bounds();
    }

    fn rebuild_bounds(&mut self) {
        self.view_projection = self.projection * self.view;
        self.frustum = Frustum::from_matrix(&self.view_projection);

        let inverse = self.inverse_view_projection();
        let mut corners = [Point3::origin(); 8];
        let mut i = 0;
        for z in [0.0, 1.0] {
            for y in [-1.0, 1.0] {
                for x in [-1.0, 1.0] {
                    corners[i] = unproject(&inverse, Point3::new(x, y, z));
                    i += 1;
                }
            }
        }
        self.bounds = Aabb::from_points(corners);
    }
}

impl Default for Camera {
    /// 60 degree square perspective looking down -Z
    fn default() -> Self {
        Self::with_projection(
            Projection::Perspective {
                fovy: Rad(std::f32::consts::FRAC_PI_3),
                aspect: 1.0,
            },
            0.1,
            1000.0,
        )
    }
}

fn validate_projection(projection: Projection) -> Result<()> {
    match projection {
        Projection::Perspective { fovy, aspect } => {
            if !(fovy.0 > 0.0 && fovy.0 < std::f32::consts::PI) {
                return Err(RenderError::InvalidArgument(format!(
                    "field of view must lie in (0, pi) radians, got {}",
                    fovy.0
                )));
            }
            if !(aspect > 0.0 && aspect.is_finite()) {
                return Err(RenderError::InvalidArgument(format!(
                    "aspect ratio must be positive, got {}",
                    aspect
                )));
            }
        }
        Projection::Orthographic { width, height } => {
            if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
                return Err(RenderError::InvalidArgument(format!(
                    "orthographic size must be positive, got {}x{}",
                    width, height
                )));
            }
        }
    }
    Ok(())
}

fn validate_depth_range(projection: Projection, near: f32, far: f32) -> Result<()> {
    if !(near < far && far.is_finite() && near.is_finite()) {
        return Err(RenderError::InvalidArgument(format!(
            "near plane {} must be closer than far plane {}",
            near, far
        )));
    }
    if matches!(projection, Projection::Perspective { .. }) && !(near > 0.0) {
        return Err(RenderError::InvalidArgument(format!(
            "perspective near plane must be positive, got {}",
            near
        )));
    }
    Ok(())
}

fn unproject(inverse: &Matrix4<f32>, clip: Point3<f32>) -> Point3<f32> {
    let world = *inverse * Vector4::new(clip.x, clip.y, clip.z, 1.0);
    if world.w.abs() <= f32::EPSILON {
        return Point3::new(world.x, world.y, world.z);
    }
    Point3::from_vec(world.truncate() / world.w)
}
