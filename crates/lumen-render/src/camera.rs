//! Perspective camera for view/projection matrices and picking rays.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3};

/// A perspective camera. Depth maps near → 0 and far → 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion; the camera looks down its local -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    /// Far clip plane; tracks the render distance.
    pub far: f32,
}

impl Default for Camera {
    /// 60° field of view at (0, 0, 1000), looking toward the origin.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1_000.0),
            rotation: Quat::IDENTITY,
            fov_y: 60f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 1.0,
            far: 20_000.0,
        }
    }
}

/// Camera data laid out for a uniform buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

/// A half-line used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first hit with a sphere, if any.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt = discriminant.sqrt();
        let t = -b - sqrt;
        if t >= 0.0 {
            Some(t)
        } else if -b + sqrt >= 0.0 {
            // Origin inside the sphere.
            Some(0.0)
        } else {
            None
        }
    }

    /// Closest approach to the segment `a..b`: `(t along ray, distance)`.
    pub fn closest_to_segment(&self, a: Vec3, b: Vec3) -> (f32, f32) {
        let u = self.direction;
        let v = b - a;
        let w = self.origin - a;
        let uu = u.dot(u);
        let uv = u.dot(v);
        let vv = v.dot(v);
        let uw = u.dot(w);
        let vw = v.dot(w);
        let denom = uu * vv - uv * uv;

        let mut s = if denom.abs() > f32::EPSILON {
            ((uv * uw - uu * vw) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = (uv * s - uw) / uu;
        if t < 0.0 {
            t = 0.0;
            s = if vv > 0.0 { (vw / vv).clamp(0.0, 1.0) } else { 0.0 };
        }
        let on_ray = self.at(t);
        let on_segment = a + v * s;
        (t, on_ray.distance(on_segment))
    }
}

impl Camera {
    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation);
        let translation_matrix = Mat4::from_translation(self.position);
        (translation_matrix * rotation_matrix).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Ray through a point given in normalized device coordinates ([-1, 1], y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection_matrix().inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - near).normalize_or_zero();
        Ray {
            origin: self.position,
            direction: if direction == Vec3::ZERO { self.forward() } else { direction },
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [self.position.x, self.position.y, self.position.z, 0.0],
        }
    }
}
