//! Object placement: translation, Euler rotation and scale.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians, applied yaw (Y) then pitch (X) then roll (Z).
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn translate_to(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn translate_by(mut self, offset: Vec3) -> Self {
        self.translation += offset;
        self
    }

    pub fn rotate_to(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale_to(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }
}

/// `T * R * S`
pub fn model_matrix(transform: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(transform.scale, transform.orientation(), transform.translation)
}

/// Inverse-transpose of the model matrix's upper 3x3, for transforming normals.
pub fn normal_matrix(transform: &Transform) -> Mat3 {
    Mat3::from_mat4(model_matrix(transform)).inverse().transpose()
}
