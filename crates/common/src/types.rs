use glam::{Mat4, Quat, Vec3};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Model matrix that rotates first, then scales, then translates.
    ///
    /// Scaling after the rotation keeps a non-uniform scale aligned with the
    /// world axes, so a rotated quad still stretches horizontally on screen.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(self.scale)
            * Mat4::from_quat(self.rotation)
    }
}

/// Horizontal aspect applied to the preview quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMode {
    #[default]
    Square,
    Widescreen,
}

impl AspectMode {
    pub fn ratio(self) -> f32 {
        match self {
            AspectMode::Square => 1.0,
            AspectMode::Widescreen => 16.0 / 9.0,
        }
    }

    pub fn is_square(self) -> bool {
        self == AspectMode::Square
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectMode::Square => "1:1",
            AspectMode::Widescreen => "16:9",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn model_matrix_scales_after_rotating() {
        // A point on the local +Z edge ends up on world -Y, and the X scale
        // only stretches the world X axis.
        let t = Transform {
            position: Vec3::new(0.0, 0.0, 1.0),
            rotation: Quat::from_rotation_x(FRAC_PI_2),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        let p = t.model_matrix().transform_point3(Vec3::new(0.5, 0.0, 0.5));
        assert!((p - Vec3::new(1.0, -0.5, 1.0)).length() < 1e-5);
    }

    #[test]
    fn aspect_ratios() {
        assert_eq!(AspectMode::Square.ratio(), 1.0);
        assert!((AspectMode::Widescreen.ratio() - 16.0 / 9.0).abs() < f32::EPSILON);
        assert!(AspectMode::default().is_square());
        assert_eq!(AspectMode::Widescreen.label(), "16:9");
    }
}
