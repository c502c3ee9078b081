use glam::Vec3;

/// Rays closer to parallel than this are treated as missing the plane.
pub const PARALLEL_EPSILON: f32 = 1e-4;

/// Half-line starting at `origin` and extending along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a successful ray intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the hit, in units of the ray direction.
    pub distance: f32,
    pub point: Vec3,
    /// Surface normal, oriented against the ray.
    pub normal: Vec3,
}

/// Intersect `ray` with the plane through `plane_point` with normal `plane_normal`.
///
/// The normal does not need to be unit length. Returns `None` when the ray
/// runs parallel to the plane or the plane lies behind the ray origin.
pub fn intersect_plane(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<RayHit> {
    let normal = plane_normal.normalize();
    let denom = normal.dot(ray.direction);
    if denom.abs() <= PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }

    Some(RayHit {
        distance: t,
        point: ray.at(t),
        normal: if denom >= 0.0 { -normal } else { normal },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_lies_on_plane() {
        let ray = Ray::new(Vec3::new(0.3, 2.0, -1.0), Vec3::new(0.2, -1.0, 0.4).normalize());
        let plane_point = Vec3::new(5.0, 0.5, 5.0);
        let plane_normal = Vec3::new(0.0, 3.0, 0.0);

        let hit = intersect_plane(&ray, plane_point, plane_normal).unwrap();
        assert!(hit.distance >= 0.0);
        assert!((hit.point - ray.at(hit.distance)).length() < 1e-5);
        assert!((hit.point - plane_point).dot(plane_normal.normalize()).abs() < 1e-4);
    }

    #[test]
    fn normal_faces_the_ray() {
        let down = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y);
        let hit = intersect_plane(&down, Vec3::ZERO, Vec3::Y).unwrap();
        assert_eq!(hit.normal, Vec3::Y);
        assert!((hit.distance - 1.0).abs() < 1e-6);

        // Same plane, normal given the other way round.
        let hit = intersect_plane(&down, Vec3::ZERO, Vec3::NEG_Y).unwrap();
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(intersect_plane(&ray, Vec3::ZERO, Vec3::Y).is_none());

        let grazing = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.5e-4, 0.0));
        assert!(intersect_plane(&grazing, Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn plane_behind_origin_misses() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(intersect_plane(&ray, Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn origin_on_plane_hits_at_zero() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = intersect_plane(&ray, Vec3::ZERO, Vec3::Z).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.point, Vec3::ZERO);
    }
}
