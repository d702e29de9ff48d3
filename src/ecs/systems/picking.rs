use crate::ecs::types::{ShapeBounds, Transform3D};
use glam::Vec3;

pub fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let mut t = -b - sqrt_d;
    if t < 0.0 {
        t = -b + sqrt_d;
    }
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Distance along a normalized ray to a shape's bounding sphere, scaled by the
/// largest axis of its transform.
pub fn ray_hit_shape(origin: Vec3, dir: Vec3, transform: &Transform3D, bounds: &ShapeBounds) -> Option<f32> {
    if !transform.translation.is_finite() || !transform.scale.is_finite() {
        return None;
    }
    let radius = bounds.radius * transform.scale.abs().max_element();
    if radius <= 0.0 {
        return None;
    }
    ray_sphere_intersection(origin, dir, transform.translation, radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_sphere_in_front() {
        let t = ray_sphere_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn origin_inside_sphere_returns_exit_distance() {
        let t = ray_sphere_intersection(Vec3::ZERO, Vec3::X, Vec3::ZERO, 2.0);
        assert_eq!(t, Some(2.0));
    }

    #[test]
    fn sphere_behind_ray_is_missed() {
        assert!(ray_sphere_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn shape_scale_grows_bounds() {
        let transform = Transform3D { scale: Vec3::splat(2.0), ..Transform3D::from_translation(Vec3::ZERO) };
        let bounds = ShapeBounds { radius: 1.0 };
        let origin = Vec3::new(1.5, 0.0, 10.0);
        assert!(ray_hit_shape(origin, Vec3::NEG_Z, &transform, &bounds).is_some());
        assert!(ray_hit_shape(origin, Vec3::NEG_Z, &Transform3D::default(), &bounds).is_none());
    }
}
