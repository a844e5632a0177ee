//! Display filters: clip and shrink.
//!
//! Filters never touch the loaded mesh; they produce the geometry a
//! renderable actually draws. Clip runs before shrink when both are on.

use glam::Vec3;
use shared::DisplayFilters;

use super::MeshData;
use crate::config::FilterSettings;

/// Produce display geometry for `mesh` with the given filters switched on
pub fn apply_filters(mesh: &MeshData, filters: DisplayFilters, settings: &FilterSettings) -> MeshData {
    let origin = Vec3::from_array(settings.clip_origin);
    let normal = Vec3::from_array(settings.clip_normal);
    match (filters.clip, filters.shrink) {
        (false, false) => mesh.clone(),
        (true, false) => clip(mesh, origin, normal),
        (false, true) => shrink(mesh, settings.shrink_factor),
        (true, true) => shrink(&clip(mesh, origin, normal), settings.shrink_factor),
    }
}

/// Keep the part of the mesh on the side `normal` points to.
///
/// Triangles crossing the plane are cut; the kept piece is re-triangulated.
/// A zero normal leaves the mesh unchanged.
pub fn clip(mesh: &MeshData, origin: Vec3, normal: Vec3) -> MeshData {
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return mesh.clone();
    }

    let mut out = MeshData::new();
    for t in 0..mesh.triangle_count() {
        let tri = mesh.triangle(t);
        let tri_normal = mesh.triangle_normal(t);
        let dist = tri.map(|p| (p - origin).dot(n));

        if dist.iter().all(|d| *d >= 0.0) {
            out.push_triangle_with_normal(tri, tri_normal);
            continue;
        }
        if dist.iter().all(|d| *d < 0.0) {
            continue;
        }

        // Sutherland-Hodgman against a single plane
        let mut poly: Vec<Vec3> = Vec::with_capacity(4);
        for i in 0..3 {
            let j = (i + 1) % 3;
            let (p, q) = (tri[i], tri[j]);
            let (dp, dq) = (dist[i], dist[j]);
            if dp >= 0.0 {
                poly.push(p);
            }
            if (dp >= 0.0) != (dq >= 0.0) {
                let s = dp / (dp - dq);
                poly.push(p + (q - p) * s);
            }
        }
        for k in 1..poly.len().saturating_sub(1) {
            out.push_triangle_with_normal([poly[0], poly[k], poly[k + 1]], tri_normal);
        }
    }
    out
}

/// Pull every triangle toward its centroid; `factor` is clamped to `0..=1`
pub fn shrink(mesh: &MeshData, factor: f32) -> MeshData {
    let factor = factor.clamp(0.0, 1.0);
    let mut out = MeshData {
        vertices: Vec::with_capacity(mesh.triangle_count() * 3 * super::STRIDE),
        indices: Vec::with_capacity(mesh.triangle_count() * 3),
    };
    for t in 0..mesh.triangle_count() {
        let tri = mesh.triangle(t);
        let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
        let shrunk = tri.map(|p| centroid + (p - centroid) * factor);
        out.push_triangle_with_normal(shrunk, mesh.triangle_normal(t));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube;

    #[test]
    fn test_no_filters_is_identity() {
        let m = cube(1.0, 1.0, 1.0);
        let out = apply_filters(&m, DisplayFilters::default(), &FilterSettings::default());
        assert_eq!(out, m);
    }

    #[test]
    fn test_clip_keeps_upper_half() {
        let m = cube(2.0, 2.0, 2.0);
        let out = clip(&m, Vec3::ZERO, Vec3::Y);
        let b = out.bounds().unwrap();
        assert!(b.min.y >= -1e-6);
        assert!((b.max.y - 1.0).abs() < 1e-6);
        assert!((b.min.x + 1.0).abs() < 1e-6);
        // top face (2) + each side face cut into a triangle and a quad (1 + 2)
        assert_eq!(out.triangle_count(), 2 + 4 * 3);
    }

    #[test]
    fn test_clip_everything_below() {
        let m = cube(1.0, 1.0, 1.0);
        let out = clip(&m, Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(out.is_empty());
    }

    #[test]
    fn test_clip_zero_normal_is_identity() {
        let m = cube(1.0, 1.0, 1.0);
        assert_eq!(clip(&m, Vec3::ZERO, Vec3::ZERO), m);
    }

    #[test]
    fn test_shrink_moves_corners_toward_centroid() {
        let mut m = MeshData::new();
        m.push_triangle([Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)]);
        let out = shrink(&m, 0.5);
        let tri = out.triangle(0);
        let centroid = Vec3::new(1.0, 1.0, 0.0);
        assert!((tri[0] - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
        assert!(((tri[0] + tri[1] + tri[2]) / 3.0 - centroid).length() < 1e-6);
    }

    #[test]
    fn test_both_filters_clip_then_shrink() {
        let m = cube(2.0, 2.0, 2.0);
        let settings = FilterSettings::default();
        let both = apply_filters(&m, DisplayFilters { clip: true, shrink: true }, &settings);
        let clipped = clip(&m, Vec3::ZERO, Vec3::Y);
        assert_eq!(both.triangle_count(), clipped.triangle_count());
        let b = both.bounds().unwrap();
        assert!(b.min.y > 0.0);
        assert!(b.max.x < 1.0);
    }
}
