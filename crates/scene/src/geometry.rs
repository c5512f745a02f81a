//! Geometry descriptors and their CPU tessellation.

use glam::Vec3;
use orbitscene_common::Color;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Primitive topology of tessellated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Tessellated vertex data ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Per-vertex colours. Empty when the material colour applies.
    pub colors: Vec<Color>,
    pub indices: Vec<u32>,
    pub topology: Option<Topology>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn topology(&self) -> Topology {
        self.topology.unwrap_or(Topology::Triangles)
    }
}

/// Partial or full UV sphere.
///
/// `phi` sweeps around the vertical axis, `theta` runs from the north pole
/// (theta = 0) down to the south pole (theta = PI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl SphereGeometry {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            width_segments: 32,
            height_segments: 16,
            phi_start: 0.0,
            phi_length: TAU,
            theta_start: 0.0,
            theta_length: PI,
        }
    }

    pub fn with_segments(mut self, width: u32, height: u32) -> Self {
        self.width_segments = width.max(3);
        self.height_segments = height.max(2);
        self
    }

    pub fn with_phi(mut self, start: f32, length: f32) -> Self {
        self.phi_start = start;
        self.phi_length = length;
        self
    }

    pub fn with_theta(mut self, start: f32, length: f32) -> Self {
        self.theta_start = start;
        self.theta_length = length;
        self
    }

    /// Vertex at normalized sweep coordinates `u` (phi) and `v` (theta).
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let phi = self.phi_start + u * self.phi_length;
        let theta = self.theta_start + v * self.theta_length;
        Vec3::new(
            -self.radius * phi.cos() * theta.sin(),
            self.radius * theta.cos(),
            self.radius * phi.sin() * theta.sin(),
        )
    }

    fn tessellate(&self) -> MeshData {
        let ws = self.width_segments;
        let hs = self.height_segments;
        let theta_end = (self.theta_start + self.theta_length).min(PI);

        let mut data = MeshData {
            topology: Some(Topology::Triangles),
            ..MeshData::default()
        };
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(hs as usize + 1);
        let mut index = 0u32;

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let mut row = Vec::with_capacity(ws as usize + 1);
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let vertex = self.sample(u, v);
                data.positions.push(vertex);
                data.normals.push(vertex.normalize_or_zero());
                row.push(index);
                index += 1;
            }
            grid.push(row);
        }

        for iy in 0..hs as usize {
            for ix in 0..ws as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 || self.theta_start > 0.0 {
                    data.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs as usize - 1 || theta_end < PI {
                    data.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        data
    }
}

/// Ring with a circular cross-section, lying in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorusGeometry {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    pub arc: f32,
}

impl TorusGeometry {
    pub fn new(radius: f32, tube: f32) -> Self {
        Self {
            radius,
            tube,
            radial_segments: 12,
            tubular_segments: 48,
            arc: TAU,
        }
    }

    fn tessellate(&self) -> MeshData {
        let radial = self.radial_segments;
        let tubular = self.tubular_segments;
        let mut data = MeshData {
            topology: Some(Topology::Triangles),
            ..MeshData::default()
        };

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * self.arc;
                let ring = self.radius + self.tube * v.cos();
                let vertex = Vec3::new(ring * u.cos(), ring * u.sin(), self.tube * v.sin());
                let center = Vec3::new(self.radius * u.cos(), self.radius * u.sin(), 0.0);
                data.positions.push(vertex);
                data.normals.push((vertex - center).normalize_or_zero());
            }
        }

        let stride = tubular + 1;
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                data.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        data
    }
}

/// Geometry descriptor stored in the scene's geometry table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Single-segment rectangle in the XY plane facing +Z.
    Plane { width: f32, height: f32 },
    Sphere(SphereGeometry),
    Torus(TorusGeometry),
    /// X/Y/Z axis lines of the given length, coloured red/green/blue.
    Axes { size: f32 },
}

impl Geometry {
    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    pub fn axes(size: f32) -> Self {
        Self::Axes { size }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Plane { .. } => "plane",
            Self::Sphere(_) => "sphere",
            Self::Torus(_) => "torus",
            Self::Axes { .. } => "axes",
        }
    }

    pub fn tessellate(&self) -> MeshData {
        match self {
            Self::Plane { width, height } => plane_mesh(*width, *height),
            Self::Sphere(sphere) => sphere.tessellate(),
            Self::Torus(torus) => torus.tessellate(),
            Self::Axes { size } => axes_mesh(*size),
        }
    }
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let hw = width / 2.0;
    let hh = height / 2.0;
    MeshData {
        positions: vec![
            Vec3::new(-hw, hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
        ],
        normals: vec![Vec3::Z; 4],
        colors: Vec::new(),
        indices: vec![0, 2, 1, 2, 3, 1],
        topology: Some(Topology::Triangles),
    }
}

fn axes_mesh(size: f32) -> MeshData {
    let mut data = MeshData {
        topology: Some(Topology::Lines),
        ..MeshData::default()
    };
    for (axis, color) in [
        (Vec3::X, Color::rgb(1.0, 0.0, 0.0)),
        (Vec3::Y, Color::rgb(0.0, 1.0, 0.0)),
        (Vec3::Z, Color::rgb(0.0, 0.0, 1.0)),
    ] {
        let base = data.positions.len() as u32;
        data.positions.extend_from_slice(&[Vec3::ZERO, axis * size]);
        data.normals.extend_from_slice(&[Vec3::ZERO, Vec3::ZERO]);
        data.colors.extend_from_slice(&[color, color]);
        data.indices.extend_from_slice(&[base, base + 1]);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn upper_hemisphere() -> SphereGeometry {
        SphereGeometry::new(1.0)
            .with_segments(32, 16)
            .with_phi(0.0, TAU)
            .with_theta(0.0, PI / 2.0)
    }

    #[test]
    fn sphere_apex_and_equator() {
        let sphere = upper_hemisphere();
        let apex = sphere.sample(0.0, 0.0);
        let equator = sphere.sample(0.25, 1.0);
        assert!((apex.y - 1.0).abs() < EPS);
        assert!(equator.y.abs() < EPS);
        assert!(apex.y > equator.y);
    }

    #[test]
    fn hemisphere_has_no_vertices_below_equator() {
        let mesh = Geometry::Sphere(upper_hemisphere()).tessellate();
        assert_eq!(mesh.vertex_count(), 33 * 17);
        assert!(mesh.positions.iter().all(|p| p.y > -EPS));
    }

    #[test]
    fn hemisphere_keeps_bottom_row_triangles() {
        // The open rim is not a pole, so both triangles of each bottom quad stay.
        let half = Geometry::Sphere(upper_hemisphere()).tessellate();
        let full = Geometry::Sphere(SphereGeometry::new(1.0)).tessellate();
        assert_eq!(full.indices.len(), (32 * 16 * 2 - 2 * 32) * 3);
        assert_eq!(half.indices.len(), (32 * 16 * 2 - 32) * 3);
    }

    #[test]
    fn full_sphere_reaches_both_poles() {
        let mesh = Geometry::Sphere(SphereGeometry::new(0.2)).tessellate();
        let max_y = mesh.positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let min_y = mesh.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((max_y - 0.2).abs() < EPS);
        assert!((min_y + 0.2).abs() < EPS);
    }

    #[test]
    fn torus_vertices_lie_within_tube() {
        let torus = TorusGeometry::new(0.3, 0.1);
        let mesh = Geometry::Torus(torus).tessellate();
        assert_eq!(mesh.vertex_count(), 13 * 49);
        assert_eq!(mesh.indices.len(), 12 * 48 * 6);
        for p in &mesh.positions {
            let ring = Vec3::new(p.x, p.y, 0.0).length();
            let dist = Vec3::new(ring - 0.3, p.z, 0.0).length();
            assert!((dist - 0.1).abs() < 1e-4);
        }
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = Geometry::plane(5.0, 5.0).tessellate();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Z));
        let max_x = mesh.positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert_eq!(max_x, 2.5);
    }

    #[test]
    fn axes_are_coloured_lines() {
        let mesh = Geometry::axes(10.0).tessellate();
        assert_eq!(mesh.topology(), Topology::Lines);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.positions[1], Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(mesh.colors[5], Color::rgb(0.0, 0.0, 1.0));
    }
}
