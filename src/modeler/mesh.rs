//! Coarse triangle mesh of a hex-head bolt.
//!
//! This is a stand-in for real CAD geometry: a hexagonal head whose top and
//! bottom corners are bevelled by the cut angle, and a round shank with a
//! chamfered tip. Good enough for a non-degenerate STL per bolt.

use std::f64::consts::{FRAC_PI_6, PI};

use nalgebra::Vector3;

use crate::domain::BoltSpec;

/// Segments used to approximate the shank circle.
const SHANK_SEGMENTS: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<Vector3<f64>>,
    pub triangles: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn add_vertex(&mut self, v: Vector3<f64>) -> usize {
        self.vertices.push(v);
        self.vertices.len() - 1
    }

    pub fn add_triangle(&mut self, a: usize, b: usize, c: usize) {
        self.triangles.push([a, b, c]);
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Unit normal from the winding order (zero for degenerate facets).
    pub fn facet_normal(&self, tri: [usize; 3]) -> Vector3<f64> {
        let [a, b, c] = tri.map(|i| self.vertices[i]);
        (b - a)
            .cross(&(c - a))
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Ring of vertices at height `z`, counter-clockwise seen from +z.
    fn add_ring(&mut self, sides: usize, radius: f64, z: f64) -> Vec<usize> {
        (0..sides)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / sides as f64;
                self.add_vertex(Vector3::new(radius * a.cos(), radius * a.sin(), z))
            })
            .collect()
    }

    /// Side wall between two rings of equal length; `lower` sits below `upper`.
    fn add_band(&mut self, lower: &[usize], upper: &[usize]) {
        let n = lower.len();
        for i in 0..n {
            let j = (i + 1) % n;
            self.add_triangle(lower[i], lower[j], upper[j]);
            self.add_triangle(lower[i], upper[j], upper[i]);
        }
    }

    /// Fan from `ring` to a new apex. `facing_up` picks the winding.
    fn add_fan(&mut self, ring: &[usize], apex: Vector3<f64>, facing_up: bool) {
        let c = self.add_vertex(apex);
        let n = ring.len();
        for i in 0..n {
            let j = (i + 1) % n;
            if facing_up {
                self.add_triangle(c, ring[i], ring[j]);
            } else {
                self.add_triangle(c, ring[j], ring[i]);
            }
        }
    }
}

/// Tessellate a bolt. The head spans `z ∈ [0, head_height]`, the shank hangs below.
pub fn bolt_mesh(spec: &BoltSpec) -> TriangleMesh {
    let mut mesh = TriangleMesh::default();

    let head_r = spec.head_diameter / 2.0;
    // Drop of the hex corners left by a conical cut starting at the across-flats circle.
    let bevel = (head_r - head_r * FRAC_PI_6.cos()) * spec.cut_angle.tan();
    let bevel = bevel.clamp(0.0, spec.head_height / 3.0);

    let head_bottom = mesh.add_ring(6, head_r, bevel);
    let head_top = mesh.add_ring(6, head_r, spec.head_height - bevel);
    mesh.add_band(&head_bottom, &head_top);
    mesh.add_fan(&head_top, Vector3::new(0.0, 0.0, spec.head_height), true);
    mesh.add_fan(&head_bottom, Vector3::zeros(), false);

    let shank_r = spec.body_diameter / 2.0;
    let chamfer = spec
        .chamfer_distance
        .clamp(0.0, (shank_r * 0.5).min(spec.body_length * 0.5));
    let tip_z = -spec.body_length;

    let shank_top = mesh.add_ring(SHANK_SEGMENTS, shank_r, 0.0);
    let shank_mid = mesh.add_ring(SHANK_SEGMENTS, shank_r, tip_z + chamfer);
    let shank_tip = mesh.add_ring(SHANK_SEGMENTS, shank_r - chamfer, tip_z);
    mesh.add_band(&shank_mid, &shank_top);
    mesh.add_band(&shank_tip, &shank_mid);
    mesh.add_fan(&shank_tip, Vector3::new(0.0, 0.0, tip_z), false);

    mesh
}
