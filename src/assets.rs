//! Load-Phase Data Contracts
//!
//! The viewer core does not read files or decode images. An asset loader
//! hands it plain data through the types in this module, and everything is
//! validated here, before the resulting nodes join the live scene graph.
//!
//! - [`MeshData`]: vertex attributes, bone influences and indices of one mesh
//! - [`MeshId`]: the rendering backend's handle for already-uploaded geometry
//! - [`HeightField`]: terrain heights used to place characters on the ground

use glam::{Vec2, Vec3};

use crate::errors::{CoveError, Result};

/// Bone influences stored per vertex.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// Opaque handle to geometry owned by the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Geometry of one mesh as delivered by the asset loader.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    /// Per-vertex bone indices; empty for static meshes
    pub bone_indices: Vec<[u32; MAX_BONE_INFLUENCES]>,
    /// Per-vertex bone weights, parallel to `bone_indices`
    pub bone_weights: Vec<[f32; MAX_BONE_INFLUENCES]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.bone_indices.is_empty()
    }

    fn invalid(&self, reason: impl Into<String>) -> CoveError {
        CoveError::InvalidMesh {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Checks attribute lengths, index bounds and bone references.
    ///
    /// `bone_count` is the size of the skeleton this mesh will be skinned
    /// with; pass `None` for static meshes.
    pub fn validate(&self, bone_count: Option<usize>) -> Result<()> {
        let n = self.vertex_count();

        for (attr, len) in [
            ("normals", self.normals.len()),
            ("tex_coords", self.tex_coords.len()),
            ("bone_indices", self.bone_indices.len()),
            ("bone_weights", self.bone_weights.len()),
        ] {
            if len != 0 && len != n {
                return Err(self.invalid(format!("{attr} has {len} entries for {n} vertices")));
            }
        }

        if self.bone_indices.len() != self.bone_weights.len() {
            return Err(self.invalid("bone_indices and bone_weights must both be present"));
        }

        if self.indices.len() % 3 != 0 {
            return Err(self.invalid(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(self.invalid(format!("index {bad} out of range for {n} vertices")));
        }

        if self.is_skinned() {
            let Some(bone_count) = bone_count else {
                return Err(self.invalid("skinned mesh supplied without a skeleton"));
            };
            for (v, (ids, weights)) in self.bone_indices.iter().zip(&self.bone_weights).enumerate() {
                for (&id, &w) in ids.iter().zip(weights) {
                    if !w.is_finite() || w < 0.0 {
                        return Err(self.invalid(format!("vertex {v} has bone weight {w}")));
                    }
                    if w > 0.0 && id as usize >= bone_count {
                        return Err(self.invalid(format!(
                            "vertex {v} references bone {id} of {bone_count}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Rescales every vertex's bone weights to sum to one. Vertices with no
    /// influence are left untouched.
    pub fn normalize_bone_weights(&mut self) {
        for weights in &mut self.bone_weights {
            let sum: f32 = weights.iter().sum();
            if sum > f32::EPSILON {
                for w in weights.iter_mut() {
                    *w /= sum;
                }
            }
        }
    }
}

/// Terrain heights sampled on a regular grid.
///
/// Samples are 8-bit and stored so that `samples[x * depth + z]` is the height
/// at grid cell `(x, z)`. A sample `s` maps to `s * max_height / 256` world
/// units.
#[derive(Debug, Clone)]
pub struct HeightField {
    width: usize,
    depth: usize,
    samples: Vec<u8>,
    max_height: f32,
}

impl HeightField {
    pub fn from_samples(width: usize, depth: usize, samples: Vec<u8>, max_height: f32) -> Result<Self> {
        if width == 0 || depth == 0 {
            return Err(CoveError::InvalidHeightField(format!(
                "dimensions {width}x{depth} are empty"
            )));
        }
        if samples.len() != width * depth {
            return Err(CoveError::InvalidHeightField(format!(
                "{} samples for a {width}x{depth} grid",
                samples.len()
            )));
        }
        if !max_height.is_finite() {
            return Err(CoveError::InvalidHeightField(format!(
                "max height {max_height} is not finite"
            )));
        }
        Ok(Self {
            width,
            depth,
            samples,
            max_height,
        })
    }

    /// A field of constant height zero.
    #[must_use]
    pub fn flat(width: usize, depth: usize) -> Self {
        Self {
            width: width.max(1),
            depth: depth.max(1),
            samples: vec![0; width.max(1) * depth.max(1)],
            max_height: 0.0,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Height at grid coordinates `(x, z)`, truncated to the containing cell
    /// and clamped to the grid.
    #[must_use]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let xi = clamp_cell(x, self.width);
        let zi = clamp_cell(z, self.depth);
        f32::from(self.samples[xi * self.depth + zi]) * self.max_height / 256.0
    }
}

fn clamp_cell(coord: f32, len: usize) -> usize {
    if coord.is_nan() || coord <= 0.0 {
        0
    } else {
        (coord as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            name: "tri".into(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn static_triangle_is_valid() {
        assert!(triangle().validate(None).is_ok());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 3];
        assert!(matches!(mesh.validate(None), Err(CoveError::InvalidMesh { .. })));
    }

    #[test]
    fn bone_reference_checked_against_skeleton() {
        let mut mesh = triangle();
        mesh.bone_indices = vec![[0, 0, 0, 0], [1, 0, 0, 0], [5, 0, 0, 0]];
        mesh.bone_weights = vec![[1.0, 0.0, 0.0, 0.0]; 3];
        assert!(mesh.validate(Some(2)).is_err());
        assert!(mesh.validate(Some(6)).is_ok());
    }

    #[test]
    fn weights_normalize_to_one() {
        let mut mesh = triangle();
        mesh.bone_indices = vec![[0, 1, 0, 0]; 3];
        mesh.bone_weights = vec![[2.0, 2.0, 0.0, 0.0]; 3];
        mesh.normalize_bone_weights();
        assert!((mesh.bone_weights[0][0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn height_field_scales_and_clamps() {
        let field = HeightField::from_samples(2, 2, vec![0, 128, 64, 255], 25.0).unwrap();
        assert!((field.height_at(0.0, 1.0) - 12.5).abs() < 1e-5);
        assert!((field.height_at(1.7, 0.2) - 6.25).abs() < 1e-5);
        assert!((field.height_at(50.0, 50.0) - 255.0 * 25.0 / 256.0).abs() < 1e-5);
        assert_eq!(field.height_at(-3.0, -3.0), 0.0);
    }
}
