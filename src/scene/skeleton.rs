use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::animation::{AnimationClip, TransformTracks};
use crate::errors::{CoveError, Result};

/// Determinants below this magnitude are treated as non-invertible.
const SINGULAR_EPSILON: f32 = 1e-8;

/// Bone as delivered by the asset loader.
#[derive(Debug, Clone)]
pub struct BoneDesc {
    pub name: String,
    /// Index of the parent bone. Must be smaller than this bone's own index.
    pub parent: Option<usize>,
    /// Rest-pose transform relative to the parent bone
    pub bind_local: Mat4,
}

impl BoneDesc {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<usize>, bind_local: Mat4) -> Self {
        Self {
            name: name.into(),
            parent,
            bind_local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub bind_local: Mat4,
    /// Inverse of the bone's rest-pose world transform
    pub inverse_bind: Mat4,
}

/// A bone hierarchy with precomputed inverse-bind matrices.
///
/// Bones are stored in topological order: every parent precedes its
/// children, so a single forward pass composes world transforms. The
/// skeleton is immutable after construction and is shared between skinned
/// meshes through an `Arc`.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    // bones[i] is joint i in the vertex bone indices
    bones: Vec<Bone>,
    index: FxHashMap<String, usize>,
}

impl Skeleton {
    /// Builds a skeleton and derives inverse-bind matrices from the rest pose.
    pub fn new(name: impl Into<String>, bones: Vec<BoneDesc>) -> Result<Self> {
        Self::build(name.into(), bones, None)
    }

    /// Builds a skeleton using inverse-bind matrices supplied by the loader,
    /// one per bone.
    pub fn with_inverse_bind_matrices(
        name: impl Into<String>,
        bones: Vec<BoneDesc>,
        inverse_bind_matrices: Vec<Mat4>,
    ) -> Result<Self> {
        if inverse_bind_matrices.len() != bones.len() {
            return Err(CoveError::BoneCountMismatch {
                expected: bones.len(),
                actual: inverse_bind_matrices.len(),
            });
        }
        Self::build(name.into(), bones, Some(inverse_bind_matrices))
    }

    fn build(name: String, descs: Vec<BoneDesc>, supplied: Option<Vec<Mat4>>) -> Result<Self> {
        let mut index = FxHashMap::default();
        let mut bind_world: Vec<Mat4> = Vec::with_capacity(descs.len());

        for (i, desc) in descs.iter().enumerate() {
            if index.insert(desc.name.clone(), i).is_some() {
                return Err(CoveError::DuplicateBone(desc.name.clone()));
            }
            let world = match desc.parent {
                None => desc.bind_local,
                Some(p) if p < i => bind_world[p] * desc.bind_local,
                Some(p) => {
                    return Err(CoveError::InvalidBoneHierarchy {
                        name: desc.name.clone(),
                        index: i,
                        parent: p,
                    });
                }
            };
            bind_world.push(world);
        }

        let inverse_binds = match supplied {
            Some(ibms) => ibms,
            None => {
                let mut ibms = Vec::with_capacity(bind_world.len());
                for (desc, world) in descs.iter().zip(&bind_world) {
                    if world.determinant().abs() < SINGULAR_EPSILON {
                        return Err(CoveError::SingularBindPose(desc.name.clone()));
                    }
                    ibms.push(world.inverse());
                }
                ibms
            }
        };

        let bones: Vec<Bone> = descs
            .into_iter()
            .zip(inverse_binds)
            .map(|(desc, inverse_bind)| Bone {
                name: desc.name,
                parent: desc.parent,
                bind_local: desc.bind_local,
                inverse_bind,
            })
            .collect();

        log::debug!("Skeleton '{name}': {} bones", bones.len());

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            bones,
            index,
        })
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Rest-pose world transforms in bone order.
    #[must_use]
    pub fn bind_world_matrices(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let m = match bone.parent {
                Some(p) => world[p] * bone.bind_local,
                None => bone.bind_local,
            };
            world.push(m);
        }
        world
    }

    /// Resolves which clip channel drives each bone.
    ///
    /// Channels naming bones this skeleton lacks are ignored with a warning;
    /// bones without a channel keep their bind pose.
    #[must_use]
    pub fn bind_clip(&self, clip: Arc<AnimationClip>) -> BoundClip {
        let channel_for_bone = self
            .bones
            .iter()
            .map(|bone| clip.channel_index(&bone.name))
            .collect();

        let unmatched: Vec<String> = clip
            .channels()
            .filter(|(target, _)| !self.index.contains_key(*target))
            .map(|(target, _)| target.to_string())
            .collect();

        for target in &unmatched {
            log::warn!(
                "{}",
                CoveError::MissingBone(format!(
                    "{target} (clip '{}', skeleton '{}')",
                    clip.name, self.name
                ))
            );
        }

        BoundClip {
            clip,
            skeleton_id: self.id,
            channel_for_bone,
            unmatched,
        }
    }

    /// Fails on the first clip channel that names an unknown bone.
    pub fn check_clip(&self, clip: &AnimationClip) -> Result<()> {
        match clip
            .channels()
            .find(|(target, _)| !self.index.contains_key(*target))
        {
            Some((target, _)) => Err(CoveError::MissingBone(target.to_string())),
            None => Ok(()),
        }
    }

    /// Computes the pose at `seconds` into `pose`.
    ///
    /// World matrices are composed root first; skinning matrices are
    /// `animated_world * inverse_bind`. Without a clip, or with a clip bound
    /// to a different skeleton, the bind pose is used.
    pub fn compute_pose(&self, clip: Option<&BoundClip>, seconds: f32, pose: &mut SkinningPose) {
        let n = self.bones.len();
        pose.world.clear();
        pose.skinning.clear();
        pose.world.reserve(n);
        pose.skinning.reserve(n);

        let clip = clip.filter(|bound| {
            let same = bound.skeleton_id == self.id;
            if !same {
                log::warn!(
                    "Clip '{}' was bound to another skeleton; '{}' uses its bind pose",
                    bound.clip.name,
                    self.name
                );
            }
            same
        });
        let ticks = clip.map_or(0.0, |bound| bound.clip.track_time(seconds));

        for (i, bone) in self.bones.iter().enumerate() {
            let local = clip
                .and_then(|bound| bound.tracks_for_bone(i))
                .map_or(bone.bind_local, |tracks| tracks.matrix_at(ticks));

            let world = match bone.parent {
                Some(p) => pose.world[p] * local,
                None => local,
            };
            pose.world.push(world);
            pose.skinning.push(world * bone.inverse_bind);
        }
    }
}

/// An animation clip resolved against one skeleton's bone order.
#[derive(Debug, Clone)]
pub struct BoundClip {
    clip: Arc<AnimationClip>,
    skeleton_id: Uuid,
    channel_for_bone: Vec<Option<usize>>,
    unmatched: Vec<String>,
}

impl BoundClip {
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn skeleton_id(&self) -> Uuid {
        self.skeleton_id
    }

    /// Clip channels whose bone is missing from the skeleton.
    #[must_use]
    pub fn unmatched_channels(&self) -> &[String] {
        &self.unmatched
    }

    fn tracks_for_bone(&self, bone: usize) -> Option<&TransformTracks> {
        let channel = (*self.channel_for_bone.get(bone)?)?;
        self.clip.channel_at(channel)
    }

    /// Number of bones driven by a clip channel.
    #[must_use]
    pub fn animated_bone_count(&self) -> usize {
        self.channel_for_bone.iter().filter(|c| c.is_some()).count()
    }
}

/// Per-frame output of [`Skeleton::compute_pose`], reused across frames.
#[derive(Debug, Clone, Default)]
pub struct SkinningPose {
    /// Animated world transform of every bone, in skeleton space
    pub world: Vec<Mat4>,
    /// `world[i] * inverse_bind[i]`, ready for upload
    pub skinning: Vec<Mat4>,
}

impl SkinningPose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math;

    fn chain() -> Vec<BoneDesc> {
        vec![
            BoneDesc::new("root", None, math::translate(0.0, 1.0, 0.0)),
            BoneDesc::new("spine", Some(0), math::translate(0.0, 2.0, 0.0)),
        ]
    }

    #[test]
    fn inverse_bind_undoes_rest_world() {
        let skeleton = Skeleton::new("chain", chain()).unwrap();
        let world = skeleton.bind_world_matrices();
        for (bone, w) in skeleton.bones().iter().zip(world) {
            assert!((w * bone.inverse_bind).abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }
    }

    #[test]
    fn parent_after_child_is_rejected() {
        let bones = vec![
            BoneDesc::new("a", Some(1), Mat4::IDENTITY),
            BoneDesc::new("b", None, Mat4::IDENTITY),
        ];
        assert!(matches!(
            Skeleton::new("bad", bones),
            Err(CoveError::InvalidBoneHierarchy { index: 0, parent: 1, .. })
        ));
    }

    #[test]
    fn duplicate_and_singular_bones_are_rejected() {
        let dup = vec![
            BoneDesc::new("a", None, Mat4::IDENTITY),
            BoneDesc::new("a", Some(0), Mat4::IDENTITY),
        ];
        assert!(matches!(Skeleton::new("dup", dup), Err(CoveError::DuplicateBone(_))));

        let flat = vec![BoneDesc::new("flat", None, math::scale(1.0, 0.0, 1.0))];
        assert!(matches!(
            Skeleton::new("flat", flat),
            Err(CoveError::SingularBindPose(_))
        ));
    }

    #[test]
    fn supplied_inverse_binds_must_match_bone_count() {
        let err = Skeleton::with_inverse_bind_matrices("chain", chain(), vec![Mat4::IDENTITY]);
        assert!(matches!(
            err,
            Err(CoveError::BoneCountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn bind_pose_yields_identity_skinning() {
        let skeleton = Skeleton::new("chain", chain()).unwrap();
        let mut pose = SkinningPose::new();
        skeleton.compute_pose(None, 3.0, &mut pose);
        assert_eq!(pose.skinning.len(), 2);
        for m in pose.skinning_matrices() {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }
    }
}
