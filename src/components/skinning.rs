//! Skinned model data shared by every character that uses a model.
//!
//! Bones are stored parent-first: `skeleton_hierarchy[i]` is the parent index
//! of bone `i` (`None` for the root) and is always smaller than `i`.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Local transform of one bone at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub bone: usize,
    /// Seconds from the start of the clip.
    pub time: f32,
    pub transform: Mat4,
}

impl Keyframe {
    pub fn new(bone: usize, time: f32, transform: Mat4) -> Self {
        Self {
            bone,
            time,
            transform,
        }
    }
}

/// One animation take. Keyframes are sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub duration: f32,
    pub keyframes: Vec<Keyframe>,
}

impl AnimationClip {
    pub fn new(duration: f32, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            duration,
            keyframes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinningData {
    pub bind_pose: Vec<Mat4>,
    pub inverse_bind_pose: Vec<Mat4>,
    pub skeleton_hierarchy: Vec<Option<usize>>,
    pub clips: FxHashMap<String, Arc<AnimationClip>>,
}

impl SkinningData {
    /// Build skinning data from a bind pose. Inverse bind matrices are derived
    /// from the bind pose composed along the hierarchy.
    pub fn from_bind_pose(bind_pose: Vec<Mat4>, skeleton_hierarchy: Vec<Option<usize>>) -> Self {
        let mut absolute: Vec<Mat4> = Vec::with_capacity(bind_pose.len());
        for (bone, local) in bind_pose.iter().enumerate() {
            let world = match skeleton_hierarchy.get(bone).copied().flatten() {
                Some(parent) if parent < bone => absolute[parent] * *local,
                _ => *local,
            };
            absolute.push(world);
        }
        Self {
            inverse_bind_pose: absolute.iter().map(Mat4::inverse).collect(),
            bind_pose,
            skeleton_hierarchy,
            clips: FxHashMap::default(),
        }
    }

    pub fn with_clip(mut self, take: impl Into<String>, clip: AnimationClip) -> Self {
        self.clips.insert(take.into(), Arc::new(clip));
        self
    }

    pub fn bone_count(&self) -> usize {
        self.bind_pose.len()
    }
}

/// A loaded model. Static geometry has no skinning data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub skinning: Option<Arc<SkinningData>>,
}

impl ModelData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skinning: None,
        }
    }

    pub fn with_skinning(mut self, skinning: SkinningData) -> Self {
        self.skinning = Some(Arc::new(skinning));
        self
    }
}
