//! Skinned character animation.
//!
//! An [`AnimatedCharacter`] keeps a catalog of clips keyed by
//! [`AnimationClipKey`] (take name + source asset) and one
//! [`AnimationPlayer`] per registered clip. Exactly one player is active at a
//! time; the [`animation`](crate::systems::animation::animation) system
//! advances it every tick.

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::Component;
use glam::Mat4;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::skinning::{AnimationClip, ModelData, SkinningData};

/// Identifies a clip by take name and the asset it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationClipKey {
    pub take: String,
    pub source: String,
}

impl AnimationClipKey {
    pub fn new(take: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            take: take.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for AnimationClipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.take, self.source)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnimationError {
    #[error("invalid clip data for {key}: {reason}")]
    InvalidClipData {
        key: AnimationClipKey,
        reason: &'static str,
    },
    #[error("clip {key} was never registered")]
    MissingResource { key: AnimationClipKey },
}

/// Plays one clip on one skeleton.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    key: AnimationClipKey,
    skinning: Arc<SkinningData>,
    clip: Arc<AnimationClip>,
    elapsed: f32,
    keyframe: usize,
    bone_transforms: Vec<Mat4>,
    world_transforms: Vec<Mat4>,
    skin_transforms: Vec<Mat4>,
}

impl AnimationPlayer {
    pub fn new(key: AnimationClipKey, skinning: Arc<SkinningData>, clip: Arc<AnimationClip>) -> Self {
        let bones = skinning.bone_count();
        let mut player = Self {
            key,
            bone_transforms: skinning.bind_pose.clone(),
            world_transforms: vec![Mat4::IDENTITY; bones],
            skin_transforms: vec![Mat4::IDENTITY; bones],
            skinning,
            clip,
            elapsed: 0.0,
            keyframe: 0,
        };
        player.start_clip();
        player
    }

    /// Rewind to frame zero with the skeleton in its bind pose.
    pub fn start_clip(&mut self) {
        self.elapsed = 0.0;
        self.keyframe = 0;
        self.bone_transforms.copy_from_slice(&self.skinning.bind_pose);
        self.update_world_transforms();
        self.update_skin_transforms();
    }

    pub fn update(&mut self, dt: f32, looping: bool) {
        self.update_bone_transforms(self.elapsed + dt, looping);
        self.update_world_transforms();
        self.update_skin_transforms();
    }

    fn update_bone_transforms(&mut self, time: f32, looping: bool) {
        let duration = self.clip.duration;
        let time = if duration <= 0.0 {
            0.0
        } else if looping {
            time.rem_euclid(duration)
        } else {
            time.min(duration)
        };

        // Wrapped around: replay from the bind pose.
        if time < self.elapsed {
            self.keyframe = 0;
            self.bone_transforms.copy_from_slice(&self.skinning.bind_pose);
        }
        self.elapsed = time;

        let keyframes = &self.clip.keyframes;
        while let Some(keyframe) = keyframes.get(self.keyframe) {
            if keyframe.time > time {
                break;
            }
            match self.bone_transforms.get_mut(keyframe.bone) {
                Some(slot) => *slot = keyframe.transform,
                None => warn!("clip {}: keyframe for unknown bone {}", self.key, keyframe.bone),
            }
            self.keyframe += 1;
        }
    }

    fn update_world_transforms(&mut self) {
        for bone in 0..self.bone_transforms.len() {
            let local = self.bone_transforms[bone];
            self.world_transforms[bone] =
                match self.skinning.skeleton_hierarchy.get(bone).copied().flatten() {
                    Some(parent) if parent < bone => self.world_transforms[parent] * local,
                    _ => local,
                };
        }
    }

    fn update_skin_transforms(&mut self) {
        for (bone, skin) in self.skin_transforms.iter_mut().enumerate() {
            *skin = self.world_transforms[bone] * self.skinning.inverse_bind_pose[bone];
        }
    }

    pub fn key(&self) -> &AnimationClipKey {
        &self.key
    }
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
    pub fn keyframe_index(&self) -> usize {
        self.keyframe
    }
    pub fn bone_transforms(&self) -> &[Mat4] {
        &self.bone_transforms
    }
    pub fn world_transforms(&self) -> &[Mat4] {
        &self.world_transforms
    }
    pub fn skin_transforms(&self) -> &[Mat4] {
        &self.skin_transforms
    }
}

/// Clip catalog and active player of one character.
#[derive(Component, Debug, Clone)]
pub struct AnimatedCharacter {
    models: FxHashMap<AnimationClipKey, ModelData>,
    players: FxHashMap<AnimationClipKey, AnimationPlayer>,
    active: Option<AnimationClipKey>,
    looping: bool,
}

impl Default for AnimatedCharacter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AnimatedCharacter {
    pub fn new(looping: bool) -> Self {
        Self {
            models: FxHashMap::default(),
            players: FxHashMap::default(),
            active: None,
            looping,
        }
    }

    /// Register clip `take` of `model` under `(take, source)`.
    ///
    /// The first registration of a key wins; later ones are ignored.
    pub fn register_clip(
        &mut self,
        take: &str,
        source: &str,
        model: ModelData,
    ) -> Result<(), AnimationError> {
        let key = AnimationClipKey::new(take, source);
        if self.players.contains_key(&key) {
            debug!("clip {} already registered", key);
            return Ok(());
        }

        let Some(skinning) = model.skinning.clone() else {
            return Err(AnimationError::InvalidClipData {
                key,
                reason: "model has no skinning data",
            });
        };
        if skinning.inverse_bind_pose.len() != skinning.bone_count() {
            return Err(AnimationError::InvalidClipData {
                key,
                reason: "inverse bind pose does not match bind pose",
            });
        }
        if skinning.skeleton_hierarchy.len() != skinning.bone_count() {
            return Err(AnimationError::InvalidClipData {
                key,
                reason: "skeleton hierarchy does not match bind pose",
            });
        }
        let Some(clip) = skinning.clips.get(take).cloned() else {
            return Err(AnimationError::InvalidClipData {
                key,
                reason: "skinning data has no such take",
            });
        };

        debug!("registered clip {} ({} bones)", key, skinning.bone_count());
        self.players
            .insert(key.clone(), AnimationPlayer::new(key.clone(), skinning, clip));
        self.models.insert(key, model);
        Ok(())
    }

    /// Make `(take, source)` the active clip.
    ///
    /// Returns `Ok(false)` when it already is; playback continues untouched.
    /// Otherwise the clip restarts from frame zero.
    pub fn select_clip(&mut self, take: &str, source: &str) -> Result<bool, AnimationError> {
        let key = AnimationClipKey::new(take, source);
        let Some(player) = self.players.get_mut(&key) else {
            return Err(AnimationError::MissingResource { key });
        };
        if self.active.as_ref() == Some(&key) {
            return Ok(false);
        }
        player.start_clip();
        debug!("switched to clip {}", key);
        self.active = Some(key);
        Ok(true)
    }

    /// Advance the active clip by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let Some(key) = self.active.as_ref() else {
            return;
        };
        if let Some(player) = self.players.get_mut(key) {
            player.update(dt, self.looping);
        }
    }

    pub fn active_key(&self) -> Option<&AnimationClipKey> {
        self.active.as_ref()
    }

    pub fn active_player(&self) -> Option<&AnimationPlayer> {
        self.active.as_ref().and_then(|key| self.players.get(key))
    }

    /// Model the clip was registered from.
    pub fn model(&self, key: &AnimationClipKey) -> Option<&ModelData> {
        self.models.get(key)
    }

    pub fn clip_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }
}
