use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::{ActionHandle, AnimationAction, AnimationClip, AnimationMixer};
use crate::config::AnimationConfig;
use crate::errors::{Result, ViewerError};
use crate::scene::{NodeHandle, Scene};
use crate::ui::ClipPanel;

/// Maps clip names to mixer actions and switches between them with
/// cross-fades.
///
/// Built once per loaded model. After [`setup`](Self::setup) succeeds the
/// current action is always one of the mapped actions.
pub struct AnimationController {
    mixer: AnimationMixer,
    actions: FxHashMap<String, ActionHandle>,
    clip_names: Vec<String>,
    current: ActionHandle,
    current_name: String,
    fade_duration: f32,
}

impl AnimationController {
    /// Creates one action and one panel button per clip, in order, then
    /// starts `config.default_clip`.
    pub fn setup(
        root: NodeHandle,
        clips: &[Arc<AnimationClip>],
        scene: &Scene,
        panel: &mut ClipPanel,
        config: &AnimationConfig,
    ) -> Result<Self> {
        let mut mixer = AnimationMixer::new(scene, root);
        let mut actions = FxHashMap::default();
        let mut clip_names = Vec::with_capacity(clips.len());

        for clip in clips {
            log::info!("{}", clip.name);
            panel.add_button(&clip.name);

            let handle = mixer.clip_action(clip, scene);
            if actions.insert(clip.name.clone(), handle).is_some() {
                log::warn!("Duplicate clip name {:?}: the later clip wins", clip.name);
            }
            clip_names.push(clip.name.clone());
        }

        let Some(&current) = actions.get(&config.default_clip) else {
            return Err(ViewerError::DefaultClipMissing {
                name: config.default_clip.clone(),
                available: clip_names,
            });
        };
        if let Some(action) = mixer.action_mut(current) {
            action.play();
        }

        Ok(Self {
            mixer,
            actions,
            clip_names,
            current,
            current_name: config.default_clip.clone(),
            fade_duration: config.fade_duration,
        })
    }

    /// Cross-fades from the current clip to `name`.
    ///
    /// Returns `Ok(false)` when `name` is already current. An unknown name is
    /// an error and leaves everything untouched.
    pub fn change_animation(&mut self, name: &str) -> Result<bool> {
        let next = *self
            .actions
            .get(name)
            .ok_or_else(|| ViewerError::UnknownClip(name.to_string()))?;
        if next == self.current {
            return Ok(false);
        }

        let previous = self.current;
        let duration = self.fade_duration;

        // Only the outgoing and incoming clips may carry weight.
        let stale: Vec<ActionHandle> = self
            .mixer
            .actions()
            .filter(|&(h, a)| h != previous && h != next && a.is_scheduled())
            .map(|(h, _)| h)
            .collect();
        for handle in stale {
            if let Some(action) = self.mixer.action_mut(handle) {
                action.stop();
            }
        }

        if let Some(action) = self.mixer.action_mut(previous) {
            action.fade_out(duration);
        }
        if let Some(action) = self.mixer.action_mut(next) {
            action.reset().fade_in(duration).play();
        }

        log::debug!("Cross-fade {:?} -> {name:?} over {duration}s", self.current_name);
        self.current = next;
        self.current_name = name.to_string();
        Ok(true)
    }

    /// Advances the mixer by `dt` seconds and poses the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.mixer.update(dt, scene);
    }

    #[must_use]
    pub fn current_clip(&self) -> &str {
        &self.current_name
    }

    #[must_use]
    pub fn current_action(&self) -> ActionHandle {
        self.current
    }

    #[must_use]
    pub fn action_for(&self, name: &str) -> Option<ActionHandle> {
        self.actions.get(name).copied()
    }

    /// The action mapped to `name`.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.mixer.action(self.action_for(name)?)
    }

    /// Clip names in asset order, repeats included.
    #[must_use]
    pub fn clip_names(&self) -> &[String] {
        &self.clip_names
    }

    /// Number of distinct names in the mapping.
    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn fade_duration(&self) -> f32 {
        self.fade_duration
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut AnimationMixer {
        &mut self.mixer
    }
}
