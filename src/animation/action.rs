use std::sync::Arc;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// A linear weight ramp: `from` at `elapsed == 0`, `to` at `elapsed >= duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightFade {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl WeightFade {
    #[must_use]
    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[must_use]
    pub fn is_fading_in(&self) -> bool {
        self.to > self.from
    }

    #[must_use]
    pub fn is_fading_out(&self) -> bool {
        self.to < self.from
    }
}

/// Playback state of one clip inside a mixer.
///
/// An action contributes to the pose only while it is *running*: `play()`
/// has been called, it is enabled, and it is not paused. Its contribution is
/// scaled by [`effective_weight`](Self::effective_weight), the base `weight`
/// times the active fade ramp.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    playing: bool,
    fade: Option<WeightFade>,

    pub(crate) bindings: Vec<PropertyBinding>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            playing: false,
            fade: None,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    // ========================================================================
    // Playback control (chainable)
    // ========================================================================

    /// Schedules the action in the mixer.
    pub fn play(&mut self) -> &mut Self {
        self.playing = true;
        self
    }

    /// Removes the action from the mixer and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self.reset()
    }

    /// Rewinds to time zero, re-enables, unpauses and cancels any fade.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
        self.fade = None;
        for cursor in &mut self.track_cursors {
            cursor.reset();
        }
        self
    }

    /// Ramps the effective weight from 0 to 1 over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(duration, 0.0, 1.0)
    }

    /// Ramps the effective weight from 1 to 0 over `duration` seconds. The
    /// action disables itself once the ramp completes.
    pub fn fade_out(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(duration, 1.0, 0.0)
    }

    fn schedule_fade(&mut self, duration: f32, from: f32, to: f32) -> &mut Self {
        self.fade = Some(WeightFade {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        });
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.playing
    }

    /// Scheduled, enabled and not paused.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.playing && self.enabled && !self.paused
    }

    #[must_use]
    pub fn fade(&self) -> Option<&WeightFade> {
        self.fade.as_ref()
    }

    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let ramp = self.fade.map_or(1.0, |f| f.value());
        self.weight * ramp
    }

    // ========================================================================
    // Time update
    // ========================================================================

    /// Advances the fade ramp and the local clip time by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        self.update_fade(dt);
        if !self.enabled {
            return;
        }
        self.update_time(dt);
    }

    fn update_fade(&mut self, dt: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };

        fade.elapsed += dt;
        if fade.is_finished() {
            let settled = fade.to;
            self.fade = None;
            if settled <= 0.0 {
                self.enabled = false;
            }
        }
    }

    fn update_time(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                let period = duration * 2.0;
                let t = self.time.rem_euclid(period);
                self.time = if t > duration { period - t } else { t };
            }
        }
    }
}
