use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::animation::action::AnimationAction;
use crate::animation::binder::Binder;
use crate::animation::binding::{PropertyBinding, PropertyKey, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::values::Interpolatable;
use crate::scene::{NodeHandle, Scene};

new_key_type! {
    pub struct ActionHandle;
}

#[derive(Debug, Clone, Copy)]
enum PropertyValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

impl PropertyValue {
    fn blend(self, other: Self, t: f32) -> Self {
        match (self, other) {
            (Self::Vector3(a), Self::Vector3(b)) => Self::Vector3(a.blend(b, t)),
            (Self::Quaternion(a), Self::Quaternion(b)) => Self::Quaternion(a.blend(b, t)),
            // Slots are typed by their TargetPath, so kinds never mix.
            (lhs, _) => lhs,
        }
    }
}

/// Accumulates the weighted contributions of every running action to one
/// node property, then writes the blend back to the node.
#[derive(Debug, Clone)]
struct PropertyMixer {
    key: PropertyKey,
    /// Value captured when the first action bound to this property.
    rest: PropertyValue,
    accumulated: PropertyValue,
    cumulative_weight: f32,
}

impl PropertyMixer {
    fn accumulate(&mut self, value: PropertyValue, weight: f32) {
        if self.cumulative_weight <= 0.0 {
            self.accumulated = value;
            self.cumulative_weight = weight;
        } else {
            let total = self.cumulative_weight + weight;
            self.accumulated = self.accumulated.blend(value, weight / total);
            self.cumulative_weight = total;
        }
    }

    /// Final value, filling any missing weight with the rest pose.
    fn resolve(&self) -> PropertyValue {
        if self.cumulative_weight < 1.0 {
            self.accumulated.blend(self.rest, 1.0 - self.cumulative_weight)
        } else {
            self.accumulated
        }
    }
}

/// Plays the clips of one model.
///
/// Each clip gets at most one [`AnimationAction`]. Every frame,
/// [`update`](Self::update) advances the running actions, blends their
/// samples by effective weight, and writes the result to the scene.
pub struct AnimationMixer {
    root: NodeHandle,
    binder: Binder,
    actions: SlotMap<ActionHandle, AnimationAction>,
    properties: Vec<PropertyMixer>,
    property_index: FxHashMap<PropertyKey, usize>,
    time: f32,
}

impl AnimationMixer {
    /// Creates a mixer that animates nodes below `root`.
    #[must_use]
    pub fn new(scene: &Scene, root: NodeHandle) -> Self {
        Self {
            root,
            binder: Binder::new(scene, root),
            actions: SlotMap::with_key(),
            properties: Vec::new(),
            property_index: FxHashMap::default(),
            time: 0.0,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Total time the mixer has been advanced, in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Returns the action for `clip`, creating and binding it on first use.
    ///
    /// Tracks whose node is not part of the model are skipped.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, scene: &Scene) -> ActionHandle {
        if let Some((handle, _)) = self
            .actions
            .iter()
            .find(|(_, action)| Arc::ptr_eq(action.clip(), clip))
        {
            return handle;
        }

        let mut bindings = Vec::with_capacity(clip.tracks.len());
        for (track_index, track) in clip.tracks.iter().enumerate() {
            let Some(node) = self.binder.resolve(&track.meta.node_name) else {
                log::debug!(
                    "Clip {:?}: no node named {:?}, track skipped",
                    clip.name,
                    track.meta.node_name
                );
                continue;
            };

            let key = PropertyKey {
                node,
                target: track.meta.target,
            };
            if let Some(property) = self.property_slot(key, scene) {
                bindings.push(PropertyBinding {
                    track_index,
                    property,
                });
            }
        }

        let mut action = AnimationAction::new(Arc::clone(clip));
        action.bindings = bindings;
        self.actions.insert(action)
    }

    fn property_slot(&mut self, key: PropertyKey, scene: &Scene) -> Option<usize> {
        if let Some(&index) = self.property_index.get(&key) {
            return Some(index);
        }

        let transform = &scene.get_node(key.node)?.transform;
        let rest = match key.target {
            TargetPath::Translation => PropertyValue::Vector3(transform.position),
            TargetPath::Scale => PropertyValue::Vector3(transform.scale),
            TargetPath::Rotation => PropertyValue::Quaternion(transform.rotation),
        };

        let index = self.properties.len();
        self.properties.push(PropertyMixer {
            key,
            rest,
            accumulated: rest,
            cumulative_weight: 0.0,
        });
        self.property_index.insert(key, index);
        Some(index)
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter()
    }

    /// Actions currently contributing to the pose (running with weight > 0).
    pub fn active_actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions
            .iter()
            .filter(|(_, a)| a.is_running() && a.effective_weight() > 0.0)
    }

    pub fn stop_all(&mut self) {
        for action in self.actions.values_mut() {
            action.stop();
        }
    }

    /// Advances every running action by `dt` seconds and applies the blended
    /// pose to the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.time += dt;

        let Self {
            actions,
            properties,
            ..
        } = self;

        for property in properties.iter_mut() {
            property.cumulative_weight = 0.0;
        }

        for action in actions.values_mut() {
            if !action.is_running() {
                continue;
            }
            action.update(dt);

            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }

            let time = action.time;
            let clip = Arc::clone(action.clip());
            for binding in &action.bindings {
                let cursor = &mut action.track_cursors[binding.track_index];
                let sampled = match &clip.tracks[binding.track_index].data {
                    TrackData::Vector3(track) => {
                        track.sample_with_cursor(time, cursor).map(PropertyValue::Vector3)
                    }
                    TrackData::Quaternion(track) => {
                        track.sample_with_cursor(time, cursor).map(PropertyValue::Quaternion)
                    }
                };
                if let Some(value) = sampled {
                    properties[binding.property].accumulate(value, weight);
                }
            }
        }

        for property in properties.iter() {
            if property.cumulative_weight <= 0.0 {
                continue;
            }
            let Some(node) = scene.get_node_mut(property.key.node) else {
                continue;
            };
            let transform = &mut node.transform;
            match (property.key.target, property.resolve()) {
                (TargetPath::Translation, PropertyValue::Vector3(v)) => transform.position = v,
                (TargetPath::Scale, PropertyValue::Vector3(v)) => transform.scale = v,
                (TargetPath::Rotation, PropertyValue::Quaternion(q)) => transform.rotation = q,
                _ => {}
            }
        }
    }
}
