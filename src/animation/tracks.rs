use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

impl InterpolationMode {
    /// Stored values per keyframe: cubic splines carry in/out tangents.
    #[must_use]
    pub fn values_per_keyframe(self) -> usize {
        match self {
            Self::CubicSpline => 3,
            Self::Linear | Self::Step => 1,
        }
    }
}

/// How far the cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in.
///
/// Playback usually advances by less than one keyframe per frame, so the
/// next lookup almost always lands in the same or the following interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

impl KeyframeCursor {
    pub fn reset(&mut self) {
        self.last_index = 0;
    }
}

/// Keyframe times and values for one animated property.
///
/// For [`InterpolationMode::CubicSpline`] every keyframe stores three values
/// (in-tangent, value, out-tangent), so `values.len() == times.len() * 3`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Time of the last keyframe, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty() || self.values.is_empty()
    }

    /// Stateless sampling with a binary search. Returns `None` for empty tracks.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        Some(self.sample_at_frame(next_idx.saturating_sub(1), time))
    }

    /// Samples at `time`, reusing and updating `cursor`.
    ///
    /// Returns `None` for empty tracks.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let len = self.times.len();
        if len == 1 {
            return Some(self.value_at(0));
        }

        let index = self
            .scan_from_cursor(time, cursor.last_index.min(len - 1))
            .unwrap_or_else(|| {
                // Large jump (loop wrap, reset): binary search.
                self.times
                    .partition_point(|&t| t <= time)
                    .saturating_sub(1)
            });

        cursor.last_index = index;
        Some(self.sample_at_frame(index, time))
    }

    /// Short linear scan around the cursor, forward or backward.
    fn scan_from_cursor(&self, time: f32, start: usize) -> Option<usize> {
        let len = self.times.len();

        if time >= self.times[start] {
            for idx in start..=(start + MAX_SCAN_OFFSET) {
                if idx >= len - 1 {
                    return (time >= self.times[len - 1]).then_some(len - 1);
                }
                if time < self.times[idx + 1] {
                    return Some(idx);
                }
            }
            None
        } else {
            (start.saturating_sub(MAX_SCAN_OFFSET)..start)
                .rev()
                .find(|&idx| time >= self.times[idx])
        }
    }

    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next] - t0;
        let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next), t)
            }
            InterpolationMode::CubicSpline => {
                let prev = index * 3;
                let following = next * 3;
                T::interpolate_cubic(
                    self.values[prev + 1],
                    self.values[prev + 2],
                    self.values[following],
                    self.values[following + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
