//! Shared Target-State Map
//!
//! Per-frame map from image identity ([`Tracked`](crate::targets::Tracked)
//! id) to the logical state the image was left in. The G-buffer stage is
//! the authoritative writer for its own outputs: after recording the pass
//! it publishes every color output as [`TargetState::ColorAttachment`] and
//! the depth image as [`TargetState::DepthAttachment`]. Downstream stages
//! (present/copy, post-processing) read the map to learn which images hold
//! valid contents this frame and update it as they consume them.
//!
//! This is bookkeeping, not synchronization — wgpu derives the actual GPU
//! dependencies from resource usage.

use rustc_hash::FxHashMap;

/// Logical state of a render target at a point in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    /// Written as a color attachment; contents valid.
    ColorAttachment,
    /// Written as a depth attachment; contents valid.
    DepthAttachment,
    /// Read as a sampled texture by a later stage.
    Sampled,
    /// Used as a copy source by a later stage.
    CopySource,
}

/// Per-frame image-identity → state map, shared across stages.
#[derive(Debug, Default)]
pub struct TargetStates {
    states: FxHashMap<u64, TargetState>,
}

impl TargetStates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state an image was left in.
    pub fn set(&mut self, id: u64, state: TargetState) {
        self.states.insert(id, state);
    }

    /// The last recorded state of an image, if any stage touched it.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<TargetState> {
        self.states.get(&id).copied()
    }

    /// Clears all entries. Called by the frame driver between frames.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrips() {
        let mut states = TargetStates::new();
        states.set(7, TargetState::ColorAttachment);

        assert_eq!(states.get(7), Some(TargetState::ColorAttachment));
        assert_eq!(states.get(8), None);
    }

    #[test]
    fn later_writes_win() {
        let mut states = TargetStates::new();
        states.set(7, TargetState::ColorAttachment);
        states.set(7, TargetState::Sampled);

        assert_eq!(states.get(7), Some(TargetState::Sampled));
    }

    #[test]
    fn reset_clears_all_entries() {
        let mut states = TargetStates::new();
        states.set(1, TargetState::DepthAttachment);
        states.set(2, TargetState::ColorAttachment);
        states.reset();

        assert!(states.is_empty());
    }
}
