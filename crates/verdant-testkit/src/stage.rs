//! A render surface that records every marker operation.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use verdant_app::{EffectTarget, Stage};

#[derive(Default)]
struct StageState {
    markers: HashMap<String, HashSet<&'static str>>,
    attachments: HashMap<(String, &'static str), usize>,
    removals: HashMap<(String, &'static str), usize>,
    gone: HashSet<String>,
}

/// [`Stage`] that records attachments and removals for assertions.
///
/// Every target exists until [`RecordingStage::remove_target`] marks it
/// gone, which is how tests simulate a node vanishing mid-effect.
#[derive(Default)]
pub struct RecordingStage {
    state: Mutex<StageState>,
}

impl RecordingStage {
    /// Empty stage; all targets exist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the marker is currently attached.
    pub fn has_marker(&self, target: &EffectTarget, marker: &str) -> bool {
        self.state
            .lock()
            .markers
            .get(target.as_str())
            .is_some_and(|set| set.contains(marker))
    }

    /// How many times the marker was attached to the target.
    pub fn attachments(&self, target: &EffectTarget, marker: &'static str) -> usize {
        *self
            .state
            .lock()
            .attachments
            .get(&(target.as_str().to_string(), marker))
            .unwrap_or(&0)
    }

    /// How many times the marker was removed from the target.
    pub fn removals(&self, target: &EffectTarget, marker: &'static str) -> usize {
        *self
            .state
            .lock()
            .removals
            .get(&(target.as_str().to_string(), marker))
            .unwrap_or(&0)
    }

    /// Simulate the target disappearing from the render surface.
    pub fn remove_target(&self, target: &EffectTarget) {
        let mut state = self.state.lock();
        state.gone.insert(target.as_str().to_string());
        state.markers.remove(target.as_str());
    }
}

impl Stage for RecordingStage {
    fn attach(&self, target: &EffectTarget, marker: &'static str) {
        let mut state = self.state.lock();
        state
            .markers
            .entry(target.as_str().to_string())
            .or_default()
            .insert(marker);
        *state
            .attachments
            .entry((target.as_str().to_string(), marker))
            .or_insert(0) += 1;
    }

    fn remove(&self, target: &EffectTarget, marker: &'static str) {
        let mut state = self.state.lock();
        if let Some(set) = state.markers.get_mut(target.as_str()) {
            set.remove(marker);
        }
        *state
            .removals
            .entry((target.as_str().to_string(), marker))
            .or_insert(0) += 1;
    }

    fn target_exists(&self, target: &EffectTarget) -> bool {
        !self.state.lock().gone.contains(target.as_str())
    }
}
