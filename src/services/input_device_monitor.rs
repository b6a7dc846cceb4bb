//! Watches input-device hotplug to keep the physical-keyboard screen fresh

use crate::domain::SettingsScreen;
use crate::index::SearchIndex;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Updates the physical-keyboard screen on device hotplug. An added
/// device only extends the listing; removal or change can affect keyboard
/// identity and layout, so those trigger a full rebuild.
pub struct InputDeviceMonitor {
    index: Mutex<Option<Arc<dyn SearchIndex>>>,
}

impl InputDeviceMonitor {
    pub(crate) fn new() -> Self {
        Self {
            index: Mutex::new(None),
        }
    }

    /// Idempotent. Performs the initial full rebuild of the
    /// physical-keyboard screen.
    pub fn initialize(&self, index: Arc<dyn SearchIndex>) {
        let mut guard = self.index.lock().unwrap();
        if guard.is_some() {
            return;
        }
        build_index(index.as_ref(), true);
        *guard = Some(index);
    }

    pub fn on_device_added(&self, device_id: i32) {
        trace!("Input device {} added", device_id);
        self.update(false);
    }

    pub fn on_device_removed(&self, device_id: i32) {
        trace!("Input device {} removed", device_id);
        self.update(true);
    }

    pub fn on_device_changed(&self, device_id: i32) {
        trace!("Input device {} changed", device_id);
        self.update(true);
    }

    fn update(&self, rebuild: bool) {
        let guard = self.index.lock().unwrap();
        if let Some(index) = guard.as_ref() {
            build_index(index.as_ref(), rebuild);
        }
    }
}

fn build_index(index: &dyn SearchIndex, rebuild: bool) {
    index.update_from_source(SettingsScreen::PhysicalKeyboard, rebuild, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingIndex;
    use pretty_assertions::assert_eq;

    #[test]
    fn initialize_rebuilds_once() {
        let monitor = InputDeviceMonitor::new();
        let index = Arc::new(RecordingIndex::new());

        monitor.initialize(index.clone());
        monitor.initialize(index.clone());

        let updates = index.updates_for(SettingsScreen::PhysicalKeyboard);
        assert_eq!(updates.len(), 1);
        assert!(updates[0].rebuild);
    }

    #[test]
    fn added_is_incremental_removed_and_changed_rebuild() {
        let monitor = InputDeviceMonitor::new();
        let index = Arc::new(RecordingIndex::new());
        monitor.initialize(index.clone());
        index.clear();

        monitor.on_device_added(7);
        monitor.on_device_removed(7);
        monitor.on_device_changed(3);

        let updates = index.updates_for(SettingsScreen::PhysicalKeyboard);
        assert_eq!(updates.len(), 3);
        assert!(!updates[0].rebuild);
        assert!(updates[1].rebuild);
        assert!(updates[2].rebuild);
    }

    #[test]
    fn events_before_initialize_are_dropped() {
        let monitor = InputDeviceMonitor::new();
        let index = Arc::new(RecordingIndex::new());

        monitor.on_device_added(1);

        assert!(index.updates().is_empty());
    }
}
