//! Tracks packages providing accessibility services

use crate::domain::SettingsScreen;
use crate::index::SearchIndex;
use crate::platform::SettingsPlatform;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Holds the set of packages currently providing an accessibility service
/// and keeps the accessibility screen's index entries up to date.
///
/// All methods synchronize on the monitor's internal state; availability
/// callbacks may arrive from deferred evaluation tasks while another
/// thread is still initializing.
pub struct AccessibilityServiceMonitor {
    state: Mutex<Option<State>>,
}

struct State {
    platform: Arc<dyn SettingsPlatform>,
    index: Arc<dyn SearchIndex>,
    tracked: HashSet<String>,
}

impl AccessibilityServiceMonitor {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Idempotent. Rebuilds the accessibility screen, then caches the
    /// packages currently providing the capability to know when one goes
    /// away.
    pub fn initialize(&self, platform: Arc<dyn SettingsPlatform>, index: Arc<dyn SearchIndex>) {
        let mut state = self.state.lock().unwrap();
        if state.is_some() {
            return;
        }

        build_index(index.as_ref(), true);

        let tracked: HashSet<String> = platform.accessibility_service_packages().into_iter().collect();
        debug!("Tracking {} accessibility service packages", tracked.len());

        *state = Some(State {
            platform,
            index,
            tracked,
        });
    }

    /// A package became available. No-op when the package is already
    /// tracked or does not resolve the accessibility-service capability.
    pub fn on_package_available(&self, package: &str) {
        let mut guard = self.state.lock().unwrap();
        let Some(state) = guard.as_mut() else { return };

        if state.tracked.contains(package) {
            return;
        }
        if state.platform.accessibility_services_in(package).is_empty() {
            return;
        }

        state.tracked.insert(package.to_string());
        debug!("Accessibility service appeared in package {}", package);
        build_index(state.index.as_ref(), false);
    }

    /// A package went away. No-op when it was not tracked; otherwise the
    /// screen is fully rebuilt, since the index cannot delete single
    /// entries.
    pub fn on_package_unavailable(&self, package: &str) {
        let mut guard = self.state.lock().unwrap();
        let Some(state) = guard.as_mut() else { return };

        if !state.tracked.remove(package) {
            return;
        }

        debug!("Accessibility service gone from package {}", package);
        build_index(state.index.as_ref(), true);
    }

    /// Whether `package` is currently known to provide an accessibility
    /// service.
    pub fn is_tracking(&self, package: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|state| state.tracked.contains(package))
    }
}

fn build_index(index: &dyn SearchIndex, rebuild: bool) {
    index.update_from_source(SettingsScreen::Accessibility, rebuild, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlatform, RecordingIndex};
    use pretty_assertions::assert_eq;

    fn monitor() -> (AccessibilityServiceMonitor, Arc<FakePlatform>, Arc<RecordingIndex>) {
        (
            AccessibilityServiceMonitor::new(),
            Arc::new(FakePlatform::new()),
            Arc::new(RecordingIndex::new()),
        )
    }

    #[test]
    fn initialize_rebuilds_once() {
        let (monitor, platform, index) = monitor();
        platform.add_accessibility_service("com.example.talkback", "TalkBackService");

        monitor.initialize(platform.clone(), index.clone());
        monitor.initialize(platform, index.clone());

        let updates = index.updates_for(SettingsScreen::Accessibility);
        assert_eq!(updates.len(), 1);
        assert!(updates[0].rebuild);
        assert!(monitor.is_tracking("com.example.talkback"));
    }

    #[test]
    fn available_is_noop_when_already_tracked() {
        let (monitor, platform, index) = monitor();
        platform.add_accessibility_service("com.example.talkback", "TalkBackService");
        monitor.initialize(platform, index.clone());
        index.clear();

        monitor.on_package_available("com.example.talkback");

        assert!(index.updates().is_empty());
    }

    #[test]
    fn available_is_noop_without_the_capability() {
        let (monitor, platform, index) = monitor();
        monitor.initialize(platform.clone(), index.clone());
        platform.set_enabled_state("com.example.game", crate::domain::EnabledState::Enabled);
        index.clear();

        monitor.on_package_available("com.example.game");

        assert!(!monitor.is_tracking("com.example.game"));
        assert!(index.updates().is_empty());
    }

    #[test]
    fn unavailable_is_noop_when_untracked() {
        let (monitor, platform, index) = monitor();
        monitor.initialize(platform, index.clone());
        index.clear();

        monitor.on_package_unavailable("com.example.unknown");

        assert!(index.updates().is_empty());
    }

    #[test]
    fn add_then_remove_round_trips_and_ends_with_rebuild() {
        let (monitor, platform, index) = monitor();
        monitor.initialize(platform.clone(), index.clone());
        index.clear();

        platform.add_accessibility_service("com.example.talkback", "TalkBackService");
        monitor.on_package_available("com.example.talkback");
        assert!(monitor.is_tracking("com.example.talkback"));

        platform.remove_package("com.example.talkback");
        monitor.on_package_unavailable("com.example.talkback");
        assert!(!monitor.is_tracking("com.example.talkback"));

        let updates = index.updates_for(SettingsScreen::Accessibility);
        assert_eq!(updates.len(), 2);
        assert!(!updates[0].rebuild);
        assert!(updates[1].rebuild);
    }

    #[test]
    fn callbacks_before_initialize_are_dropped() {
        let (monitor, platform, index) = monitor();
        platform.add_accessibility_service("com.example.talkback", "TalkBackService");

        monitor.on_package_available("com.example.talkback");

        assert!(!monitor.is_tracking("com.example.talkback"));
        assert!(index.updates().is_empty());
    }
}
