//! Debounced fan-out of package lifecycle changes

use crate::domain::{PackageEvent, PackageEventKind};
use crate::index::SearchIndex;
use crate::platform::{PlatformError, SettingsPlatform};
use crate::scheduler::TaskScheduler;
use crate::services::accessibility_monitor::AccessibilityServiceMonitor;
use crate::services::input_method_monitor::InputMethodServiceMonitor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error};

/// Receives package install/uninstall/enable/disable notifications and
/// fans them out to the service monitors after a settle delay.
///
/// The delay lets the platform settle transient intermediate states
/// before the index is updated. Deferred evaluations for the same package
/// are not coalesced; each one re-queries live capability state inside
/// the service monitors, so duplicates converge.
pub struct PackageChangeMonitor {
    accessibility: Arc<AccessibilityServiceMonitor>,
    input_method: Arc<InputMethodServiceMonitor>,
    scheduler: Arc<TaskScheduler>,
    settle_delay: Duration,
    state: Mutex<Option<State>>,
}

struct State {
    platform: Arc<dyn SettingsPlatform>,
}

impl PackageChangeMonitor {
    pub(crate) fn new(
        accessibility: Arc<AccessibilityServiceMonitor>,
        input_method: Arc<InputMethodServiceMonitor>,
        scheduler: Arc<TaskScheduler>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            accessibility,
            input_method,
            scheduler,
            settle_delay,
            state: Mutex::new(None),
        }
    }

    /// Idempotent. Captures the platform handle and brings the dependent
    /// service monitors up before any package event is delivered.
    pub fn initialize(&self, platform: Arc<dyn SettingsPlatform>, index: Arc<dyn SearchIndex>) {
        let mut state = self.state.lock().unwrap();
        if state.is_some() {
            return;
        }

        self.accessibility.initialize(platform.clone(), index.clone());
        self.input_method.initialize(platform.clone(), index);

        *state = Some(State { platform });
    }

    /// Dispatch a package lifecycle event by kind.
    pub fn on_package_event(&self, event: &PackageEvent) {
        match event.kind {
            PackageEventKind::Appeared => self.on_package_appeared(&event.package),
            PackageEventKind::Disappeared => self.on_package_disappeared(&event.package),
            PackageEventKind::Modified => self.on_package_modified(&event.package),
        }
    }

    /// Installed, upgraded, or appeared with attached external storage.
    pub fn on_package_appeared(&self, package: &str) {
        self.post_available(package);
    }

    /// Uninstalled or disappeared with detached external storage.
    pub fn on_package_disappeared(&self, package: &str) {
        self.post_unavailable(package);
    }

    /// Enabled-state toggled. The current state is queried synchronously
    /// at event time; only the resulting verdict is deferred. An unknown
    /// package is logged and dropped.
    pub fn on_package_modified(&self, package: &str) {
        let verdict = {
            let guard = self.state.lock().unwrap();
            let Some(state) = guard.as_ref() else { return };
            state.platform.package_enabled_state(package)
        };

        match verdict {
            Ok(state) if state.is_available() => self.post_available(package),
            Ok(_) => self.post_unavailable(package),
            Err(PlatformError::UnknownPackage(_)) => {
                error!("Package does not exist: {}", package);
            }
        }
    }

    fn post_available(&self, package: &str) {
        debug!("Package {} available, evaluating in {:?}", package, self.settle_delay);
        let accessibility = Arc::clone(&self.accessibility);
        let input_method = Arc::clone(&self.input_method);
        let package = package.to_string();
        self.scheduler.schedule_after(self.settle_delay, move || {
            accessibility.on_package_available(&package);
            input_method.on_package_available(&package);
        });
    }

    fn post_unavailable(&self, package: &str) {
        debug!("Package {} unavailable, evaluating in {:?}", package, self.settle_delay);
        let accessibility = Arc::clone(&self.accessibility);
        let input_method = Arc::clone(&self.input_method);
        let package = package.to_string();
        self.scheduler.schedule_after(self.settle_delay, move || {
            accessibility.on_package_unavailable(&package);
            input_method.on_package_unavailable(&package);
        });
    }
}
