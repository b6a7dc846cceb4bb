//! Content monitors and their composition root

use crate::config::MonitorConfig;
use crate::domain::{ContentKey, PackageEvent};
use crate::index::SearchIndex;
use crate::platform::SettingsPlatform;
use crate::scheduler::TaskScheduler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod accessibility_monitor;
pub mod input_device_monitor;
pub mod input_method_monitor;
pub mod package_monitor;

use accessibility_monitor::AccessibilityServiceMonitor;
use input_device_monitor::InputDeviceMonitor;
use input_method_monitor::InputMethodServiceMonitor;
use package_monitor::PackageChangeMonitor;

/// Container for the content monitor set.
///
/// Constructed once per process; this replaces per-monitor global
/// singletons with one explicit composition root. Host lifecycle hooks
/// call [`register`](Self::register) and [`unregister`](Self::unregister);
/// once registered, the monitors stay alive for the lifetime of the
/// process.
pub struct ContentMonitors {
    config: MonitorConfig,
    platform: Arc<dyn SettingsPlatform>,
    index: Arc<dyn SearchIndex>,
    package: Arc<PackageChangeMonitor>,
    accessibility: Arc<AccessibilityServiceMonitor>,
    input_method: Arc<InputMethodServiceMonitor>,
    input_device: Arc<InputDeviceMonitor>,
    package_events: mpsc::Sender<PackageEvent>,
    package_events_rx: Mutex<Option<mpsc::Receiver<PackageEvent>>>,
    started: AtomicBool,
    print_load: Mutex<Option<JoinHandle<()>>>,
}

impl ContentMonitors {
    pub fn new(
        config: MonitorConfig,
        platform: Arc<dyn SettingsPlatform>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        info!("Initializing content monitors");

        let scheduler = Arc::new(TaskScheduler::new());
        let accessibility = Arc::new(AccessibilityServiceMonitor::new());
        let input_method = Arc::new(InputMethodServiceMonitor::new());
        let input_device = Arc::new(InputDeviceMonitor::new());
        let package = Arc::new(PackageChangeMonitor::new(
            accessibility.clone(),
            input_method.clone(),
            scheduler,
            config.package_settle_delay(),
        ));

        let (package_events, package_events_rx) = mpsc::channel(config.package_event_queue);

        Self {
            config,
            platform,
            index,
            package,
            accessibility,
            input_method,
            input_device,
            package_events,
            package_events_rx: Mutex::new(Some(package_events_rx)),
            started: AtomicBool::new(false),
            print_load: Mutex::new(None),
        }
    }

    /// Host lifecycle hook. Skips everything while the user's storage is
    /// locked, since the underlying index store may be inaccessible.
    /// Otherwise initializes every monitor exactly once, starts the
    /// dedicated package-event receiver, and kicks off the asynchronous
    /// print-services load on platforms that support printing.
    pub fn register(&self) {
        if !self.platform.is_user_unlocked() {
            warn!("Skipping content monitoring because user is locked");
            return;
        }

        if !self.started.swap(true, Ordering::SeqCst) {
            self.input_device.initialize(self.index.clone());
            self.package.initialize(self.platform.clone(), self.index.clone());
            self.spawn_package_event_receiver();
        }

        if self.config.load_print_services && self.platform.has_print_support() {
            self.start_print_load();
        }
    }

    /// Cancels only the in-flight print-services load. The monitors keep
    /// running; a no-op when registration was skipped.
    pub fn unregister(&self) {
        if !self.started.load(Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.print_load.lock().unwrap().take() {
            debug!("Aborting print-services load");
            handle.abort();
        }
    }

    /// Sender the glue layer uses to deliver package lifecycle events.
    /// Events are drained by a dedicated task that stays alive while the
    /// process runs.
    pub fn package_events(&self) -> mpsc::Sender<PackageEvent> {
        self.package_events.clone()
    }

    /// Forward a content-change notification for a watched store.
    pub fn on_content_changed(&self, key: ContentKey) {
        self.input_method.on_content_changed(key);
    }

    pub fn on_input_device_added(&self, device_id: i32) {
        self.input_device.on_device_added(device_id);
    }

    pub fn on_input_device_removed(&self, device_id: i32) {
        self.input_device.on_device_removed(device_id);
    }

    pub fn on_input_device_changed(&self, device_id: i32) {
        self.input_device.on_device_changed(device_id);
    }

    pub fn package_monitor(&self) -> &Arc<PackageChangeMonitor> {
        &self.package
    }

    pub fn accessibility_monitor(&self) -> &Arc<AccessibilityServiceMonitor> {
        &self.accessibility
    }

    pub fn input_method_monitor(&self) -> &Arc<InputMethodServiceMonitor> {
        &self.input_method
    }

    pub fn input_device_monitor(&self) -> &Arc<InputDeviceMonitor> {
        &self.input_device
    }

    fn spawn_package_event_receiver(&self) {
        let Some(mut rx) = self.package_events_rx.lock().unwrap().take() else {
            return;
        };
        let package = Arc::clone(&self.package);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                package.on_package_event(&event);
            }
            debug!("Package event channel closed, receiver stopping");
        });
    }

    fn start_print_load(&self) {
        let platform = Arc::clone(&self.platform);
        let index = Arc::clone(&self.index);
        let handle = tokio::spawn(async move {
            let services = platform.installed_print_services().await;
            debug!("Loaded {} print services", services.len());
            index.update_from_source(crate::domain::SettingsScreen::PrintSettings, false, true);
        });

        // A repeated register while a load is still in flight replaces it.
        if let Some(old) = self.print_load.lock().unwrap().replace(handle) {
            old.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlatform, RecordingIndex};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn short_config() -> MonitorConfig {
        MonitorConfig {
            package_settle_delay_ms: 20,
            ..MonitorConfig::default()
        }
    }

    #[tokio::test]
    async fn locked_user_skips_monitoring_entirely() {
        let platform = Arc::new(FakePlatform::new());
        platform.set_user_unlocked(false);
        let index = Arc::new(RecordingIndex::new());
        let monitors = ContentMonitors::new(short_config(), platform, index.clone());

        monitors.register();

        assert!(index.updates().is_empty());
        // Safe no-op.
        monitors.unregister();
    }

    #[tokio::test]
    async fn register_initializes_monitors_once() {
        let platform = Arc::new(FakePlatform::new());
        let index = Arc::new(RecordingIndex::new());
        let monitors = ContentMonitors::new(short_config(), platform, index.clone());

        monitors.register();
        let first = index.updates().len();
        monitors.register();

        // Physical keyboard + accessibility + three keyboard/language screens.
        assert_eq!(first, 5);
        assert_eq!(index.updates().len(), first);
    }

    #[tokio::test]
    async fn print_services_load_updates_print_screen() {
        let platform = Arc::new(FakePlatform::new());
        platform.set_print_support(true);
        platform.set_print_services(&["com.example.cloudprint"]);
        let index = Arc::new(RecordingIndex::new());
        let monitors = ContentMonitors::new(short_config(), platform, index.clone());

        monitors.register();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let updates = index.updates_for(crate::domain::SettingsScreen::PrintSettings);
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].rebuild);
    }

    #[tokio::test]
    async fn unregister_cancels_only_the_print_load() {
        let platform = Arc::new(FakePlatform::new());
        platform.set_print_support(true);
        platform.set_print_delay(Duration::from_millis(100));
        let index = Arc::new(RecordingIndex::new());
        let monitors = ContentMonitors::new(short_config(), platform.clone(), index.clone());

        monitors.register();
        monitors.unregister();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(index
            .updates_for(crate::domain::SettingsScreen::PrintSettings)
            .is_empty());

        // The package monitors are still live after unregister.
        platform.add_accessibility_service("com.example.talkback", "TalkBackService");
        monitors.package_monitor().on_package_appeared("com.example.talkback");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(monitors.accessibility_monitor().is_tracking("com.example.talkback"));
    }
}
