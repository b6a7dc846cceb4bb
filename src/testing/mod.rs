//! Test doubles for the index and platform seams

use crate::domain::{EnabledState, SettingsScreen};
use crate::index::SearchIndex;
use crate::platform::{PlatformError, SettingsPlatform};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A single recorded index update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexUpdate {
    pub screen: SettingsScreen,
    pub rebuild: bool,
    pub include_in_results: bool,
}

/// Records every update the monitors push, for assertions.
#[derive(Debug, Default)]
pub struct RecordingIndex {
    updates: Mutex<Vec<IndexUpdate>>,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<IndexUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn updates_for(&self, screen: SettingsScreen) -> Vec<IndexUpdate> {
        self.updates()
            .into_iter()
            .filter(|update| update.screen == screen)
            .collect()
    }

    pub fn clear(&self) {
        self.updates.lock().unwrap().clear();
    }
}

impl SearchIndex for RecordingIndex {
    fn update_from_source(&self, screen: SettingsScreen, rebuild: bool, include_in_results: bool) {
        self.updates.lock().unwrap().push(IndexUpdate {
            screen,
            rebuild,
            include_in_results,
        });
    }
}

/// Scriptable platform double. Starts unlocked, with input-method support
/// and without print support; tests adjust what they need.
#[derive(Debug)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

#[derive(Debug)]
struct PlatformState {
    user_unlocked: bool,
    input_method_support: bool,
    print_support: bool,
    enabled_states: HashMap<String, EnabledState>,
    accessibility_services: HashMap<String, Vec<String>>,
    input_method_services: HashMap<String, Vec<String>>,
    print_services: Vec<String>,
    print_delay: Option<Duration>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            state: Mutex::new(PlatformState {
                user_unlocked: true,
                input_method_support: true,
                print_support: false,
                enabled_states: HashMap::new(),
                accessibility_services: HashMap::new(),
                input_method_services: HashMap::new(),
                print_services: Vec::new(),
                print_delay: None,
            }),
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_unlocked(&self, unlocked: bool) {
        self.state.lock().unwrap().user_unlocked = unlocked;
    }

    pub fn set_input_method_support(&self, supported: bool) {
        self.state.lock().unwrap().input_method_support = supported;
    }

    pub fn set_print_support(&self, supported: bool) {
        self.state.lock().unwrap().print_support = supported;
    }

    pub fn set_print_services(&self, services: &[&str]) {
        self.state.lock().unwrap().print_services =
            services.iter().map(|s| s.to_string()).collect();
    }

    /// Make the print-services load hang for `delay`, so tests can cancel
    /// it mid-flight.
    pub fn set_print_delay(&self, delay: Duration) {
        self.state.lock().unwrap().print_delay = Some(delay);
    }

    pub fn set_enabled_state(&self, package: &str, enabled: EnabledState) {
        self.state
            .lock()
            .unwrap()
            .enabled_states
            .insert(package.to_string(), enabled);
    }

    /// Install an accessibility service. The owning package becomes known
    /// with `Default` enabled-state unless one was set already.
    pub fn add_accessibility_service(&self, package: &str, service: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .accessibility_services
            .entry(package.to_string())
            .or_default()
            .push(service.to_string());
        state
            .enabled_states
            .entry(package.to_string())
            .or_insert(EnabledState::Default);
    }

    /// Install an input-method service, same package bookkeeping as
    /// [`add_accessibility_service`](Self::add_accessibility_service).
    pub fn add_input_method_service(&self, package: &str, service: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .input_method_services
            .entry(package.to_string())
            .or_default()
            .push(service.to_string());
        state
            .enabled_states
            .entry(package.to_string())
            .or_insert(EnabledState::Default);
    }

    /// Uninstall: the package and its services vanish from every table.
    pub fn remove_package(&self, package: &str) {
        let mut state = self.state.lock().unwrap();
        state.enabled_states.remove(package);
        state.accessibility_services.remove(package);
        state.input_method_services.remove(package);
    }
}

#[async_trait]
impl SettingsPlatform for FakePlatform {
    fn is_user_unlocked(&self) -> bool {
        self.state.lock().unwrap().user_unlocked
    }

    fn has_input_method_support(&self) -> bool {
        self.state.lock().unwrap().input_method_support
    }

    fn has_print_support(&self) -> bool {
        self.state.lock().unwrap().print_support
    }

    fn package_enabled_state(&self, package: &str) -> Result<EnabledState, PlatformError> {
        self.state
            .lock()
            .unwrap()
            .enabled_states
            .get(package)
            .copied()
            .ok_or_else(|| PlatformError::UnknownPackage(package.to_string()))
    }

    fn accessibility_services_in(&self, package: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .accessibility_services
            .get(package)
            .cloned()
            .unwrap_or_default()
    }

    fn accessibility_service_packages(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .accessibility_services
            .keys()
            .cloned()
            .collect()
    }

    fn input_method_services_in(&self, package: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .input_method_services
            .get(package)
            .cloned()
            .unwrap_or_default()
    }

    fn input_method_service_packages(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .input_method_services
            .keys()
            .cloned()
            .collect()
    }

    async fn installed_print_services(&self) -> Vec<String> {
        let (services, delay) = {
            let state = self.state.lock().unwrap();
            (state.print_services.clone(), state.print_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        services
    }
}
