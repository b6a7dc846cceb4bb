//! Tracks packages providing input-method services and the persisted
//! keyboard settings they depend on

use crate::domain::{ContentKey, ContentSubscription, SettingsScreen};
use crate::index::SearchIndex;
use crate::platform::SettingsPlatform;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Keeps three screens in sync: language-and-input (covers the user
/// dictionary) plus the two virtual-keyboard listings. Package
/// availability touches the keyboard screens; content changes are routed
/// per store.
pub struct InputMethodServiceMonitor {
    state: Mutex<Option<State>>,
}

struct State {
    platform: Arc<dyn SettingsPlatform>,
    index: Arc<dyn SearchIndex>,
    tracked: HashSet<String>,
}

impl InputMethodServiceMonitor {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Content stores this monitor wants change notifications for. The
    /// glue layer registers observers for these and forwards changes via
    /// [`on_content_changed`](Self::on_content_changed).
    pub fn subscriptions() -> [ContentSubscription; 2] {
        [
            ContentSubscription {
                key: ContentKey::UserDictionaryWords,
                include_descendants: true,
            },
            ContentSubscription {
                key: ContentKey::EnabledInputMethods,
                include_descendants: false,
            },
        ]
    }

    /// Short-circuits on platforms without input-method support;
    /// otherwise idempotent. Rebuilds all three screens and caches the
    /// packages currently providing input methods.
    pub fn initialize(&self, platform: Arc<dyn SettingsPlatform>, index: Arc<dyn SearchIndex>) {
        if !platform.has_input_method_support() {
            info!("Platform has no input-method support, skipping keyboard monitoring");
            return;
        }

        let mut state = self.state.lock().unwrap();
        if state.is_some() {
            return;
        }

        build_index(index.as_ref(), SettingsScreen::LanguageAndInput, true);
        build_index(index.as_ref(), SettingsScreen::VirtualKeyboard, true);
        build_index(index.as_ref(), SettingsScreen::AvailableVirtualKeyboard, true);

        let tracked: HashSet<String> = platform.input_method_service_packages().into_iter().collect();
        debug!("Tracking {} input-method service packages", tracked.len());

        *state = Some(State {
            platform,
            index,
            tracked,
        });
    }

    /// A package became available. No-op when already tracked or when the
    /// package provides no input-method service; otherwise both keyboard
    /// screens get an incremental update.
    pub fn on_package_available(&self, package: &str) {
        let mut guard = self.state.lock().unwrap();
        let Some(state) = guard.as_mut() else { return };

        if state.tracked.contains(package) {
            return;
        }
        if state.platform.input_method_services_in(package).is_empty() {
            return;
        }

        state.tracked.insert(package.to_string());
        debug!("Input-method service appeared in package {}", package);
        build_index(state.index.as_ref(), SettingsScreen::VirtualKeyboard, false);
        build_index(state.index.as_ref(), SettingsScreen::AvailableVirtualKeyboard, false);
    }

    /// A package went away. No-op when untracked; otherwise both keyboard
    /// screens are rebuilt.
    pub fn on_package_unavailable(&self, package: &str) {
        let mut guard = self.state.lock().unwrap();
        let Some(state) = guard.as_mut() else { return };

        if !state.tracked.remove(package) {
            return;
        }

        debug!("Input-method service gone from package {}", package);
        build_index(state.index.as_ref(), SettingsScreen::VirtualKeyboard, true);
        build_index(state.index.as_ref(), SettingsScreen::AvailableVirtualKeyboard, true);
    }

    /// A watched content store changed. Delivered synchronously by the
    /// glue layer; no debouncing at this level.
    pub fn on_content_changed(&self, key: ContentKey) {
        let guard = self.state.lock().unwrap();
        let Some(state) = guard.as_ref() else { return };

        debug!("Content store {} changed", key);
        match key {
            ContentKey::EnabledInputMethods => {
                build_index(state.index.as_ref(), SettingsScreen::VirtualKeyboard, true);
                build_index(state.index.as_ref(), SettingsScreen::AvailableVirtualKeyboard, true);
            }
            ContentKey::UserDictionaryWords => {
                build_index(state.index.as_ref(), SettingsScreen::LanguageAndInput, true);
            }
        }
    }

    /// Whether `package` is currently known to provide an input-method
    /// service.
    pub fn is_tracking(&self, package: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|state| state.tracked.contains(package))
    }
}

fn build_index(index: &dyn SearchIndex, screen: SettingsScreen, rebuild: bool) {
    index.update_from_source(screen, rebuild, true);
}
