//! Core types shared by the content monitors

use serde::{Deserialize, Serialize};

/// A logical settings screen whose entries live in the search index.
///
/// The snake_case display form is the stable source name handed to the
/// index, e.g. `SettingsScreen::AvailableVirtualKeyboard` →
/// `"available_virtual_keyboard"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SettingsScreen {
    Accessibility,
    PhysicalKeyboard,
    VirtualKeyboard,
    AvailableVirtualKeyboard,
    LanguageAndInput,
    PrintSettings,
}

/// Enabled-state of a package as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnabledState {
    /// No explicit setting; the package's manifest default applies.
    Default,
    Enabled,
    Disabled,
    DisabledUser,
    DisabledUntilUsed,
}

impl EnabledState {
    /// Whether a package in this state can still provide services.
    pub fn is_available(self) -> bool {
        matches!(self, EnabledState::Default | EnabledState::Enabled)
    }
}

/// A package lifecycle notification delivered by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEvent {
    pub kind: PackageEventKind,
    pub package: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageEventKind {
    /// Installed, upgraded, or appeared with attached external storage.
    Appeared,
    /// Uninstalled or disappeared with detached external storage.
    Disappeared,
    /// Enabled-state toggled.
    Modified,
}

impl PackageEvent {
    pub fn new(kind: PackageEventKind, package: impl Into<String>) -> Self {
        Self {
            kind,
            package: package.into(),
        }
    }
}

/// Persisted content stores the input-method monitor observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ContentKey {
    UserDictionaryWords,
    EnabledInputMethods,
}

/// A content-change subscription the glue layer should wire up.
///
/// `include_descendants` asks for notifications on sub-paths of the store
/// as well, matching how the user dictionary is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSubscription {
    pub key: ContentKey,
    pub include_descendants: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_source_names_are_stable() {
        assert_eq!(SettingsScreen::Accessibility.to_string(), "accessibility");
        assert_eq!(
            SettingsScreen::AvailableVirtualKeyboard.to_string(),
            "available_virtual_keyboard"
        );
        assert_eq!(SettingsScreen::PrintSettings.to_string(), "print_settings");
    }

    #[test]
    fn only_default_and_enabled_are_available() {
        assert!(EnabledState::Default.is_available());
        assert!(EnabledState::Enabled.is_available());
        assert!(!EnabledState::Disabled.is_available());
        assert!(!EnabledState::DisabledUser.is_available());
        assert!(!EnabledState::DisabledUntilUsed.is_available());
    }
}
