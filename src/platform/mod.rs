//! Seam to the hosting platform

use crate::domain::EnabledState;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    /// Enabled-state was queried for a package the platform no longer
    /// knows about (e.g. it was uninstalled between event and query).
    #[error("package does not exist: {0}")]
    UnknownPackage(String),
}

/// Queries the content monitors need from the hosting platform.
///
/// The glue layer implements this against the real system services. It is
/// also responsible for subscribing the monitors to platform event
/// sources and feeding notifications through [`ContentMonitors`].
///
/// [`ContentMonitors`]: crate::services::ContentMonitors
#[async_trait]
pub trait SettingsPlatform: Send + Sync + 'static {
    /// Whether the current user's storage is unlocked. While locked the
    /// index store may be inaccessible and monitoring must not start.
    fn is_user_unlocked(&self) -> bool;

    fn has_input_method_support(&self) -> bool;

    fn has_print_support(&self) -> bool;

    /// Current enabled-state of `package`.
    fn package_enabled_state(&self, package: &str) -> Result<EnabledState, PlatformError>;

    /// Accessibility services resolved against `package` (possibly empty).
    fn accessibility_services_in(&self, package: &str) -> Vec<String>;

    /// Packages currently providing an accessibility service.
    fn accessibility_service_packages(&self) -> Vec<String>;

    /// Input-method services resolved against `package` (possibly empty).
    fn input_method_services_in(&self, package: &str) -> Vec<String>;

    /// Packages currently providing an input-method service.
    fn input_method_service_packages(&self) -> Vec<String>;

    /// Load the list of installed print services. Slow enough on real
    /// platforms that callers run it as a cancellable background task.
    async fn installed_print_services(&self) -> Vec<String>;
}
