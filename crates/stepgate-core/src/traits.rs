use crate::types::AuthenticationRequirement;

// ---------------------------------------------------------------------------
// CapabilityFacts: hardware / enrollment facts
//
// Queried fresh on every evaluation. Implementations must answer
// immediately; nothing here may block or suspend.
// ---------------------------------------------------------------------------

pub trait CapabilityFacts: Send + Sync {
    /// The device has a biometric sensor or device credential at all.
    fn security_feature_present(&self) -> bool;
    /// The capability is available and the user has enrolled.
    fn available_and_enrolled(&self) -> bool;
    /// The capability is available but the user has not enrolled yet.
    fn available_but_not_set(&self) -> bool;
}

impl<T: CapabilityFacts + ?Sized> CapabilityFacts for &T {
    fn security_feature_present(&self) -> bool {
        (**self).security_feature_present()
    }

    fn available_and_enrolled(&self) -> bool {
        (**self).available_and_enrolled()
    }

    fn available_but_not_set(&self) -> bool {
        (**self).available_but_not_set()
    }
}

impl<T: CapabilityFacts + ?Sized> CapabilityFacts for std::sync::Arc<T> {
    fn security_feature_present(&self) -> bool {
        (**self).security_feature_present()
    }

    fn available_and_enrolled(&self) -> bool {
        (**self).available_and_enrolled()
    }

    fn available_but_not_set(&self) -> bool {
        (**self).available_but_not_set()
    }
}

// ---------------------------------------------------------------------------
// RequirementSource / BypassSource: deferred policy inputs
//
// Resolved at the instant of the check, at most once per evaluation. Must be
// side-effect free. Zero-argument closures implement both.
// ---------------------------------------------------------------------------

pub trait RequirementSource: Send + Sync {
    fn requirement(&self) -> AuthenticationRequirement;
}

impl<F> RequirementSource for F
where
    F: Fn() -> AuthenticationRequirement + Send + Sync,
{
    fn requirement(&self) -> AuthenticationRequirement {
        self()
    }
}

pub trait BypassSource: Send + Sync {
    fn bypass(&self) -> bool;
}

impl<F> BypassSource for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn bypass(&self) -> bool {
        self()
    }
}

// ---------------------------------------------------------------------------
// ForegroundObserver: host lifecycle notifications
// ---------------------------------------------------------------------------

/// Receives the host's "application stopped being visible" notification.
pub trait ForegroundObserver: Send + Sync {
    fn on_lost_foreground(&self);
}
