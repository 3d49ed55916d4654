use async_trait::async_trait;

/// Gate invoked before destructive or sensitive-reveal actions.
///
/// The platform-specific prompt (biometrics, device PIN) lives outside
/// this crate; the coordinator only consumes the outcome.
#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// Returns true when the user confirmed their identity.
    async fn request_confirmation(&self, reason: &str) -> bool;
}

/// Copies a labelled string to the system clipboard. Fire-and-forget.
pub trait Clipboard: Send + Sync {
    fn copy(&self, label: &str, value: &str);
}

/// Gate that confirms unconditionally, for hosts without biometrics.
pub struct AlwaysConfirm;

#[async_trait]
impl BiometricGate for AlwaysConfirm {
    async fn request_confirmation(&self, _reason: &str) -> bool {
        true
    }
}

/// Clipboard that drops everything, for headless hosts.
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _label: &str, _value: &str) {}
}
