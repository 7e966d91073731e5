//! Storage key constants.

/// Storage keys used by the goll client
pub struct StorageKeys;

impl StorageKeys {
    /// Redirect intent recorded for a guest action, consumed after login (JSON)
    pub const REDIRECT_INTENT: &'static str = "redirect_intent_after_login";

    /// Access credential carried across CLI invocations
    pub const ACCESS_TOKEN: &'static str = "access_token";
}
