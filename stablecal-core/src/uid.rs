//! Stable, content-derived event identifiers.
//!
//! Every event gets a UUID v5 computed from a namespace and the event's
//! canonical url. The same url always produces the same UID, so consumers can
//! track events across exports without any stored state.

use uuid::Uuid;

/// Namespace used for all UID derivation unless configured otherwise.
///
/// Changing this value changes every derived UID.
pub const DEFAULT_NAMESPACE: Uuid = Uuid::from_u128(0xb44256d5_dee8_4dee_9fd9_31451e47984e);

/// Derive the UUID v5 of `key` under `namespace`.
pub fn derive_uid(namespace: &Uuid, key: &str) -> Uuid {
    Uuid::new_v5(namespace, key.as_bytes())
}

/// Derives UIDs under a fixed namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierDeriver {
    namespace: Uuid,
}

impl IdentifierDeriver {
    pub fn new(namespace: Uuid) -> Self {
        IdentifierDeriver { namespace }
    }

    pub fn namespace(&self) -> Uuid {
        self.namespace
    }

    /// UID for the given natural key, in lowercase hyphenated form.
    pub fn uid_for(&self, key: &str) -> String {
        derive_uid(&self.namespace, key).hyphenated().to_string()
    }
}

impl Default for IdentifierDeriver {
    fn default() -> Self {
        IdentifierDeriver::new(DEFAULT_NAMESPACE)
    }
}
