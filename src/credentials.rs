//! API credentials kept in the OS keychain.
//!
//! At startup, [`populate_env_from_keychain`] copies the Bitfinex key
//! pair into `BFX_API_KEY` / `BFX_API_SECRET` when they are not already
//! set, so [`crate::config`] sees one source. The environment always wins.
//! Entries are created with the platform's own tools (e.g. `security
//! add-generic-password -s bfx-watch -a bitfinex_api_key` on macOS).

use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Keychain service name used for all stored credentials.
const SERVICE: &str = "bfx-watch";

/// Credential keys managed by this module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKey {
    BitfinexApiKey,
    BitfinexApiSecret,
}

impl CredentialKey {
    /// Returns the keychain entry identifier.
    pub fn keyring_id(self) -> &'static str {
        match self {
            Self::BitfinexApiKey => "bitfinex_api_key",
            Self::BitfinexApiSecret => "bitfinex_api_secret",
        }
    }

    /// Returns the environment variable read by [`crate::config`].
    pub fn env_var(self) -> &'static str {
        match self {
            Self::BitfinexApiKey => "BFX_API_KEY",
            Self::BitfinexApiSecret => "BFX_API_SECRET",
        }
    }

    /// All credential keys.
    pub const ALL: [CredentialKey; 2] = [Self::BitfinexApiKey, Self::BitfinexApiSecret];
}

/// Loads a credential from the keychain, returning `None` if not set.
fn load(key: CredentialKey) -> Option<Zeroizing<String>> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id()).ok()?;
    match entry.get_password() {
        Ok(password) => Some(Zeroizing::new(password)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key = key.keyring_id(), error = %e, "failed to read keychain entry");
            None
        }
    }
}

/// Returns the keychain value of every credential whose environment
/// variable is unset, using `in_env` and `from_keychain` as the sources.
fn missing_from_env<E, K>(in_env: E, from_keychain: K) -> Vec<(CredentialKey, Zeroizing<String>)>
where
    E: Fn(&str) -> bool,
    K: Fn(CredentialKey) -> Option<Zeroizing<String>>,
{
    CredentialKey::ALL
        .into_iter()
        .filter(|key| !in_env(key.env_var()))
        .filter_map(|key| from_keychain(key).map(|value| (key, value)))
        .collect()
}

/// Populates environment variables from the keychain for any
/// credentials not already set in the environment.
///
/// Call this at startup before [`crate::config::fetch_config`], while the
/// process is still single-threaded.
pub fn populate_env_from_keychain() {
    let in_env = |name: &str| std::env::var(name).is_ok_and(|v| !v.is_empty());
    let found = missing_from_env(in_env, load);
    for (key, value) in found {
        debug!(key = key.env_var(), "loaded credential from keychain");
        // SAFETY: called from `main` before the runtime is built.
        unsafe {
            std::env::set_var(key.env_var(), value.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_match_config_names() {
        assert_eq!(CredentialKey::BitfinexApiKey.env_var(), "BFX_API_KEY");
        assert_eq!(CredentialKey::BitfinexApiSecret.env_var(), "BFX_API_SECRET");
    }

    fn keychain_with_both(key: CredentialKey) -> Option<Zeroizing<String>> {
        Some(Zeroizing::new(format!("stored-{}", key.keyring_id())))
    }

    #[test]
    fn environment_values_win_over_keychain() {
        let found = missing_from_env(|name| name == "BFX_API_KEY", keychain_with_both);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, CredentialKey::BitfinexApiSecret);
        assert_eq!(found[0].1.as_str(), "stored-bitfinex_api_secret");
    }

    #[test]
    fn empty_keychain_fills_nothing() {
        let found = missing_from_env(|_| false, |_| None);
        assert!(found.is_empty());
    }

    #[test]
    fn fills_every_unset_credential() {
        let found = missing_from_env(|_| false, keychain_with_both);
        let keys: Vec<_> = found.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, CredentialKey::ALL.to_vec());
    }

    #[test]
    fn keyring_ids_are_distinct() {
        let [a, b] = CredentialKey::ALL;
        assert_ne!(a.keyring_id(), b.keyring_id());
    }
}
