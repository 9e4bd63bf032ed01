//! TLS configuration for the REST client.
//!
//! Builds a [`rustls::ClientConfig`] trusting the Mozilla root set from
//! `webpki-roots`, optionally extended with a PEM bundle for deployments
//! behind an intercepting proxy.

use std::path::Path;

use rustls::ClientConfig;

use crate::Result;

/// Builds a [`ClientConfig`] with the bundled web PKI roots plus every
/// certificate found in `extra_ca_pem`, if given.
///
/// # Errors
///
/// Returns [`WatchError::Io`](crate::WatchError::Io) if the bundle cannot
/// be read, or [`WatchError::Tls`](crate::WatchError::Tls) if it cannot be
/// parsed or contains no usable certificate.
pub fn build_tls_config(extra_ca_pem: Option<&Path>) -> Result<ClientConfig> {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if let Some(path) = extra_ca_pem {
        let pem = std::fs::read(path).map_err(|e| {
            crate::WatchError::Io(format!("failed to read CA bundle {}: {e}", path.display()))
        })?;

        let certs: Vec<_> = rustls_pemfile::certs(&mut &pem[..])
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| crate::WatchError::Tls(format!("failed to parse CA PEM: {e}")))?;

        let (added, _ignored) = root_store.add_parsable_certificates(certs);
        if added == 0 {
            return Err(crate::WatchError::Tls(format!(
                "no usable certificate in {}",
                path.display()
            )));
        }
    }

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
