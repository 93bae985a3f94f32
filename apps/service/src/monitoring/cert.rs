use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;
use x509_parser::prelude::*;

/// Decode the notAfter timestamp from a DER-encoded peer certificate.
/// A decode failure is logged and reported as `None`; it must never fail
/// the check itself.
pub fn not_after(der: &[u8], url: &str) -> Option<DateTime<Utc>> {
    match X509Certificate::from_der(der) {
        Ok((_, cert)) => Utc.timestamp_opt(cert.validity().not_after.timestamp(), 0).single(),
        Err(err) => {
            warn!("couldn't parse certificate expiry for {url}: {err}");
            None
        }
    }
}
