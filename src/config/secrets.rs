//! Secret handling utilities.
//!
//! Re-exports secrecy types and renders bearer headers without ever
//! formatting the secret through `Debug`.

pub use secrecy::{ExposeSecret, SecretString};

/// `Authorization` header value for a bearer token.
pub fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}
