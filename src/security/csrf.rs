//! CSRF protection collaborator.
//!
//! The token scheme is supplied by the embedding application. This layer only
//! carries the instance on the request context and reports at startup whether
//! protection is enabled.

/// A CSRF protection unit shared by every request.
pub trait CsrfProtection: Send + Sync + 'static {
    /// Issue a token to embed in a form.
    fn token(&self) -> String;

    /// Check a token submitted with a request.
    fn verify(&self, token: &str) -> bool;
}
