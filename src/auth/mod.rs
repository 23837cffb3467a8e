//! Authentication: password hashing, session tokens and request extractors.

mod extractor;
pub mod password;
pub mod session;

use subtle::ConstantTimeEq;

pub use extractor::{AuthError, LoginRedirect, PageSession, SessionUser};
pub use password::CredentialHasher;
pub use session::{SessionError, SessionManager};

/// Compare two secret strings without leaking where they differ.
///
/// `ConstantTimeEq` returns false for unequal lengths without an early exit.
pub fn secure_compare(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
