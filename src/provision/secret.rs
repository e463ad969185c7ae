//! Wrapper for secrets the platform discloses only once.

use secrecy::SecretString;
use std::fmt;

/// A secret that can be taken out exactly once.
///
/// There is no `Display` impl and `Debug` never prints the value, so the
/// secret cannot end up in a log line by accident. After [`OneTimeSecret::take`]
/// the wrapper is empty.
pub struct OneTimeSecret(Option<SecretString>);

impl OneTimeSecret {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self(Some(secret))
    }

    /// A wrapper with nothing to disclose, for a platform response that
    /// omitted the secret.
    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }

    /// Move the secret out, leaving the wrapper empty.
    pub fn take(&mut self) -> Option<SecretString> {
        self.0.take()
    }

    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for OneTimeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_consumed() {
            f.write_str("OneTimeSecret(consumed)")
        } else {
            f.write_str("OneTimeSecret(***)")
        }
    }
}
