//! # Command identifiers.
//!
//! Every issued command carries two independently generated opaque ids:
//! the request-scoped [`RequestId`] and the [`CorrelationId`] that links
//! the eventual out-of-band result back to the pending command. Both are
//! random alphanumeric strings; uniqueness against the live tables is
//! enforced by the correlator at generation time.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use rand::distr::Alphanumeric;
use rand::Rng;

const ID_LEN: usize = 30;

fn random_id() -> Arc<str> {
    let id: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect();
    Arc::from(id)
}

/// Request-scoped opaque id of an issued command.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Wraps an existing id (e.g. parsed from a wire message).
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn random() -> Self {
        Self(random_id())
    }
}

impl Borrow<str> for RequestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque id matching an asynchronous command to its later result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Wraps an existing id (e.g. extracted from a callback payload).
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn random() -> Self {
        Self(random_id())
    }
}

impl Borrow<str> for CorrelationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_have_fixed_length() {
        assert_eq!(RequestId::random().as_str().len(), ID_LEN);
        assert_eq!(CorrelationId::random().as_str().len(), ID_LEN);
    }

    #[test]
    fn test_random_ids_differ() {
        let a = CorrelationId::random();
        let b = CorrelationId::random();
        assert_ne!(a, b);
    }
}
