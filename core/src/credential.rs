//! Bearer-token lookup.
//!
//! The session store belongs to the host application. The core reads a token
//! once per request through [`CredentialProvider`] and never writes back.

/// Read-only source of the caller's bearer token.
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` when the caller is anonymous.
    fn token(&self) -> Option<String>;
}

/// A fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticToken {
    fn from(token: Option<String>) -> Self {
        Self(token)
    }
}

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// No session; every request goes out unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Token from `provider` with blank values treated as absent.
pub(crate) fn bearer_token(provider: &dyn CredentialProvider) -> Option<String> {
    provider
        .token()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_are_absent() {
        assert_eq!(bearer_token(&StaticToken::new("  ")), None);
        assert_eq!(bearer_token(&StaticToken::none()), None);
        assert_eq!(bearer_token(&Anonymous), None);
    }

    #[test]
    fn closure_provider_is_read_each_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let reads = AtomicUsize::new(0);
        let provider = || {
            reads.fetch_add(1, Ordering::SeqCst);
            Some("tok".to_string())
        };
        assert_eq!(bearer_token(&provider).as_deref(), Some("tok"));
        assert_eq!(bearer_token(&provider).as_deref(), Some("tok"));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }
}
