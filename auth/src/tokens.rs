use std::fmt;

use chrono::Duration;
use serde::Serialize;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// The two token families issued by [`TokenService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Access and refresh token minted together.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

/// Secrets and lifetimes for both token families.
#[derive(Clone)]
pub struct TokenSettings {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
    pub const DEFAULT_REFRESH_TTL_MINUTES: i64 = 7 * 24 * 60;
    /// Longest accepted lifetime for either kind (one year).
    pub const MAX_TTL_MINUTES: i64 = 366 * 24 * 60;

    /// Settings with the default lifetimes (15 minutes / 7 days).
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::minutes(Self::DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::minutes(Self::DEFAULT_REFRESH_TTL_MINUTES),
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Each family is signed with its own secret, so a token of one kind never
/// verifies as the other and a leaked access secret cannot mint refresh
/// tokens.
pub struct TokenService {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `settings` - Secrets and lifetimes for both token kinds
    ///
    /// # Returns
    /// Configured TokenService instance
    pub fn new(settings: TokenSettings) -> Self {
        Self {
            access: JwtHandler::new(&settings.access_secret),
            refresh: JwtHandler::new(&settings.refresh_secret),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    fn handler(&self, kind: TokenKind) -> &JwtHandler {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a token of the given kind for a subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, kind: TokenKind, subject: impl ToString) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, self.ttl(kind));
        self.handler(kind).encode(&claims)
    }

    /// Issue a short-lived access token.
    pub fn issue_access_token(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.issue(TokenKind::Access, subject)
    }

    /// Issue a long-lived refresh token.
    pub fn issue_refresh_token(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.issue(TokenKind::Refresh, subject)
    }

    /// Issue a fresh access/refresh pair for a subject.
    pub fn issue_pair(&self, subject: impl ToString) -> Result<TokenPair, JwtError> {
        let subject = subject.to_string();

        Ok(TokenPair {
            access_token: self.issue_access_token(&subject)?,
            refresh_token: self.issue_refresh_token(&subject)?,
        })
    }

    /// Verify a token against the secret of `kind` and return its subject.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature invalid (including a token of the other kind)
    /// * `TokenExpired` - Token is past its expiry
    /// * `DecodingFailed` - Token is malformed
    /// * `MissingClaim` - Token carries no subject
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<String, JwtError> {
        let claims: Claims = self.handler(kind).decode(token)?;
        claims
            .sub
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))
    }

    /// Verify an access token and return its subject.
    pub fn verify_access(&self, token: &str) -> Result<String, JwtError> {
        self.verify(token, TokenKind::Access)
    }

    /// Verify a refresh token and return its subject.
    pub fn verify_refresh(&self, token: &str) -> Result<String, JwtError> {
        self.verify(token, TokenKind::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenSettings::new(
            "access_secret_key_at_least_32_bytes!",
            "refresh_secret_key_at_least_32_bytes",
        ))
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let tokens = service();

        let token = tokens.issue_access_token("user123").unwrap();

        assert_eq!(tokens.verify_access(&token), Ok("user123".to_string()));
    }

    #[test]
    fn test_issue_and_verify_refresh_token() {
        let tokens = service();

        let token = tokens.issue_refresh_token("user123").unwrap();

        assert_eq!(tokens.verify_refresh(&token), Ok("user123".to_string()));
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let tokens = service();
        let pair = tokens.issue_pair("user123").unwrap();

        assert!(matches!(
            tokens.verify_refresh(&pair.access_token),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(
            tokens.verify_access(&pair.refresh_token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_consecutive_pairs_differ() {
        let tokens = service();

        let first = tokens.issue_pair("user123").unwrap();
        let second = tokens.issue_pair("user123").unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new(
            TokenSettings::new("access_secret_key", "refresh_secret_key")
                .with_access_ttl(Duration::seconds(-30)),
        );

        let token = tokens.issue_access_token("user123").unwrap();

        assert_eq!(tokens.verify_access(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_token_without_subject_is_rejected() {
        let handler = JwtHandler::new(b"access_secret_key_at_least_32_bytes!");
        let token = handler
            .encode(&Claims::new().with_expiration(Utc::now().timestamp() + 60))
            .unwrap();

        assert_eq!(
            service().verify_access(&token),
            Err(JwtError::MissingClaim("sub".to_string()))
        );
    }

    #[test]
    fn test_refresh_lifetime_exceeds_access_lifetime() {
        let settings = TokenSettings::new("a", "b");
        assert!(settings.refresh_ttl > settings.access_ttl);
        assert_eq!(settings.access_ttl, Duration::minutes(15));
        assert_eq!(settings.refresh_ttl, Duration::days(7));
    }
}
