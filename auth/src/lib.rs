//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the account service:
//! - Password hashing (Argon2id with a tunable work factor)
//! - JWT encoding and validation
//! - Access/refresh token issuing with one secret per token kind
//!
//! Services define their own persistence and session rules on top of these.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_subject("user123", Duration::minutes(5));
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub.as_deref(), Some("user123"));
//! ```
//!
//! ## Access and Refresh Tokens
//! ```
//! use auth::{TokenService, TokenSettings};
//!
//! let tokens = TokenService::new(TokenSettings::new(
//!     "access_secret_at_least_32_bytes_long",
//!     "refresh_secret_at_least_32_bytes_long",
//! ));
//!
//! let pair = tokens.issue_pair("user123").unwrap();
//! assert_eq!(tokens.verify_access(&pair.access_token).unwrap(), "user123");
//!
//! // A refresh token never passes as an access token.
//! assert!(tokens.verify_access(&pair.refresh_token).is_err());
//! ```

pub mod jwt;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use tokens::TokenKind;
pub use tokens::TokenPair;
pub use tokens::TokenService;
pub use tokens::TokenSettings;
