use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for name and surname validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("{field} must be at least {min} characters long")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} must be at most {max} characters long")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("email must be a valid email: {0}")]
    InvalidFormat(String),

    #[error("email must be at most {max} characters long")]
    TooLong { max: usize, actual: usize },
}

/// Error for birthday validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BirthdayError {
    #[error("birthday must be a valid date: {0}")]
    InvalidFormat(String),

    #[error("birthday must be in the past")]
    NotInPast,
}

/// Error for plaintext password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("{field} must be at least {min} characters long")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid birthday: {0}")]
    InvalidBirthday(#[from] BirthdayError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Validation errors")]
    Validation(Vec<String>),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Email already in use: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid Refresh Token")]
    InvalidRefreshToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Incorrect old password")]
    IncorrectPassword,

    #[error("New password must differ from the old password")]
    SamePassword,

    #[error("User was modified concurrently: {0}")]
    ConcurrentModification(String),

    // Infrastructure errors
    #[error("Password hashing error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::JwtError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

