use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::BirthdayError;
use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account. The plaintext password is never stored:
/// `pending_password` only carries a newly set password from the moment it is
/// assigned until the credential store hashes it on save.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: PersonName,
    pub surname: PersonName,
    pub birthday: Birthday,
    pub email: EmailAddress,
    pub password_hash: String,
    pub pending_password: Option<PlainPassword>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Replace the password; it is hashed on the next save.
    pub fn set_password(&mut self, password: PlainPassword) {
        self.pending_password = Some(password);
    }

    /// Whether the password changed since the record was loaded.
    pub fn is_password_dirty(&self) -> bool {
        self.pending_password.is_some()
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Given name or surname.
///
/// Trimmed, 2-30 characters (counted as Unicode scalar values).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 30;

    /// Create a validated name.
    ///
    /// # Arguments
    /// * `field` - Field name reported in validation messages
    /// * `value` - Raw value
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 2 characters after trimming
    /// * `TooLong` - More than 30 characters after trimming
    pub fn new(field: &'static str, value: String) -> Result<Self, NameError> {
        let value = value.trim().to_string();
        let length = value.chars().count();

        if length < Self::MIN_LENGTH {
            Err(NameError::TooShort {
                field,
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                field,
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email address type
///
/// Stored trimmed and lower-cased so uniqueness is case-insensitive.
/// Validates format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Longest address a mail path can carry (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Normalised EmailAddress value object
    ///
    /// # Errors
    /// * `TooLong` - More than 254 characters after normalisation
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = Self::normalize(&email);
        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Canonical lookup form of an email (trimmed, lower-cased).
    pub fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Date of birth, strictly before the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birthday(NaiveDate);

impl Birthday {
    /// Create a birthday checked against `today`.
    ///
    /// # Errors
    /// * `NotInPast` - Date is today or later
    pub fn new(date: NaiveDate, today: NaiveDate) -> Result<Self, BirthdayError> {
        if date < today {
            Ok(Self(date))
        } else {
            Err(BirthdayError::NotInPast)
        }
    }

    /// Parse `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC date is used).
    ///
    /// # Errors
    /// * `InvalidFormat` - Neither format matches
    /// * `NotInPast` - Date is today or later
    pub fn parse(raw: &str, today: NaiveDate) -> Result<Self, BirthdayError> {
        let raw = raw.trim();
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| {
                DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive())
            })
            .map_err(|e| BirthdayError::InvalidFormat(e.to_string()))?;

        Self::new(date, today)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Plaintext password awaiting hashing.
///
/// `Debug` is redacted so the value never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl PlainPassword {
    const MIN_LENGTH: usize = 6;

    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    pub fn new(field: &'static str, password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                field,
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword([redacted])")
    }
}

/// The refresh token currently bound to an account.
///
/// One per user: binding a new token replaces the previous one.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, refresh_token: String) -> Self {
        Self {
            user_id,
            refresh_token,
            issued_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("refresh_token", &"[redacted]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Validated fields of a registration, consumed by the credential store.
#[derive(Debug)]
pub struct NewUser {
    pub name: PersonName,
    pub surname: PersonName,
    pub birthday: Birthday,
    pub email: EmailAddress,
    pub password: PlainPassword,
}

/// Command to log in with an email and password.
///
/// The email is only normalised, not validated: an unknown or malformed
/// address must fail exactly like a wrong password.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: PlainPassword,
}

/// Command to change the password of the authenticated account.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: PlainPassword,
    pub new_password: PlainPassword,
}

/// Command to edit profile fields.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct EditProfileCommand {
    pub name: Option<PersonName>,
    pub surname: Option<PersonName>,
    pub birthday: Option<Birthday>,
}

impl EditProfileCommand {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.birthday.is_none()
    }
}

/// Outcome of register and login: the account plus its new token pair.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub tokens: TokenPair,
}
