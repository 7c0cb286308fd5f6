//! Minimal user directory model.
//!
//! Accounts are owned by an external identity system. The service keeps just
//! enough of each user to resolve the notification recipient of a
//! subscription.

use std::fmt;

use super::UserId;

/// Maximum accepted login length in characters.
pub const LOGIN_MAX: usize = 50;

/// Maximum accepted email length in characters.
pub const EMAIL_MAX: usize = 254;

/// Validation errors returned when building users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("login must be at most {max} characters")]
    LoginTooLong { max: usize },
    #[error("email address must contain a local part and a domain")]
    MalformedEmail,
    #[error("email address must be at most {max} characters")]
    EmailTooLong { max: usize },
}

/// Unique account login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login(String);

impl Login {
    /// Validate and construct a login; surrounding whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyLogin);
        }
        if trimmed.chars().count() > LOGIN_MAX {
            return Err(UserValidationError::LoginTooLong { max: LOGIN_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Login {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification recipient address.
///
/// Only the shape `local@domain` is checked; deliverability is the channel's
/// concern.
///
/// # Examples
/// ```
/// use spotting::domain::EmailAddress;
///
/// let email = EmailAddress::new("ada@example.org").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.org");
/// assert!(EmailAddress::new("ada").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::MalformedEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw user fields as received from an inbound adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCandidate {
    pub login: Option<String>,
    pub email: Option<String>,
}

/// Validated user awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    login: Login,
    email: Option<EmailAddress>,
}

impl NewUser {
    pub fn new(login: Login, email: Option<EmailAddress>) -> Self {
        Self { login, email }
    }

    pub fn login(&self) -> &Login {
        &self.login
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            login: self.login,
            email: self.email,
        }
    }
}

impl TryFrom<UserCandidate> for NewUser {
    type Error = UserValidationError;

    fn try_from(candidate: UserCandidate) -> Result<Self, Self::Error> {
        let login = Login::new(candidate.login.unwrap_or_default())?;
        let email = candidate
            .email
            .filter(|raw| !raw.trim().is_empty())
            .map(EmailAddress::new)
            .transpose()?;
        Ok(Self { login, email })
    }
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    login: Login,
    email: Option<EmailAddress>,
}

impl User {
    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn login(&self) -> &Login {
        &self.login
    }

    /// Address used for sighting notifications, when the user supplied one.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }
}
