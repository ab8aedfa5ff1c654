//! Authentication inputs such as login credentials and registrations.
//!
//! Constructors validate raw strings before any service talks to the remote
//! API, so a blank form never costs a round trip.

use serde::Serialize;
use thiserror::Error;
use zeroize::Zeroizing;

/// Domain error returned when authentication inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email lacks an `@` separating local part and domain.
    #[error("email must contain a local part and a domain")]
    MalformedEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Full name was missing or blank once trimmed.
    #[error("full name must not be empty")]
    EmptyFullName,
}

fn normalize_email(email: &str) -> Result<String, CredentialsValidationError> {
    let normalized = email.trim();
    if normalized.is_empty() {
        return Err(CredentialsValidationError::EmptyEmail);
    }
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(normalized.to_owned())
        }
        _ => Err(CredentialsValidationError::MalformedEmail),
    }
}

/// Validated login credentials sent to `POST /auth/login`.
///
/// ## Invariants
/// - `email` is trimmed and has a non-empty local part and domain.
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin@tatapps.id ", "secret").unwrap();
/// assert_eq!(creds.email(), "admin@tatapps.id");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the login identifier.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email(),
            "password": self.password(),
        })
    }
}

/// Validated self-registration request sent to `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    email: String,
    #[serde(serialize_with = "serialize_secret")]
    password: Zeroizing<String>,
    full_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    phone: String,
    role_id: u64,
}

fn serialize_secret<S>(value: &Zeroizing<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(value.as_str())
}

impl Registration {
    /// Validate registration fields.
    pub fn try_new(
        email: &str,
        password: &str,
        full_name: &str,
        role_id: u64,
    ) -> Result<Self, CredentialsValidationError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(CredentialsValidationError::EmptyFullName);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            full_name: full_name.to_owned(),
            phone: String::new(),
            role_id,
        })
    }

    /// Attach an optional phone number.
    pub fn with_phone(mut self, phone: &str) -> Self {
        phone.trim().clone_into(&mut self.phone);
        self
    }

    /// Email the account will log in with.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("   ", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("admin", "pw", CredentialsValidationError::MalformedEmail)]
    #[case("@tatapps.id", "pw", CredentialsValidationError::MalformedEmail)]
    #[case("admin@tatapps.id", "", CredentialsValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn login_payload_carries_trimmed_email() {
        let creds = LoginCredentials::try_from_parts("  hr@tatapps.id ", " pass ")
            .expect("valid inputs should succeed");
        let payload = creds.to_payload();
        assert_eq!(payload["email"], "hr@tatapps.id");
        assert_eq!(payload["password"], " pass ");
    }

    #[test]
    fn registration_serializes_snake_case_fields() {
        let registration = Registration::try_new("new@tatapps.id", "secret1", " Budi ", 3)
            .expect("valid registration")
            .with_phone(" 0812 ");
        let payload = serde_json::to_value(&registration).expect("serializable");
        assert_eq!(payload["full_name"], "Budi");
        assert_eq!(payload["phone"], "0812");
        assert_eq!(payload["role_id"], 3);
        assert_eq!(payload["password"], "secret1");
    }

    #[test]
    fn registration_rejects_blank_full_name() {
        let err = Registration::try_new("new@tatapps.id", "secret1", "  ", 3)
            .expect_err("blank name must fail");
        assert_eq!(err, CredentialsValidationError::EmptyFullName);
    }
}
