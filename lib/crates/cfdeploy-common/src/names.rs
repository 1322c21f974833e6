//! Validation of names that end up in controller resource paths.

use thiserror::Error;

/// Longest application or service name the controller accepts.
pub const MAX_NAME_LEN: usize = 255;

/// Reason a name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("{kind} name must not be empty")]
    Empty { kind: &'static str },

    #[error("{kind} name must be at most {MAX_NAME_LEN} characters")]
    TooLong { kind: &'static str },

    #[error("{kind} name '{name}' contains '{ch}'; allowed: letters, digits, '.', '_', '-'")]
    InvalidChar {
        kind: &'static str,
        name: String,
        ch: char,
    },
}

fn validate(kind: &'static str, name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty { kind });
    }
    if name.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong { kind });
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(NameError::InvalidChar {
            kind,
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Validate an application name before it is used in a request path.
pub fn validate_app_name(name: &str) -> Result<(), NameError> {
    validate("application", name)
}

/// Validate a service instance name before it is used in a request path.
pub fn validate_service_name(name: &str) -> Result<(), NameError> {
    validate("service", name)
}
