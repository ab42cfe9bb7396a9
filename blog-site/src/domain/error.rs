use thiserror::Error;

/// Failure of a blog use case. `Display` output may be shown to visitors,
/// so it never carries internal details except for `Unexpected`.
#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} is already taken")]
    AlreadyExists(String),

    #[error("only the blog admin can do that")]
    Forbidden,

    /// Login with an email no account uses.
    #[error("unknown email")]
    UnknownEmail,

    /// Login with a known email and the wrong password.
    #[error("wrong password")]
    InvalidCredentials,

    #[error("unexpected storage error: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn validation_message_names_the_field() {
        let err = DomainError::Validation {
            field: "title",
            message: "must not be empty",
        };
        assert_eq!(err.to_string(), "title must not be empty");
    }
}
