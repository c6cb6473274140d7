use thiserror::Error;

/// SQLSTATE raised by PostgreSQL when a row fails a CHECK constraint
pub const CHECK_VIOLATION: &str = "23514";

/// Errors returned by [`crate::db::ClientRepository`]
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backend rejected a value through one of the format constraints
    #[error("value rejected by constraint {constraint}: {message}")]
    Validation { constraint: String, message: String },

    /// The search key is not one of the recognized fields
    #[error("cannot search by '{0}', expected one of: name, surname, email, phone")]
    InvalidField(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RepositoryError::Validation { .. })
    }

    pub fn is_invalid_field(&self) -> bool {
        matches!(self, RepositoryError::InvalidField(_))
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

pub(crate) fn is_check_violation(code: Option<&str>) -> bool {
    code == Some(CHECK_VIOLATION)
}

/// Turn a CHECK violation into [`RepositoryError::Validation`], leave anything else as a database error
pub(crate) fn classify(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if is_check_violation(db_err.code().as_deref()) {
            return RepositoryError::Validation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                message: db_err.message().to_string(),
            };
        }
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_check_violation_code() {
        assert!(is_check_violation(Some("23514")));
        assert!(!is_check_violation(Some("23503")));
        assert!(!is_check_violation(None));
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        let err = classify(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
        assert!(!err.is_validation());
    }

    #[test]
    fn invalid_field_message_lists_known_keys() {
        let err = RepositoryError::InvalidField("age".into());
        assert!(err.is_invalid_field());
        assert_eq!(
            err.to_string(),
            "cannot search by 'age', expected one of: name, surname, email, phone"
        );
    }
}
