use crate::i18n::{self, Language};
use thiserror::Error;

/// Pre-flight failures of the vote form. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("fields required")]
    FieldsRequired,
    #[error("matricule out of range")]
    MatriculeOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("matricule {matricule} has already voted")]
    DuplicateVote { matricule: String },
    #[error("invalid matricule format")]
    InvalidMatricule,
    #[error("matricule is required")]
    MatriculeRequired,
    #[error("name is required")]
    NameRequired,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Fetch(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unexpected error")]
    Generic,
    #[error("vote has no identifier")]
    MissingVoteId,
    #[error("no admin token stored")]
    Unauthenticated,
    #[error("session storage error: {0}")]
    Session(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Text shown to the user in a notification or inline error field.
    pub fn localized(&self, lang: Language) -> String {
        match self {
            AppError::Validation(ValidationError::FieldsRequired) => {
                i18n::t(lang, "allFieldsRequired").to_string()
            }
            AppError::Validation(ValidationError::MatriculeOutOfRange) => {
                i18n::t(lang, "matriculeError").to_string()
            }
            AppError::DuplicateVote { matricule } => {
                format!("{} ({})", i18n::t(lang, "alreadyVoted"), matricule)
            }
            AppError::InvalidMatricule => i18n::t(lang, "invalidMatricule").to_string(),
            AppError::MatriculeRequired => i18n::t(lang, "matriculeRequired").to_string(),
            AppError::NameRequired => i18n::t(lang, "nameRequired").to_string(),
            // Backend-provided messages are shown as-is
            AppError::Auth(message) | AppError::Fetch(message) => message.clone(),
            AppError::MissingVoteId => i18n::t(lang, "invalidVoteId").to_string(),
            AppError::Unauthenticated => i18n::t(lang, "adminLogin").to_string(),
            AppError::MalformedResponse(_)
            | AppError::Generic
            | AppError::Session(_)
            | AppError::Config(_) => i18n::t(lang, "error").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_vote_message_names_the_matricule() {
        let err = AppError::DuplicateVote { matricule: "22500".to_string() };
        assert!(err.localized(Language::Fr).contains("22500"));
        assert!(err.localized(Language::Ar).contains("22500"));
        assert!(err.to_string().contains("22500"));
    }

    #[test]
    fn validation_errors_convert() {
        let err: AppError = ValidationError::MatriculeOutOfRange.into();
        assert_eq!(err, AppError::Validation(ValidationError::MatriculeOutOfRange));
        assert_eq!(
            err.localized(Language::Fr),
            "Le matricule doit être compris entre 22001 et 23119"
        );
    }

    #[test]
    fn backend_messages_pass_through() {
        let err = AppError::Auth("Invalid credentials".to_string());
        assert_eq!(err.localized(Language::Ar), "Invalid credentials");
    }
}
