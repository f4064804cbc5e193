//! User-facing outcome of a submission.

use periodgrid_config::settings::MessageSettings;
use periodgrid_engine::{Status, ValidationError};
use periodgrid_protocol::{ErrorEntry, SubmitStatus};
use serde::Serialize;

/// Submission status with every error resolved to its display message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub status: SubmitStatus,
    pub errors: Vec<ErrorEntry>,
    pub message: String,
}

impl Verdict {
    pub fn from_status(status: &Status, messages: &MessageSettings) -> Self {
        let errors = status.errors();
        if status.is_valid() || errors.is_empty() {
            return Verdict {
                status: SubmitStatus::Valid,
                errors: Vec::new(),
                message: messages.valid.clone(),
            };
        }

        let message = if errors.iter().any(ValidationError::is_structural) {
            &messages.empty_grid
        } else {
            &messages.invalid_cell
        };

        Verdict {
            status: SubmitStatus::Invalid,
            errors: errors
                .iter()
                .map(|e| ErrorEntry::new(e, error_message(e, messages)))
                .collect(),
            message: message.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == SubmitStatus::Valid
    }
}

fn error_message<'a>(error: &ValidationError, messages: &'a MessageSettings) -> &'a str {
    if error.is_structural() {
        &messages.empty_grid
    } else {
        &messages.invalid_cell
    }
}
