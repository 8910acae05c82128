use crate::model::TicketStatus;
use thiserror::Error;

pub type DeskResult<T> = Result<T, DeskError>;

/// Error taxonomy of the support desk core. Store failures are surfaced
/// unchanged; everything else is produced locally before any write.
#[derive(Debug, Error)]
pub enum DeskError {
    /// One or more field constraints violated. Carries every violated
    /// field, not just the first.
    #[error("validation failed: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Full-record update attempted on a ticket whose stored status locks
    /// it.
    #[error("ticket {id} cannot be edited while {status}")]
    PermissionDenied { id: i64, status: TicketStatus },

    #[error("storage failure")]
    Store(#[from] sqlx::Error),
}

impl DeskError {
    pub fn validation(fields: Vec<&'static str>) -> Self {
        DeskError::Validation {
            fields: fields.into_iter().map(String::from).collect(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DeskError::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DeskError::NotFound { .. })
    }
}
