use thiserror::Error;

/// Errors returned by the identifier index. Neither variant is fatal;
/// lookups never panic and mutating operations (`add`/`remove`) never
/// return an error at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("GUID {guid} was not found")]
    GuidNotFound { guid: String },

    #[error("device ID {id} was not found")]
    DeviceIdNotFound { id: String },

    #[error("device ID {id} was not unique")]
    DeviceIdNotUnique { id: String },
}
