/// Errors surfaced by store and import operations.
///
/// Malformed records inside an otherwise valid payload are never errors; they
/// are dropped during normalization. Only an explicit import of a payload that
/// is not a record array reports `InvalidPayload` back to its caller.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("registry io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
