#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("session storage is unavailable")]
    Unavailable,
    #[error("session storage rejected `{key}`: {reason}")]
    Rejected { key: String, reason: String },
}

/// Tab-scoped key/value store (the browser's `sessionStorage`).
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
