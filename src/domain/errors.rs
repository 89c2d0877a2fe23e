use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The named entity (product, cart, cart item...) does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
