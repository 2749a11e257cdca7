//! Error taxonomy shared across the waymark crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{field} not defined")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}
