use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("blocking rule '{rule}' references unknown field '{field}'")]
    UnknownBlockingField { rule: String, field: String },

    #[error("comparison references unknown field '{0}'")]
    UnknownComparisonField(String),

    #[error("duplicate record id: {0}")]
    DuplicateRecordId(String),

    #[error("malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("candidate pair budget exceeded: generated {generated} pairs, budget {budget}")]
    PairBudgetExceeded { generated: usize, budget: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
