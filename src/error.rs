/// Why a weight or probability vector cannot back an alias table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbError {
    #[error("weights slice is empty")]
    Empty,
    #[error("weights contain a negative value at index {index}: {value}")]
    Negative { index: usize, value: f64 },
    #[error("weights contain a non-finite value at index {index}: {value}")]
    NonFinite { index: usize, value: f64 },
    #[error("sum of weights is zero")]
    ZeroSum,
    #[error("probabilities sum to {sum}, expected 1.0")]
    NotNormalized { sum: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node or edge distribution could not be turned into an alias table.
    #[error("invalid transition distribution for {context}: {source}")]
    InvalidDistribution {
        context: String,
        #[source]
        source: ProbError,
    },
    /// A start node or edge key that the transition model has no table for.
    #[error("unknown node or edge: {0}")]
    UnknownNode(String),
    #[error("node {0} has no neighbors")]
    DisconnectedNode(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn distribution(context: impl Into<String>, source: ProbError) -> Self {
        Error::InvalidDistribution {
            context: context.into(),
            source,
        }
    }
}
