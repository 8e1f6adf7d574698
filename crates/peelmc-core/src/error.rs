use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The degree sampler drew more hops than the universe holds.
    #[error("degree {degree} exceeds the {hop_num} hops in the universe")]
    DegreeOutOfRange { degree: usize, hop_num: usize },

    /// The bit-vector capacity cannot hold the sentinel plus every hop.
    #[error("capacity {capacity} cannot hold the sentinel and {hop_num} hops")]
    CapacityTooSmall { capacity: usize, hop_num: usize },

    /// A hop index does not fit in the bit-vector.
    #[error("hop {hop} is outside capacity {capacity}")]
    HopOutOfRange { hop: usize, capacity: usize },

    /// A trial was asked to resolve more hops than the universe has.
    #[error("path length {path_length} exceeds the {hop_num} hops in the universe")]
    PathLengthOutOfRange { path_length: usize, hop_num: usize },

    /// Degree weights are empty, negative, non-finite or all zero.
    #[error("invalid degree weights: {0}")]
    InvalidWeights(String),
}

pub type Result<T> = std::result::Result<T, Error>;
