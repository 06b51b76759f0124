use thiserror::Error;

use crate::core::CoreError;
use crate::mutate::MutationError;
use crate::store::StoreError;

/// Whether retrying this operation may succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// Retry will never help without changing inputs/state.
    Permanent,
    /// Retry may help (transient contention/outage).
    Retryable,
    /// Unknown if retry will help.
    Unknown,
}

/// What we know about side effects when an error is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Effect {
    /// Definitely no side effects occurred.
    None,
    /// Side effects definitely occurred (locally or remotely).
    Some,
    /// We don't know if side effects occurred.
    Unknown,
}

/// Configuration could not be read, parsed or written.
#[derive(Debug, Error, Clone)]
#[error("config error: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

/// Crate-level convenience error.
///
/// A thin wrapper over the capability errors; callers that care about the
/// specific failure match on the inner variant.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn transience(&self) -> Transience {
        match self {
            Error::Core(e) => e.transience(),
            Error::Store(e) => e.transience(),
            Error::Mutation(e) => e.transience(),
            Error::Config(_) => Transience::Permanent,
            Error::Io(_) => Transience::Retryable,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            Error::Core(e) => e.effect(),
            Error::Store(e) => e.effect(),
            Error::Mutation(e) => e.effect(),
            Error::Config(_) => Effect::None,
            Error::Io(_) => Effect::Unknown,
        }
    }
}
