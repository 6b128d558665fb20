use mind_codec::DecodeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),

    /// The ledger would reject the instruction outright.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("missing dependency: {0}")]
    MissingDependency(&'static str),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type MirrorResult<T> = Result<T, MirrorError>;
