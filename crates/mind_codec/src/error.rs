use crate::version::AccountKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{kind} account too short: got {got} bytes, need at least {min}")]
    TooShort {
        kind: AccountKind,
        got: usize,
        min: usize,
    },

    #[error("{kind} account has unexpected discriminator {found:02x?}")]
    UnknownDiscriminator { kind: AccountKind, found: [u8; 8] },

    #[error("{kind} account has invalid {field}")]
    InvalidField {
        kind: AccountKind,
        field: &'static str,
    },

    #[error("{kind} account {field} overflows its canonical unit")]
    ArithmeticOverflow {
        kind: AccountKind,
        field: &'static str,
    },
}

impl DecodeError {
    pub fn kind(&self) -> AccountKind {
        match self {
            DecodeError::TooShort { kind, .. }
            | DecodeError::UnknownDiscriminator { kind, .. }
            | DecodeError::InvalidField { kind, .. }
            | DecodeError::ArithmeticOverflow { kind, .. } => *kind,
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
