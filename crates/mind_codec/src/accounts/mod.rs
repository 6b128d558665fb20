//! Typed readers, one module per ledger account kind

pub mod config;
pub mod melt;
pub mod position;
pub mod profile;
pub mod stake;

use crate::capacity::{Capacity, CapacityError};
use crate::discriminator::{check_discriminator, DISCRIMINATOR_LEN};
use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;
use crate::version::{AccountKind, VersionTable};

/// Validates the tag, resolves the version and positions a reader at the body.
pub(crate) fn open<'a, V: Copy>(
    table: &VersionTable<V>,
    data: &'a [u8],
) -> DecodeResult<(V, ByteReader<'a>)> {
    let kind = table.kind();
    let version = table.resolve(data.len())?;
    check_discriminator(kind, data)?;
    Ok((version, ByteReader::at(kind, data, DISCRIMINATOR_LEN)))
}

/// Single-layout variant of [`open`].
pub(crate) fn open_fixed(
    kind: AccountKind,
    len: usize,
    data: &[u8],
) -> DecodeResult<ByteReader<'_>> {
    if data.len() < len {
        return Err(DecodeError::TooShort {
            kind,
            got: data.len(),
            min: len,
        });
    }
    check_discriminator(kind, data)?;
    Ok(ByteReader::at(kind, data, DISCRIMINATOR_LEN))
}

/// Classifies a stored capacity and converts it to canonical units.
pub(crate) fn canonical_capacity(
    kind: AccountKind,
    field: &'static str,
    raw: u64,
    deactivated: bool,
    hp_scaled: bool,
) -> DecodeResult<(Capacity, u64)> {
    let to_decode_error = |err| match err {
        CapacityError::MarkerOnActive => DecodeError::InvalidField { kind, field },
        CapacityError::Overflow => DecodeError::ArithmeticOverflow { kind, field },
    };
    let capacity = Capacity::from_raw(raw, deactivated, hp_scaled).map_err(to_decode_error)?;
    let canonical = capacity.canonical().map_err(to_decode_error)?;
    Ok((capacity, canonical))
}
