//! Cursor over little-endian account bytes

use crate::error::{DecodeError, DecodeResult};
use crate::version::AccountKind;
use solana_sdk::pubkey::Pubkey;

pub const PUBKEY_LEN: usize = 32;

/// Sequential reader that reports short buffers against the account kind.
pub struct ByteReader<'a> {
    kind: AccountKind,
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(kind: AccountKind, data: &'a [u8]) -> Self {
        Self::at(kind, data, 0)
    }

    pub fn at(kind: AccountKind, data: &'a [u8], offset: usize) -> Self {
        Self { kind, data, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let end = self.offset.saturating_add(N);
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(DecodeError::TooShort {
                kind: self.kind,
                got: self.data.len(),
                min: end,
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset = end;
        Ok(out)
    }

    pub fn skip(&mut self, len: usize) -> DecodeResult<()> {
        let end = self.offset.saturating_add(len);
        if end > self.data.len() {
            return Err(DecodeError::TooShort {
                kind: self.kind,
                got: self.data.len(),
                min: end,
            });
        }
        self.offset = end;
        Ok(())
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        self.take::<1>().map(|b| b[0])
    }

    pub fn read_bool(&mut self, field: &'static str) -> DecodeResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::InvalidField {
                kind: self.kind,
                field,
            }),
        }
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.take().map(u16::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        self.take().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> DecodeResult<i64> {
        self.take().map(i64::from_le_bytes)
    }

    /// Two little-endian words, `low + (high << 64)`.
    pub fn read_u128(&mut self) -> DecodeResult<u128> {
        let low = self.read_u64()? as u128;
        let high = self.read_u64()? as u128;
        Ok(low | (high << 64))
    }

    pub fn read_pubkey(&mut self) -> DecodeResult<Pubkey> {
        self.take::<PUBKEY_LEN>().map(Pubkey::new_from_array)
    }
}
