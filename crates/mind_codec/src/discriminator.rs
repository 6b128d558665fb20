//! Anchor-style 8-byte type tags

use crate::error::{DecodeError, DecodeResult};
use crate::version::AccountKind;
use solana_sdk::hash::hashv;

pub const DISCRIMINATOR_LEN: usize = 8;

/// First 8 bytes of `sha256("account:<name>")`.
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    namespaced_tag("account", name)
}

/// First 8 bytes of `sha256("event:<name>")`.
pub fn event_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    namespaced_tag("event", name)
}

fn namespaced_tag(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = hashv(&[namespace.as_bytes(), &b":"[..], name.as_bytes()]);
    let mut tag = [0u8; DISCRIMINATOR_LEN];
    tag.copy_from_slice(&hash.to_bytes()[..DISCRIMINATOR_LEN]);
    tag
}

/// Checks the leading tag of `data` against `kind`'s account discriminator.
pub fn check_discriminator(kind: AccountKind, data: &[u8]) -> DecodeResult<()> {
    let found: [u8; DISCRIMINATOR_LEN] = data
        .get(..DISCRIMINATOR_LEN)
        .and_then(|head| head.try_into().ok())
        .ok_or(DecodeError::TooShort {
            kind,
            got: data.len(),
            min: DISCRIMINATOR_LEN,
        })?;
    if found != account_discriminator(kind.type_name()) {
        return Err(DecodeError::UnknownDiscriminator { kind, found });
    }
    Ok(())
}
