//! Melt program events recovered from transaction log lines
//!
//! Events are emitted as `Program data: <base64>` where the decoded payload
//! is an 8-byte event tag followed by positional fields.

use crate::discriminator::{event_discriminator, DISCRIMINATOR_LEN};
use crate::reader::PUBKEY_LEN;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const PROGRAM_DATA_PREFIX: &str = "Program data: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeltEvent {
    FundingRecorded {
        amount: u64,
        vial: u64,
    },
    RoundStarted {
        seq: u64,
        start_ts: i64,
        end_ts: i64,
        pot: u64,
        v_pay: u64,
    },
    Burned {
        user: Pubkey,
        /// Round account address.
        round: Pubkey,
        amount: u64,
        total_burn: u64,
    },
    Finalized {
        seq: u64,
        rollover: u64,
    },
    Claimed {
        user: Pubkey,
        round: Pubkey,
        payout: u64,
    },
}

#[derive(Clone, Copy)]
enum EventTag {
    FundingRecorded,
    RoundStarted,
    Burned,
    Finalized,
    Claimed,
}

impl EventTag {
    const ALL: [EventTag; 5] = [
        EventTag::FundingRecorded,
        EventTag::RoundStarted,
        EventTag::Burned,
        EventTag::Finalized,
        EventTag::Claimed,
    ];

    fn name(self) -> &'static str {
        match self {
            EventTag::FundingRecorded => "FundingRecorded",
            EventTag::RoundStarted => "RoundStarted",
            EventTag::Burned => "Burned",
            EventTag::Finalized => "Finalized",
            EventTag::Claimed => "Claimed",
        }
    }
}

fn tag_table() -> &'static [([u8; DISCRIMINATOR_LEN], EventTag); 5] {
    static TABLE: OnceLock<[([u8; DISCRIMINATOR_LEN], EventTag); 5]> = OnceLock::new();
    TABLE.get_or_init(|| EventTag::ALL.map(|tag| (event_discriminator(tag.name()), tag)))
}

impl MeltEvent {
    pub fn name(&self) -> &'static str {
        self.tag().name()
    }

    fn tag(&self) -> EventTag {
        match self {
            MeltEvent::FundingRecorded { .. } => EventTag::FundingRecorded,
            MeltEvent::RoundStarted { .. } => EventTag::RoundStarted,
            MeltEvent::Burned { .. } => EventTag::Burned,
            MeltEvent::Finalized { .. } => EventTag::Finalized,
            MeltEvent::Claimed { .. } => EventTag::Claimed,
        }
    }

    /// Decodes a raw event payload (tag included).
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let (head, body) = payload.split_first_chunk::<DISCRIMINATOR_LEN>()?;
        let tag = tag_table()
            .iter()
            .find(|(disc, _)| disc == head)
            .map(|(_, tag)| *tag)?;
        let mut f = Fields(body);
        let event = match tag {
            EventTag::FundingRecorded => MeltEvent::FundingRecorded {
                amount: f.u64()?,
                vial: f.u64()?,
            },
            EventTag::RoundStarted => MeltEvent::RoundStarted {
                seq: f.u64()?,
                start_ts: f.i64()?,
                end_ts: f.i64()?,
                pot: f.u64()?,
                v_pay: f.u64()?,
            },
            EventTag::Burned => MeltEvent::Burned {
                user: f.pubkey()?,
                round: f.pubkey()?,
                amount: f.u64()?,
                total_burn: f.u64()?,
            },
            EventTag::Finalized => MeltEvent::Finalized {
                seq: f.u64()?,
                rollover: f.u64()?,
            },
            EventTag::Claimed => MeltEvent::Claimed {
                user: f.pubkey()?,
                round: f.pubkey()?,
                payout: f.u64()?,
            },
        };
        Some(event)
    }

    /// Payload bytes as the program would emit them.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = event_discriminator(self.name()).to_vec();
        match self {
            MeltEvent::FundingRecorded { amount, vial } => {
                out.extend_from_slice(&amount.to_le_bytes());
                out.extend_from_slice(&vial.to_le_bytes());
            }
            MeltEvent::RoundStarted {
                seq,
                start_ts,
                end_ts,
                pot,
                v_pay,
            } => {
                out.extend_from_slice(&seq.to_le_bytes());
                out.extend_from_slice(&start_ts.to_le_bytes());
                out.extend_from_slice(&end_ts.to_le_bytes());
                out.extend_from_slice(&pot.to_le_bytes());
                out.extend_from_slice(&v_pay.to_le_bytes());
            }
            MeltEvent::Burned {
                user,
                round,
                amount,
                total_burn,
            } => {
                out.extend_from_slice(user.as_ref());
                out.extend_from_slice(round.as_ref());
                out.extend_from_slice(&amount.to_le_bytes());
                out.extend_from_slice(&total_burn.to_le_bytes());
            }
            MeltEvent::Finalized { seq, rollover } => {
                out.extend_from_slice(&seq.to_le_bytes());
                out.extend_from_slice(&rollover.to_le_bytes());
            }
            MeltEvent::Claimed {
                user,
                round,
                payout,
            } => {
                out.extend_from_slice(user.as_ref());
                out.extend_from_slice(round.as_ref());
                out.extend_from_slice(&payout.to_le_bytes());
            }
        }
        out
    }

    /// Full log line, `Program data: ` prefix included.
    pub fn to_log_line(&self) -> String {
        format!("{PROGRAM_DATA_PREFIX}{}", STANDARD.encode(self.to_payload()))
    }
}

struct Fields<'a>(&'a [u8]);

impl Fields<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, rest) = self.0.split_first_chunk::<N>()?;
        self.0 = rest;
        Some(*head)
    }

    fn u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn i64(&mut self) -> Option<i64> {
        self.take().map(i64::from_le_bytes)
    }

    fn pubkey(&mut self) -> Option<Pubkey> {
        self.take::<PUBKEY_LEN>().map(Pubkey::new_from_array)
    }
}

/// Parses one log line. Lines that are not melt events yield `None`.
pub fn parse_log_line(line: &str) -> Option<MeltEvent> {
    let encoded = line.strip_prefix(PROGRAM_DATA_PREFIX)?;
    let payload = STANDARD.decode(encoded.trim()).ok()?;
    MeltEvent::from_payload(&payload)
}

pub fn parse_logs<I, S>(lines: I) -> Vec<MeltEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| parse_log_line(line.as_ref()))
        .collect()
}
