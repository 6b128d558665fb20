//! Capacity (HP) representations
//!
//! Older accounts store whole HP while newer ones store centi-HP. Deactivated
//! legacy positions additionally flag an unscaled value by setting the top
//! bit. Everything downstream works in canonical centi-HP.

/// Canonical units per whole HP.
pub const HP_SCALE: u64 = 100;

/// Marker bit on the stored HP of a deactivated, unscaled position.
pub const HP_HIGH_BIT: u64 = 1 << 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Already in canonical units.
    Scaled(u64),
    /// Whole HP; the account's `hp_scaled` flag is false.
    UnscaledFlagged(u64),
    /// Whole HP recovered from a high-bit-marked deactivated position.
    UnscaledMarked(u64),
}

/// Why a raw capacity could not be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// Marker bit present on an account that is still active.
    MarkerOnActive,
    /// Scaling to canonical units overflows `u64`.
    Overflow,
}

impl Capacity {
    pub fn from_raw(raw: u64, deactivated: bool, hp_scaled: bool) -> Result<Self, CapacityError> {
        let marked = raw & HP_HIGH_BIT != 0;
        match (marked, deactivated, hp_scaled) {
            (true, true, _) => Ok(Capacity::UnscaledMarked(raw & !HP_HIGH_BIT)),
            (true, false, _) => Err(CapacityError::MarkerOnActive),
            (false, _, true) => Ok(Capacity::Scaled(raw)),
            (false, _, false) => Ok(Capacity::UnscaledFlagged(raw)),
        }
    }

    pub fn canonical(self) -> Result<u64, CapacityError> {
        match self {
            Capacity::Scaled(v) => Ok(v),
            Capacity::UnscaledFlagged(v) | Capacity::UnscaledMarked(v) => {
                v.checked_mul(HP_SCALE).ok_or(CapacityError::Overflow)
            }
        }
    }

    /// Value as stored, without the marker bit.
    pub fn stored_units(self) -> u64 {
        match self {
            Capacity::Scaled(v) | Capacity::UnscaledFlagged(v) | Capacity::UnscaledMarked(v) => v,
        }
    }

    /// Bytes the ledger would hold for this capacity.
    pub fn to_raw(self) -> u64 {
        match self {
            Capacity::UnscaledMarked(v) => v | HP_HIGH_BIT,
            other => other.stored_units(),
        }
    }

    pub fn is_scaled(self) -> bool {
        matches!(self, Capacity::Scaled(_))
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Scaled(0)
    }
}

/// Display helper: canonical centi-HP as a whole-HP string with two decimals.
pub fn format_hp(canonical: u64) -> String {
    format!("{}.{:02}", canonical / HP_SCALE, canonical % HP_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unscaled_flagged_scales_by_hundred() {
        let cap = Capacity::from_raw(5, false, false).unwrap();
        assert_eq!(cap, Capacity::UnscaledFlagged(5));
        assert_eq!(cap.canonical(), Ok(500));
    }

    #[test]
    fn test_scaled_passes_through() {
        let cap = Capacity::from_raw(250, false, true).unwrap();
        assert_eq!(cap, Capacity::Scaled(250));
        assert_eq!(cap.canonical(), Ok(250));
    }

    #[test]
    fn test_marked_deactivated_strips_bit() {
        let cap = Capacity::from_raw(7 | HP_HIGH_BIT, true, true).unwrap();
        assert_eq!(cap, Capacity::UnscaledMarked(7));
        assert_eq!(cap.canonical(), Ok(700));
        assert_eq!(cap.to_raw(), 7 | HP_HIGH_BIT);
    }

    #[test]
    fn test_marker_on_active_is_rejected() {
        assert_eq!(
            Capacity::from_raw(HP_HIGH_BIT | 1, false, true),
            Err(CapacityError::MarkerOnActive)
        );
    }

    #[test]
    fn test_deactivated_without_marker_follows_flag() {
        assert_eq!(
            Capacity::from_raw(9, true, false),
            Ok(Capacity::UnscaledFlagged(9))
        );
        assert_eq!(Capacity::from_raw(9, true, true), Ok(Capacity::Scaled(9)));
    }

    #[test]
    fn test_scaling_overflow_is_error() {
        let cap = Capacity::from_raw(u64::MAX >> 1, false, false).unwrap();
        assert_eq!(cap.canonical(), Err(CapacityError::Overflow));
    }

    #[test]
    fn test_format_hp() {
        assert_eq!(format_hp(12_345), "123.45");
        assert_eq!(format_hp(7), "0.07");
    }

    proptest! {
        #[test]
        fn prop_canonical_never_below_stored(raw in 0u64..(u64::MAX / HP_SCALE), scaled in any::<bool>()) {
            let cap = Capacity::from_raw(raw, false, scaled).unwrap();
            let canonical = cap.canonical().unwrap();
            prop_assert!(canonical >= raw);
            prop_assert_eq!(cap.to_raw(), raw);
        }
    }
}
