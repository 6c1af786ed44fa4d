//! Property-based tests for the register-code newtypes.
//! Out-of-range input is clamped, never rejected by the clamping constructor.

#![allow(clippy::arithmetic_side_effects)]

use sgtl5000::{
    geq_code_from_db, BassLevel, DacVolume, EqGainDb, HeadphoneVolume, LineOutVolume, LrLevel,
    SurroundWidth,
};

proptest::proptest! {
    /// Band codes stay within 0x00..=0x5F for every input.
    #[test]
    fn geq_code_in_range(db: i8) {
        assert!(geq_code_from_db(db) <= 0x5F);
    }

    /// Band code grows with gain.
    #[test]
    fn geq_code_is_monotone(a: i8, b: i8) {
        if a <= b {
            assert!(geq_code_from_db(a) <= geq_code_from_db(b));
        }
    }

    /// Above -12 dB each dB is exactly four codes.
    #[test]
    fn geq_code_quarter_db_steps(db in -11i8..12) {
        let next = db.checked_add(1).unwrap();
        assert_eq!(geq_code_from_db(next) - geq_code_from_db(db), 4);
    }

    /// Every input maps to `clamp(0x2F + 4 * db, 0x00, 0x5F)` after the
    /// gain itself is clamped to -12..=+12 dB.
    #[test]
    fn geq_code_matches_clamped_formula(db: i8) {
        let gain = i32::from(db.clamp(-12, 12));
        let expected = (0x2F + 4 * gain).clamp(0x00, 0x5F);
        assert_eq!(i32::from(geq_code_from_db(db)), expected);
    }

    /// Strict and clamping constructors agree inside the range.
    #[test]
    fn eq_gain_strict_agrees_with_clamping(db in -12i8..=12) {
        assert_eq!(EqGainDb::try_new(db).unwrap(), EqGainDb::new(db));
    }

    /// Every level type clamps into its field.
    #[test]
    fn level_codes_are_clamped(code: u8) {
        assert!(HeadphoneVolume::new(code).get() <= 0x7F);
        let dac = DacVolume::new(code).get();
        assert!((0x3C..=0xF0).contains(&dac));
        assert!(LineOutVolume::new(code).get() <= 0x1F);
        assert!(BassLevel::new(code).get() <= 0x7F);
        assert!(LrLevel::new(code).get() <= 0x3F);
        assert!(SurroundWidth::new(code).get() <= 7);
    }

    /// `try_new` fails exactly when `new` would have changed the value.
    #[test]
    fn try_new_fails_iff_clamped(code: u8) {
        assert_eq!(DacVolume::try_new(code).is_ok(), DacVolume::new(code).get() == code);
        assert_eq!(LrLevel::try_new(code).is_ok(), LrLevel::new(code).get() == code);
    }
}

#[test]
fn geq_code_bottom_step_is_clamped() {
    // 0x2F - 48 is -1, which clamps to 0x00
    assert_eq!(geq_code_from_db(-12), 0x00);
    assert_eq!(geq_code_from_db(-11), 0x03);
    assert_eq!(geq_code_from_db(-11) - geq_code_from_db(-12), 3);
}
