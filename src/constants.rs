//! Process-initialized immutable constants shared by [`BigDecimal`](crate::bigdecimal)'s
//! transcendental functions.
//!
//! Each constant is parsed once, on first use, from a fixed literal with
//! enough digits to serve any request up to [`MAX_USABLE_PRECISION`] plus
//! guard digits. They never change after initialization and are never
//! exposed as mutable.

use std::sync::OnceLock;

use crate::bigdecimal::BigDecimal;

/// Upper bound on the fractional precision `exp`/`ln`/`power` can honor.
/// Requests above this are rejected rather than silently truncated against
/// the digit budget baked into the literals below.
pub const MAX_USABLE_PRECISION: u32 = 60;

const E_DIGITS: &str =
    "2.71828182845904523536028747135266249775724709369995957496696762772407663";
const LN2_DIGITS: &str =
    "0.69314718055994530941723212145817656807550013436025525412068000949339";
const LN10_DIGITS: &str =
    "2.30258509299404568401799145468436420760110148862877297603332790096757";
const PI_DIGITS: &str =
    "3.14159265358979323846264338327950288419716939937510582097494459230781";

fn cell(lit: &str, slot: &'static OnceLock<BigDecimal>) -> BigDecimal {
    slot.get_or_init(|| lit.parse().expect("constant literal is well-formed")).clone()
}

macro_rules! constant_fn {
    ($name:ident, $lit:ident) => {
        pub fn $name() -> BigDecimal {
            static CELL: OnceLock<BigDecimal> = OnceLock::new();
            cell($lit, &CELL)
        }
    };
}

constant_fn!(e, E_DIGITS);
constant_fn!(ln2, LN2_DIGITS);
constant_fn!(ln10, LN10_DIGITS);
constant_fn!(pi, PI_DIGITS);

/// Precomputed `e^k` for `k = 1..15, 16, 32`, used by `exp`'s range
/// reduction. Built lazily from repeated squaring/multiplication of `e`
/// itself rather than from separate literals, so there is only one source
/// of truth for `e`'s digits.
pub fn e_pow_small(k: u32) -> BigDecimal {
    static TABLE: OnceLock<Vec<BigDecimal>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let e_val = e();
        let mut powers = Vec::with_capacity(34);
        let mut acc = BigDecimal::one();
        for _ in 0..32 {
            acc = acc.mul(&e_val);
            powers.push(acc.clone());
        }
        powers
    });
    match k {
        1..=16 => table[(k - 1) as usize].clone(),
        32 => table[31].clone(),
        _ => panic!("e_pow_small: k must be in 1..=16 or 32"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_parse_and_cache() {
        let a = ln2();
        let b = ln2();
        assert_eq!(a, b);
    }

    #[test]
    fn e_pow_table_matches_repeated_multiplication() {
        let e_val = e();
        assert_eq!(e_pow_small(1), e_val);
        assert_eq!(e_pow_small(2), e_val.mul(&e_val));
    }
}
