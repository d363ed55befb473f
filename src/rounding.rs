//! Rounding-mode semantics shared across [`BigDecimal`](crate::bigdecimal::BigDecimal)
//! and [`Decimal128`](crate::decimal128::Decimal128).

use crate::biguint::{self, BigUInt};

/// How to resolve the digits a shortening operation must discard.
///
/// Applied to `(kept digits, first discarded digit, any nonzero digit after
/// it, sign)` — the pieces every decimal type's rescale path already has on
/// hand, so a single free function serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingPolicy {
    /// Toward zero: always drop the tail.
    Down,
    /// Away from zero: round up whenever anything nonzero is discarded.
    Up,
    /// Ties round away from zero; otherwise nearest.
    HalfUp,
    /// Ties round to the nearest even kept digit ("banker's rounding").
    #[default]
    HalfEven,
    /// Toward `+∞`.
    Ceiling,
    /// Toward `−∞`.
    Floor,
}

/// `true` if the kept digit sequence should be incremented (with carry) to
/// account for the discarded tail.
///
/// - `last_kept`: the least-significant digit retained, 0..=9 (used only by
///   `HalfEven` to test parity).
/// - `first_discarded`: the most significant discarded digit, 0..=9.
/// - `rest_nonzero`: whether anything after `first_discarded` is nonzero.
/// - `negative`: the sign of the value being rounded.
pub fn should_round_up(
    policy: RoundingPolicy,
    last_kept: u8,
    first_discarded: u8,
    rest_nonzero: bool,
    negative: bool,
) -> bool {
    if first_discarded == 0 && !rest_nonzero {
        return false;
    }
    match policy {
        RoundingPolicy::Down => false,
        RoundingPolicy::Up => true,
        RoundingPolicy::HalfUp => first_discarded >= 5,
        RoundingPolicy::HalfEven => {
            if first_discarded > 5 || (first_discarded == 5 && rest_nonzero) {
                true
            } else if first_discarded < 5 {
                false
            } else {
                last_kept % 2 == 1
            }
        }
        RoundingPolicy::Ceiling => !negative,
        RoundingPolicy::Floor => negative,
    }
}

/// Drop the least-significant `drop` decimal digits from `mag`, rounding
/// the kept digits under `policy`. Both decimal layers shorten a magnitude
/// the same way — align/divide/rescale all reduce to "drop `n` digits,
/// round what's left" — so this lives here instead of being copied into
/// `BigDecimal::round` and `Decimal128`'s rescale path separately.
pub(crate) fn round_drop_digits(
    mag: &BigUInt,
    drop: u32,
    policy: RoundingPolicy,
    negative: bool,
) -> BigUInt {
    if drop == 0 {
        return mag.clone();
    }
    let divisor = biguint::pow10(drop as usize);
    let (kept, remainder) = mag.divmod(&divisor).expect("pow10 is never zero");
    let (_, last_kept) = kept.divmod_small(10);
    let (first_discarded, rest) = if drop == 1 {
        let (_, d) = remainder.divmod_small(10);
        (d, BigUInt::zero())
    } else {
        let scale_down = biguint::pow10((drop - 1) as usize);
        let (hi, lo) = remainder.divmod(&scale_down).expect("scale_down is never zero");
        let (_, d) = hi.divmod_small(10);
        (d, lo)
    };
    let rest_nonzero = !rest.is_zero();
    let round_up = should_round_up(policy, last_kept as u8, first_discarded as u8, rest_nonzero, negative);
    let mut coeff = kept;
    if round_up {
        coeff.iadd(&BigUInt::one());
    }
    coeff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_even_ties_to_even_neighbor() {
        // 2.5 -> 2 (even), 3.5 -> 4 (even)
        assert!(!should_round_up(RoundingPolicy::HalfEven, 2, 5, false, false));
        assert!(should_round_up(RoundingPolicy::HalfEven, 3, 5, false, false));
    }

    #[test]
    fn half_even_residual_breaks_tie_up() {
        // 2.5001 always rounds up regardless of parity.
        assert!(should_round_up(RoundingPolicy::HalfEven, 2, 5, true, false));
    }

    #[test]
    fn down_never_rounds_up() {
        assert!(!should_round_up(RoundingPolicy::Down, 9, 9, true, false));
    }

    #[test]
    fn up_rounds_on_any_residual() {
        assert!(should_round_up(RoundingPolicy::Up, 0, 1, false, false));
    }

    #[test]
    fn ceiling_and_floor_depend_on_sign() {
        assert!(should_round_up(RoundingPolicy::Ceiling, 1, 1, false, false));
        assert!(!should_round_up(RoundingPolicy::Ceiling, 1, 1, false, true));
        assert!(should_round_up(RoundingPolicy::Floor, 1, 1, false, true));
        assert!(!should_round_up(RoundingPolicy::Floor, 1, 1, false, false));
    }

    #[test]
    fn exact_tail_never_rounds() {
        for policy in [
            RoundingPolicy::Down,
            RoundingPolicy::Up,
            RoundingPolicy::HalfUp,
            RoundingPolicy::HalfEven,
            RoundingPolicy::Ceiling,
            RoundingPolicy::Floor,
        ] {
            assert!(!should_round_up(policy, 4, 0, false, false));
            assert!(!should_round_up(policy, 4, 0, false, true));
        }
    }

    #[test]
    fn round_drop_digits_ties_to_even() {
        let n: BigUInt = "125".parse().unwrap();
        let dropped = round_drop_digits(&n, 1, RoundingPolicy::HalfEven, false);
        assert_eq!(dropped, "12".parse::<BigUInt>().unwrap());

        let n: BigUInt = "135".parse().unwrap();
        let dropped = round_drop_digits(&n, 1, RoundingPolicy::HalfEven, false);
        assert_eq!(dropped, "14".parse::<BigUInt>().unwrap());
    }

    #[test]
    fn round_drop_digits_multi_digit_residual() {
        let n: BigUInt = "1250001".parse().unwrap();
        let dropped = round_drop_digits(&n, 4, RoundingPolicy::HalfEven, false);
        // Dropping "0001": first discarded digit is 0, residual "001" is nonzero,
        // but first_discarded == 0 so the whole tail rounds down regardless.
        assert_eq!(dropped, "125".parse::<BigUInt>().unwrap());
    }

    #[test]
    fn round_drop_digits_zero_drop_is_identity() {
        let n: BigUInt = "42".parse().unwrap();
        assert_eq!(round_drop_digits(&n, 0, RoundingPolicy::HalfEven, false), n);
    }
}
