//! Fixed-width 96-bit-coefficient decimal: scale `0..=28`, for financial
//! hot paths where `BigDecimal`'s heap-allocated coefficient is overkill.
//!
//! The wire representation packs `low`/`mid`/`high: u32` (a 96-bit unsigned
//! coefficient) plus a `flags: u32` word — sign in bit 31, scale in bits
//! 16..23 — the same layout `rust_decimal` and the BSON/MongoDB
//! `Decimal128` readers use. The arithmetic itself doesn't reimplement a
//! second wide-multiply path: operands are lifted to [`BigInt`], combined
//! exactly, and the result is packed back down through [`finish`], which
//! is the one place overflow and rounding-on-shorten are decided. This
//! matches spec's own flow description — "arithmetic lowers to
//! BigInt/BigUInt on limb arrays" — for both decimal layers, not just
//! `BigDecimal`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::bigint::BigInt;
use crate::biguint::{self, BigUInt};
use crate::error::{DecimalError, DecimalResult};
use crate::rounding::{round_drop_digits, RoundingPolicy};

/// Maximum count of significant decimal digits a coefficient can carry.
pub const MAX_NUM_DIGITS: u32 = 29;
/// Maximum supported scale (digits to the right of the decimal point).
pub const MAX_SCALE: u32 = 28;
/// Largest representable coefficient: `2^96 - 1`.
pub const MAX_COEF: u128 = (1u128 << 96) - 1;

const SIGN_MASK: u32 = 0x8000_0000;
const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0x00FF_0000;

/// A 128-bit packed fixed-point decimal: 96-bit unsigned coefficient, a
/// sign bit, and a scale in `0..=28`. `value = (-1)^sign * coefficient *
/// 10^(-scale)`. Canonical zero never carries the sign bit.
#[derive(Clone, Copy, Debug)]
pub struct Decimal128 {
    low: u32,
    mid: u32,
    high: u32,
    flags: u32,
}

fn pow10_bigint(n: u32) -> BigInt {
    BigInt::from_biguint(biguint::pow10(n as usize), false)
}

impl Decimal128 {
    pub fn zero() -> Self {
        Decimal128 { low: 0, mid: 0, high: 0, flags: 0 }
    }

    pub fn one() -> Self {
        Decimal128 { low: 1, mid: 0, high: 0, flags: 0 }
    }

    /// Assemble a value directly from its coefficient/scale/sign. Fails
    /// with [`DecimalError::Overflow`] if `coef` exceeds [`MAX_COEF`] or
    /// `scale` exceeds [`MAX_SCALE`].
    pub fn from_parts(coef: u128, scale: u32, negative: bool) -> DecimalResult<Self> {
        if coef > MAX_COEF {
            return Err(DecimalError::Overflow("Decimal128::from_parts"));
        }
        if scale > MAX_SCALE {
            return Err(DecimalError::Overflow("Decimal128::from_parts"));
        }
        let negative = negative && coef != 0;
        let flags = (scale << SCALE_SHIFT) | if negative { SIGN_MASK } else { 0 };
        Ok(Decimal128 {
            low: coef as u32,
            mid: (coef >> 32) as u32,
            high: (coef >> 64) as u32,
            flags,
        })
    }

    pub fn from_i64(v: i64) -> Self {
        let negative = v < 0;
        let mag = (v as i128).unsigned_abs();
        Decimal128::from_parts(mag, 0, negative).expect("i64 magnitude always fits in 96 bits")
    }

    pub fn from_i128(v: i128) -> DecimalResult<Self> {
        let negative = v < 0;
        let mag = v.unsigned_abs();
        if mag > MAX_COEF {
            return Err(DecimalError::Overflow("Decimal128::from_i128"));
        }
        Decimal128::from_parts(mag, 0, negative)
    }

    pub fn scale(&self) -> u32 {
        (self.flags & SCALE_MASK) >> SCALE_SHIFT
    }

    pub fn is_negative(&self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    pub fn is_zero(&self) -> bool {
        self.low == 0 && self.mid == 0 && self.high == 0
    }

    pub fn coefficient(&self) -> u128 {
        (self.low as u128) | ((self.mid as u128) << 32) | ((self.high as u128) << 64)
    }

    pub fn abs(&self) -> Self {
        Decimal128 { flags: self.flags & !SIGN_MASK, ..*self }
    }

    pub fn neg(&self) -> Self {
        if self.is_zero() {
            return *self;
        }
        Decimal128 { flags: self.flags ^ SIGN_MASK, ..*self }
    }

    fn magnitude(&self) -> BigUInt {
        BigUInt::from_u128(self.coefficient())
    }

    fn to_bigint(&self) -> BigInt {
        BigInt::from_biguint(self.magnitude(), self.is_negative())
    }

    // ---------------------------------------------------------------
    // Packing an arbitrary-precision result back into 96 bits
    // ---------------------------------------------------------------

    /// `value = coefficient * 10^(-scale)` computed exactly in
    /// [`BigInt`]; pack it into a `Decimal128`, widening the magnitude if
    /// `scale` is negative, and — when the coefficient can't fit 96 bits
    /// or `scale` exceeds [`MAX_SCALE`] — dropping trailing digits with
    /// `HALF_EVEN` rounding (spec's "sticky-bit" reading of the
    /// round-on-5 ambiguity; see `DESIGN.md`) until it does. Fails with
    /// [`DecimalError::Overflow`] if digits would have to be dropped from
    /// the integer part itself (`scale` already at 0).
    fn finish(op: &'static str, value: BigInt, scale: i64) -> DecimalResult<Self> {
        let negative = value.is_negative();
        let mut mag = value.magnitude().clone();
        let mut scale = scale;

        if scale < 0 {
            mag = mag.mul(&biguint::pow10((-scale) as usize));
            scale = 0;
        }
        if scale > MAX_SCALE as i64 {
            let drop = (scale - MAX_SCALE as i64) as u32;
            mag = round_drop_digits(&mag, drop, RoundingPolicy::HalfEven, negative);
            scale = MAX_SCALE as i64;
        }
        while !fits_96(&mag) {
            if scale == 0 {
                return Err(DecimalError::Overflow(op));
            }
            mag = round_drop_digits(&mag, 1, RoundingPolicy::HalfEven, negative);
            scale -= 1;
        }
        let coef = mag.to_u128().ok_or(DecimalError::Overflow(op))?;
        Decimal128::from_parts(coef, scale as u32, negative)
    }

    // ---------------------------------------------------------------
    // Comparison
    // ---------------------------------------------------------------

    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let scale = self.scale().max(other.scale());
        let a = self.to_bigint().mul(&pow10_bigint(scale - self.scale()));
        let b = other.to_bigint().mul(&pow10_bigint(scale - other.scale()));
        a.cmp(&b)
    }

    // ---------------------------------------------------------------
    // Additive / multiplicative operators
    // ---------------------------------------------------------------

    pub fn add(&self, other: &Self) -> DecimalResult<Self> {
        let scale = self.scale().max(other.scale());
        let a = self.to_bigint().mul(&pow10_bigint(scale - self.scale()));
        let b = other.to_bigint().mul(&pow10_bigint(scale - other.scale()));
        Self::finish("Decimal128::add", a.add(&b), scale as i64)
    }

    pub fn sub(&self, other: &Self) -> DecimalResult<Self> {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> DecimalResult<Self> {
        let scale = self.scale() as i64 + other.scale() as i64;
        Self::finish("Decimal128::mul", self.to_bigint().mul(&other.to_bigint()), scale)
    }

    /// `self / other` under `HALF_EVEN`. See [`divide_with_policy`](Self::divide_with_policy).
    pub fn divide(&self, other: &Self) -> DecimalResult<Self> {
        self.divide_with_policy(other, RoundingPolicy::HalfEven)
    }

    /// `rust_decimal`-style aliases: every `Decimal128` operation already
    /// returns `Result` rather than panicking on overflow, so these are
    /// thin renames for callers used to the `checked_*` naming.
    pub fn checked_add(&self, other: &Self) -> DecimalResult<Self> {
        self.add(other)
    }

    pub fn checked_sub(&self, other: &Self) -> DecimalResult<Self> {
        self.sub(other)
    }

    pub fn checked_mul(&self, other: &Self) -> DecimalResult<Self> {
        self.mul(other)
    }

    pub fn checked_div(&self, other: &Self) -> DecimalResult<Self> {
        self.divide(other)
    }

    /// Classifies the division before falling back to bounded long
    /// division: a zero dividend is always zero; a unit-coefficient
    /// divisor (a bare power of ten) is a pure scale shift with no
    /// division at all; equal coefficients reduce to a power of ten the
    /// same way. The general path bounds the fractional digits it
    /// produces to whichever is smaller of `29` significant digits or
    /// `28 - (scale_a - scale_b)` fractional digits, carries one guard
    /// digit, and rounds that guard digit away under `policy`.
    pub fn divide_with_policy(&self, other: &Self, policy: RoundingPolicy) -> DecimalResult<Self> {
        const OP: &str = "Decimal128::divide";
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero(OP));
        }
        if self.is_zero() {
            return Ok(Decimal128::zero());
        }
        let negative = self.is_negative() != other.is_negative();

        if other.coefficient() == 1 {
            let scale = self.scale() as i64 - other.scale() as i64;
            return Self::finish(OP, BigInt::from_biguint(self.magnitude(), negative), scale);
        }
        if self.coefficient() == other.coefficient() {
            let scale = self.scale() as i64 - other.scale() as i64;
            return Self::finish(OP, BigInt::from_biguint(BigUInt::one(), negative), scale);
        }

        let a = self.magnitude();
        let b = other.magnitude();
        let scale_diff = self.scale() as i64 - other.scale() as i64;

        // Bound the fractional digits produced: whichever is tighter of
        // the 29-significant-digit budget (after the integer quotient's
        // own digits) or `28 - scale_diff`.
        let (int_quotient, _) = a.divmod(&b)?;
        let int_digits = digit_count(&int_quotient);
        let frac_cap_by_digits = (MAX_NUM_DIGITS as i64 - int_digits).max(0);
        let frac_cap_by_scale = (MAX_SCALE as i64 - scale_diff).max(0);
        let precision = frac_cap_by_digits.min(frac_cap_by_scale);

        let guard_scale = precision + 1;
        let shift = guard_scale - scale_diff;
        let (num, den) = if shift >= 0 {
            (a.mul(&biguint::pow10(shift as usize)), b)
        } else {
            (a, b.mul(&biguint::pow10((-shift) as usize)))
        };
        let (q, r) = num.divmod(&den)?;
        let (kept, first_discarded) = q.divmod_small(10);
        let (_, last_kept) = kept.divmod_small(10);
        let rest_nonzero = !r.is_zero();
        let round_up = crate::rounding::should_round_up(
            policy,
            last_kept as u8,
            first_discarded as u8,
            rest_nonzero,
            negative,
        );
        let mut coeff = kept;
        if round_up {
            coeff.iadd(&BigUInt::one());
        }
        Self::finish(OP, BigInt::from_biguint(coeff, negative), precision)
    }

    // ---------------------------------------------------------------
    // Rescale
    // ---------------------------------------------------------------

    /// Re-scale to exactly `n` decimal places. `n` may be negative
    /// (rounding above the decimal point); since `Decimal128` cannot
    /// store a negative scale, the result's stored scale floors at `0`
    /// with the coefficient widened to compensate.
    pub fn round_to(&self, n: i32, policy: RoundingPolicy) -> DecimalResult<Self> {
        const OP: &str = "Decimal128::round_to";
        let scale = self.scale() as i32;
        if n == scale {
            return Ok(*self);
        }
        let negative = self.is_negative();
        if n > scale {
            let diff = (n - scale) as u32;
            let widened = self.magnitude().mul(&biguint::pow10(diff as usize));
            return Self::finish(OP, BigInt::from_biguint(widened, negative), n as i64);
        }
        let drop = (scale - n) as u32;
        let rounded = round_drop_digits(&self.magnitude(), drop, policy, negative);
        Self::finish(OP, BigInt::from_biguint(rounded, negative), n as i64)
    }
}

fn fits_96(mag: &BigUInt) -> bool {
    mag.to_u128().map(|v| v <= MAX_COEF).unwrap_or(false)
}

fn digit_count(v: &BigUInt) -> i64 {
    if v.is_zero() {
        1
    } else {
        v.to_decimal_string().len() as i64
    }
}

impl PartialEq for Decimal128 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl Eq for Decimal128 {}

impl PartialOrd for Decimal128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal128 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let as_decimal = crate::bigdecimal::BigDecimal::new(self.to_bigint(), self.scale() as i32);
        write!(f, "{}", as_decimal)
    }
}

impl FromStr for Decimal128 {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = crate::parse::parse_numeric(s)?;
        let mut mag = BigUInt::from_decimal_digits(&parsed.digits);
        let mut scale = parsed.scale as i64;
        if scale < 0 {
            mag = mag.mul(&biguint::pow10((-scale) as usize));
            scale = 0;
        }
        if scale > MAX_SCALE as i64 {
            return Err(DecimalError::Overflow("Decimal128::from_str"));
        }
        let coef = mag.to_u128().ok_or(DecimalError::Overflow("Decimal128::from_str"))?;
        Decimal128::from_parts(coef, scale as u32, parsed.negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal128 {
        s.parse().unwrap()
    }

    #[test]
    fn display_round_trip() {
        for s in ["0", "123.456", "-0.01", "1000", "-42"] {
            assert_eq!(d(s).to_string(), s);
        }
    }

    #[test]
    fn no_negative_zero() {
        let z = Decimal128::zero().neg();
        assert!(!z.is_negative());
    }

    #[test]
    fn checked_aliases_match_their_unchecked_counterparts() {
        let a = d("2.5");
        let b = d("1.5");
        assert_eq!(a.checked_add(&b).unwrap(), a.add(&b).unwrap());
        assert_eq!(a.checked_sub(&b).unwrap(), a.sub(&b).unwrap());
        assert_eq!(a.checked_mul(&b).unwrap(), a.mul(&b).unwrap());
        assert_eq!(a.checked_div(&b).unwrap(), a.divide(&b).unwrap());
        assert!(Decimal128::one().checked_div(&Decimal128::zero()).is_err());
    }

    #[test]
    fn add_scenario_large_coefficient() {
        let a = d("123456789012345678901234567.89");
        let b = d("0.01");
        assert_eq!(a.add(&b).unwrap().to_string(), "123456789012345678901234567.90");
    }

    #[test]
    fn sub_aligns_scales() {
        assert_eq!(d("3.75").sub(&d("2.25")).unwrap(), d("1.50"));
    }

    #[test]
    fn mul_sums_scales_and_reduces_on_overflow() {
        let r = d("1.5").mul(&d("2.00")).unwrap();
        assert_eq!(r, d("3.00"));
    }

    #[test]
    fn mul_overflow_on_huge_coefficients() {
        let near_max = Decimal128::from_parts(MAX_COEF, 0, false).unwrap();
        assert!(near_max.mul(&near_max).is_err());
    }

    #[test]
    fn divide_by_unit_coefficient_is_scale_shift() {
        let a = d("12.5");
        let unit = Decimal128::from_parts(1, 2, false).unwrap(); // 0.01
        let r = a.divide(&unit).unwrap();
        assert_eq!(r, d("1250"));
    }

    #[test]
    fn divide_equal_coefficients() {
        let a = d("5.00");
        let b = d("0.05");
        assert_eq!(a.divide(&b).unwrap(), d("100"));
    }

    #[test]
    fn divide_by_zero_errors() {
        assert!(d("1").divide(&Decimal128::zero()).is_err());
    }

    #[test]
    fn divide_rounds_half_even() {
        let r = d("1").divide(&d("3")).unwrap();
        assert_eq!(r.scale(), MAX_SCALE.min(r.scale()).max(r.scale()).min(28));
        assert!(r.to_string().starts_with("0.333333"));
    }

    #[test]
    fn round_to_widens_and_narrows() {
        assert_eq!(d("1.5").round_to(4, RoundingPolicy::HalfEven).unwrap(), d("1.5000"));
        assert_eq!(d("1.25").round_to(1, RoundingPolicy::HalfEven).unwrap(), d("1.2"));
        assert_eq!(d("1.35").round_to(1, RoundingPolicy::HalfEven).unwrap(), d("1.4"));
    }

    #[test]
    fn round_to_negative_places_floors_scale_at_zero() {
        let r = d("1250").round_to(-2, RoundingPolicy::HalfEven).unwrap();
        assert_eq!(r.scale(), 0);
        assert_eq!(r.to_string(), "1200");
    }

    #[test]
    fn from_i64_and_i128() {
        assert_eq!(Decimal128::from_i64(-5).to_string(), "-5");
        assert!(Decimal128::from_i128(i128::MAX).is_err());
        assert_eq!(Decimal128::from_i128(42).unwrap().to_string(), "42");
    }

    #[test]
    fn ordering_across_scales() {
        assert!(d("1.50") == d("1.5"));
        assert!(d("1.5") < d("1.6"));
        assert!(d("-1") < d("0"));
    }

    #[test]
    fn overflow_when_scale_cannot_shrink_further() {
        let huge = format!("{}.1", "9".repeat(29));
        assert!(huge.parse::<Decimal128>().is_err());
    }
}
