//! Signed arbitrary-precision integer with Python-style floor division.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::biguint::BigUInt;
use crate::error::{DecimalError, DecimalResult};

/// `(-1)^sign · magnitude`. Canonical zero always has `sign = false` — a
/// `(0, sign=true)` pair is never produced by any operation in this module.
#[derive(Clone, Debug, Eq)]
pub struct BigInt {
    magnitude: BigUInt,
    negative: bool,
}

impl BigInt {
    pub fn zero() -> Self {
        BigInt { magnitude: BigUInt::zero(), negative: false }
    }

    pub fn one() -> Self {
        BigInt { magnitude: BigUInt::one(), negative: false }
    }

    pub fn from_i64(v: i64) -> Self {
        if v == i64::MIN {
            // Avoid overflow on `v.unsigned_abs()`'s signed negation path.
            return BigInt { magnitude: BigUInt::from_u64(v.unsigned_abs()), negative: true };
        }
        BigInt { magnitude: BigUInt::from_u64(v.unsigned_abs()), negative: v < 0 }
    }

    pub fn from_biguint(magnitude: BigUInt, negative: bool) -> Self {
        let negative = negative && !magnitude.is_zero();
        BigInt { magnitude, negative }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> &BigUInt {
        &self.magnitude
    }

    pub fn abs(&self) -> Self {
        BigInt { magnitude: self.magnitude.clone(), negative: false }
    }

    pub fn neg(&self) -> Self {
        BigInt::from_biguint(self.magnitude.clone(), !self.negative)
    }

    pub fn to_i64(&self) -> Option<i64> {
        let m = self.magnitude.to_u64()?;
        if self.negative {
            if m > i64::MAX as u64 + 1 {
                None
            } else {
                Some((m as i128 * -1) as i64)
            }
        } else if m <= i64::MAX as u64 {
            Some(m as i64)
        } else {
            None
        }
    }

    // ---------------------------------------------------------------
    // Comparison
    // ---------------------------------------------------------------

    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp_magnitude(&other.magnitude),
            (true, true) => other.magnitude.cmp_magnitude(&self.magnitude),
            (false, true) => {
                if self.is_zero() && other.is_zero() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (true, false) => {
                if self.is_zero() && other.is_zero() {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Additive group
    // ---------------------------------------------------------------

    pub fn add(&self, other: &Self) -> Self {
        if self.negative == other.negative {
            BigInt::from_biguint(self.magnitude.add(&other.magnitude), self.negative)
        } else {
            match self.magnitude.cmp_magnitude(&other.magnitude) {
                Ordering::Equal => BigInt::zero(),
                Ordering::Greater => {
                    BigInt::from_biguint(self.magnitude.sub(&other.magnitude).unwrap(), self.negative)
                }
                Ordering::Less => {
                    BigInt::from_biguint(other.magnitude.sub(&self.magnitude).unwrap(), other.negative)
                }
            }
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        BigInt::from_biguint(self.magnitude.mul(&other.magnitude), self.negative != other.negative)
    }

    // ---------------------------------------------------------------
    // Division
    // ---------------------------------------------------------------

    /// Floor division: quotient rounds toward −∞, remainder has the sign of
    /// the divisor (Python's `//` / `%`).
    pub fn div_floor(&self, other: &Self) -> DecimalResult<(Self, Self)> {
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero("BigInt::div_floor"));
        }
        let (mut q_mag, mut r_mag) = self.magnitude.divmod(&other.magnitude)?;
        let mut q_neg = self.negative != other.negative;
        if self.negative != other.negative && !r_mag.is_zero() {
            q_mag = q_mag.add(&BigUInt::one());
            r_mag = other.magnitude.sub(&r_mag).unwrap();
        }
        if q_mag.is_zero() {
            q_neg = false;
        }
        let r_neg = other.negative && !r_mag.is_zero();
        Ok((BigInt::from_biguint(q_mag, q_neg), BigInt::from_biguint(r_mag, r_neg)))
    }

    /// Truncating division: quotient rounds toward zero, remainder has the
    /// sign of the dividend.
    pub fn div_trunc(&self, other: &Self) -> DecimalResult<(Self, Self)> {
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero("BigInt::div_trunc"));
        }
        let (q_mag, r_mag) = self.magnitude.divmod(&other.magnitude)?;
        let q_neg = (self.negative != other.negative) && !q_mag.is_zero();
        let r_neg = self.negative && !r_mag.is_zero();
        Ok((BigInt::from_biguint(q_mag, q_neg), BigInt::from_biguint(r_mag, r_neg)))
    }

    // ---------------------------------------------------------------
    // Power
    // ---------------------------------------------------------------

    /// `self ** exp` via left-to-right binary exponentiation, `exp >= 0`.
    pub fn pow(&self, exp: u32) -> Self {
        if exp == 0 {
            return BigInt::one();
        }
        let negative = self.negative && exp % 2 == 1;
        let mut result = BigUInt::one();
        let mut bit = 32 - exp.leading_zeros();
        while bit > 0 {
            bit -= 1;
            result = result.mul(&result);
            if (exp >> bit) & 1 == 1 {
                result = result.mul(&self.magnitude);
            }
        }
        BigInt::from_biguint(result, negative)
    }

    // ---------------------------------------------------------------
    // Right shift (floor semantics: -1 >> k = -1, -7 >> 1 = -4)
    // ---------------------------------------------------------------

    pub fn shr(&self, n: u32) -> Self {
        if !self.negative {
            return BigInt::from_biguint(self.magnitude.shr(n), false);
        }
        // For negative x, floor(x / 2^n) = -ceil(mag / 2^n).
        let shifted = self.magnitude.shr(n);
        let restored = shifted.shl(n);
        let exact = restored == self.magnitude;
        let mag = if exact { shifted } else { shifted.add(&BigUInt::one()) };
        BigInt::from_biguint(mag, true)
    }

    pub fn shl(&self, n: u32) -> Self {
        BigInt::from_biguint(self.magnitude.shl(n), self.negative)
    }

    // ---------------------------------------------------------------
    // Bitwise (Python-style infinite two's complement)
    // ---------------------------------------------------------------

    /// Encode into a two's-complement limb buffer of at least `len` limbs
    /// wide enough to hold `self` without ambiguity.
    fn to_twos_complement(&self, len: usize) -> Vec<u32> {
        let mut limbs = self.magnitude.limbs().to_vec();
        limbs.resize(len, 0);
        if self.negative {
            for limb in limbs.iter_mut() {
                *limb = (!*limb) & crate::biguint::LIMB_MASK;
            }
            let mut carry = 1u64;
            for limb in limbs.iter_mut() {
                if carry == 0 {
                    break;
                }
                let sum = *limb as u64 + carry;
                *limb = (sum & crate::biguint::LIMB_MASK as u64) as u32;
                carry = sum >> crate::biguint::LIMB_BITS;
            }
        }
        limbs
    }

    fn from_twos_complement(limbs: &[u32], negative: bool) -> Self {
        if !negative {
            return BigInt::from_biguint(BigUInt::from_limbs_vec(limbs.to_vec()), false);
        }
        let mut inverted: Vec<u32> = limbs
            .iter()
            .map(|&l| (!l) & crate::biguint::LIMB_MASK)
            .collect();
        let mut carry = 1u64;
        for limb in inverted.iter_mut() {
            if carry == 0 {
                break;
            }
            let sum = *limb as u64 + carry;
            *limb = (sum & crate::biguint::LIMB_MASK as u64) as u32;
            carry = sum >> crate::biguint::LIMB_BITS;
        }
        BigInt::from_biguint(BigUInt::from_limbs_vec(inverted), true)
    }

    fn bitop(&self, other: &Self, f: impl Fn(u32, u32) -> u32, result_negative: bool) -> Self {
        let len = self
            .magnitude
            .limb_count()
            .max(other.magnitude.limb_count())
            + 1;
        let a = self.to_twos_complement(len);
        let b = other.to_twos_complement(len);
        let out: Vec<u32> = a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect();
        Self::from_twos_complement(&out, result_negative)
    }

    pub fn bitand(&self, other: &Self) -> Self {
        self.bitop(other, |a, b| a & b, self.negative && other.negative)
    }

    pub fn bitor(&self, other: &Self) -> Self {
        self.bitop(other, |a, b| a | b, self.negative || other.negative)
    }

    pub fn bitxor(&self, other: &Self) -> Self {
        self.bitop(other, |a, b| a ^ b, self.negative != other.negative)
    }

    /// `~x ≡ −(x+1)`.
    pub fn bitnot(&self) -> Self {
        self.add(&BigInt::one()).neg()
    }

    // ---------------------------------------------------------------
    // Number theory
    // ---------------------------------------------------------------

    pub fn gcd(&self, other: &Self) -> Self {
        BigInt::from_biguint(self.magnitude.gcd(&other.magnitude), false)
    }

    pub fn lcm(&self, other: &Self) -> DecimalResult<Self> {
        if self.is_zero() || other.is_zero() {
            return Ok(BigInt::zero());
        }
        let g = self.magnitude.gcd(&other.magnitude);
        let (quotient, _) = self.magnitude.divmod(&g)?;
        Ok(BigInt::from_biguint(quotient.mul(&other.magnitude), false))
    }

    /// Extended Euclid: `(g, x, y)` with `a·x + b·y = g` and `g >= 0`.
    ///
    /// The subtractive loop below tracks signed remainders and only
    /// terminates when `r` hits zero, so `old_r` can come out negative
    /// for mixed-sign operands (e.g. `a < 0`). Negate `old_r`/`old_s`/
    /// `old_t` together when that happens so the returned `g` is always
    /// the non-negative gcd and the Bézout identity still holds.
    pub fn extended_gcd(&self, other: &Self) -> (Self, Self, Self) {
        let (mut old_r, mut r) = (self.clone(), other.clone());
        let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
        let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

        while !r.is_zero() {
            let (q, _) = old_r.div_trunc(&r).unwrap();
            let new_r = old_r.sub(&q.mul(&r));
            old_r = std::mem::replace(&mut r, new_r);
            let new_s = old_s.sub(&q.mul(&s));
            old_s = std::mem::replace(&mut s, new_s);
            let new_t = old_t.sub(&q.mul(&t));
            old_t = std::mem::replace(&mut t, new_t);
        }
        if old_r.is_negative() {
            old_r = old_r.neg();
            old_s = old_s.neg();
            old_t = old_t.neg();
        }
        (old_r, old_s, old_t)
    }

    /// `base^exp mod m`, right-to-left binary exponentiation with reduction
    /// at every step. Preconditions: `exp >= 0`, `m > 0`.
    pub fn mod_pow(&self, exp: &Self, m: &Self) -> DecimalResult<Self> {
        if exp.is_negative() {
            return Err(DecimalError::invalid("mod_pow", "exponent must be non-negative"));
        }
        if m.is_zero() || m.is_negative() {
            return Err(DecimalError::invalid("mod_pow", "modulus must be positive"));
        }
        if m.is_one_abs() {
            return Ok(BigInt::zero());
        }
        let mut result = BigInt::one();
        let (_, mut base) = self.div_floor(m)?;
        let bits = exp.magnitude.bit_length();
        for i in 0..bits {
            if exp.magnitude.bit(i) {
                result = result.mul(&base).div_floor(m)?.1;
            }
            base = base.mul(&base).div_floor(m)?.1;
        }
        Ok(result)
    }

    fn is_one_abs(&self) -> bool {
        self.magnitude.is_one()
    }

    /// Modular inverse via the extended Euclidean algorithm. Fails with
    /// [`DecimalError::NotInvertible`] when `gcd(self, m) != 1`.
    pub fn mod_inverse(&self, m: &Self) -> DecimalResult<Self> {
        if m.is_zero() || m.is_negative() {
            return Err(DecimalError::invalid("mod_inverse", "modulus must be positive"));
        }
        let (g, x, _) = self.extended_gcd(m);
        if !g.magnitude.is_one() {
            return Err(DecimalError::NotInvertible(self.to_string(), m.to_string()));
        }
        let (_, r) = x.div_floor(m)?;
        Ok(r)
    }

    // ---------------------------------------------------------------
    // Display / parse
    // ---------------------------------------------------------------

    pub fn to_decimal_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        if self.negative {
            format!("-{}", self.magnitude.to_decimal_string())
        } else {
            self.magnitude.to_decimal_string()
        }
    }

    /// Groups digits from the right in clusters of 3, joined by `sep`.
    pub fn to_string_with_separators(&self, sep: &str) -> String {
        let digits = self.magnitude.to_decimal_string();
        let mut grouped = String::new();
        let bytes = digits.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if i > 0 && (bytes.len() - i) % 3 == 0 {
                grouped.push_str(sep);
            }
            grouped.push(b as char);
        }
        if self.negative {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl FromStr for BigInt {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = crate::parse::parse_numeric(s)?;
        if parsed.scale != 0 {
            return Err(DecimalError::MalformedNumeric(format!(
                "'{}' is not an integer literal",
                s
            )));
        }
        let magnitude = BigUInt::from_decimal_digits(&parsed.digits);
        Ok(BigInt::from_biguint(magnitude, parsed.negative))
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        BigInt::from_i64(v)
    }
}

impl From<i32> for BigInt {
    fn from(v: i32) -> Self {
        BigInt::from_i64(v as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn no_negative_zero() {
        let x = b("-5").add(&b("5"));
        assert!(!x.is_negative());
        assert_eq!(x.to_decimal_string(), "0");
    }

    #[test]
    fn floor_div_matches_python_semantics() {
        // -7 // 2 == -4, remainder 1 (sign of divisor)
        let (q, r) = b("-7").div_floor(&b("2")).unwrap();
        assert_eq!(q, b("-4"));
        assert_eq!(r, b("1"));
    }

    #[test]
    fn trunc_div_matches_c_semantics() {
        let (q, r) = b("-7").div_trunc(&b("2")).unwrap();
        assert_eq!(q, b("-3"));
        assert_eq!(r, b("-1"));
    }

    #[test]
    fn large_division_round_trips_through_burnikel_ziegler() {
        let dividend = b(&format!("{}7", "1".repeat(2500)));
        let divisor = b(&format!("{}3", "9".repeat(1300)));
        let (q, r) = dividend.div_trunc(&divisor).unwrap();
        assert_eq!(q.mul(&divisor).add(&r), dividend);
        assert!(r.magnitude() < divisor.magnitude());
    }

    #[test]
    fn gcd_and_extended_gcd() {
        assert_eq!(b("-12").gcd(&b("8")), b("4"));
        let (g, x, y) = b("240").extended_gcd(&b("46"));
        assert_eq!(g, b("2"));
        assert_eq!(b("240").mul(&x).add(&b("46").mul(&y)), g);
    }

    #[test]
    fn extended_gcd_is_sign_normalized_for_negative_operands() {
        // A negative `self` must not flip the sign of the returned gcd.
        let (g, x, y) = b("-12").extended_gcd(&b("7"));
        assert_eq!(g, b("1"));
        assert!(!g.is_negative());
        assert_eq!(b("-12").mul(&x).add(&b("7").mul(&y)), g);
    }

    #[test]
    fn mod_pow_fermat() {
        // Fermat sanity: a^(p-1) mod p == 1 for prime p, gcd(a,p)=1.
        let p = b("101");
        let a = b("7");
        let r = a.mod_pow(&b("100"), &p).unwrap();
        assert_eq!(r, b("1"));
    }

    #[test]
    fn mod_inverse_roundtrip() {
        let a = b("17");
        let m = b("3120");
        let inv = a.mod_inverse(&m).unwrap();
        let (_, r) = a.mul(&inv).div_floor(&m).unwrap();
        assert_eq!(r, BigInt::one());
    }

    #[test]
    fn mod_inverse_with_negative_self() {
        // -12 * 4 = -48 == 1 (mod 7); the naive sign-unaware extended_gcd
        // would otherwise answer 3, which satisfies -12*3 == -1 (mod 7).
        let inv = b("-12").mod_inverse(&b("7")).unwrap();
        assert_eq!(inv, b("4"));
        let (_, r) = b("-12").mul(&inv).div_floor(&b("7")).unwrap();
        assert_eq!(r, BigInt::one());
    }

    #[test]
    fn mod_inverse_not_invertible() {
        assert!(b("4").mod_inverse(&b("8")).is_err());
    }

    #[test]
    fn bitwise_identities() {
        let x = b("12345");
        assert_eq!(x.bitxor(&x), BigInt::zero());
        assert_eq!(x.bitand(&b("-1")), x);
        assert_eq!(x.bitor(&BigInt::zero()), x);
        assert_eq!(x.bitnot(), x.neg().sub(&BigInt::one()));
    }

    #[test]
    fn shift_cross_check_power_of_two() {
        for n in 0u32..16 {
            assert_eq!(BigInt::one().shl(n), BigInt::from_i64(2).pow(n));
        }
    }

    #[test]
    fn negative_right_shift_rounds_toward_neg_infinity() {
        assert_eq!(b("-1").shr(5), b("-1"));
        assert_eq!(b("-7").shr(1), b("-4"));
    }
}
