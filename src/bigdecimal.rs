//! Variable-precision decimal: a [`BigInt`] coefficient plus a signed scale.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::bigint::BigInt;
use crate::biguint::{self, BigUInt};
use crate::constants;
use crate::error::{DecimalError, DecimalResult};
use crate::rounding::{round_drop_digits, should_round_up, RoundingPolicy};

fn pow10_bigint(n: u32) -> BigInt {
    BigInt::from_biguint(biguint::pow10(n), false)
}

/// `coefficient × 10^(−scale)`. Unlike [`BigUInt`]/[`BigInt`], trailing
/// zeros of the coefficient carry semantic precision and are never
/// stripped by arithmetic — only [`BigDecimal::round`] and the transcendental
/// functions' exact-square detection touch scale deliberately.
#[derive(Clone, Debug)]
pub struct BigDecimal {
    coefficient: BigInt,
    scale: i32,
}

impl BigDecimal {
    pub fn new(coefficient: BigInt, scale: i32) -> Self {
        BigDecimal { coefficient, scale }
    }

    pub fn zero() -> Self {
        BigDecimal::new(BigInt::zero(), 0)
    }

    pub fn one() -> Self {
        BigDecimal::new(BigInt::one(), 0)
    }

    pub fn from_i64(v: i64) -> Self {
        BigDecimal::new(BigInt::from_i64(v), 0)
    }

    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    pub fn abs(&self) -> Self {
        BigDecimal::new(self.coefficient.abs(), self.scale)
    }

    pub fn neg(&self) -> Self {
        BigDecimal::new(self.coefficient.neg(), self.scale)
    }

    /// Scale both operands' coefficients to the larger of the two scales.
    fn align(&self, other: &Self) -> (BigInt, BigInt, i32) {
        let scale = self.scale.max(other.scale);
        let a = self.coefficient.mul(&pow10_bigint((scale - self.scale) as u32));
        let b = other.coefficient.mul(&pow10_bigint((scale - other.scale) as u32));
        (a, b, scale)
    }

    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.align(other);
        a.cmp(&b)
    }

    // ---------------------------------------------------------------
    // Additive / multiplicative operators
    // ---------------------------------------------------------------

    pub fn add(&self, other: &Self) -> Self {
        let (a, b, scale) = self.align(other);
        BigDecimal::new(a.add(&b), scale)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b, scale) = self.align(other);
        BigDecimal::new(a.sub(&b), scale)
    }

    pub fn mul(&self, other: &Self) -> Self {
        BigDecimal::new(self.coefficient.mul(&other.coefficient), self.scale + other.scale)
    }

    /// Binary exponentiation for a non-negative integer power: `coef^n`,
    /// `scale·n`.
    fn pow_integer(&self, n: u32) -> Self {
        BigDecimal::new(self.coefficient.pow(n), self.scale * n as i32)
    }

    /// `true` divide, producing exactly `precision` fractional digits under
    /// [`RoundingPolicy::HalfEven`].
    pub fn divide(&self, other: &Self, precision: u32) -> DecimalResult<Self> {
        self.divide_with_policy(other, precision, RoundingPolicy::HalfEven)
    }

    /// `true` divide with an explicit rounding mode. Computes one extra
    /// ("guard") fractional digit via exact integer long division, then
    /// rounds it away — the guard digit plus the genuine division remainder
    /// together give `should_round_up` everything it needs.
    pub fn divide_with_policy(
        &self,
        other: &Self,
        precision: u32,
        policy: RoundingPolicy,
    ) -> DecimalResult<Self> {
        if other.coefficient.is_zero() {
            return Err(DecimalError::DivisionByZero("BigDecimal::divide"));
        }
        let guard_scale = precision as i64 + 1;
        let shift = guard_scale + other.scale as i64 - self.scale as i64;
        let (num, den) = if shift >= 0 {
            (self.coefficient.magnitude().mul(&biguint::pow10(shift as u32)), other.coefficient.magnitude().clone())
        } else {
            (self.coefficient.magnitude().clone(), other.coefficient.magnitude().mul(&biguint::pow10((-shift) as u32)))
        };
        let (q, r) = num.divmod(&den)?;
        let (kept, first_discarded) = q.divmod_small(10);
        let (_, last_kept) = kept.divmod_small(10);
        let rest_nonzero = !r.is_zero();
        let negative = self.coefficient.is_negative() != other.coefficient.is_negative();

        let round_up = should_round_up(policy, last_kept as u8, first_discarded as u8, rest_nonzero, negative);
        let mut coeff = kept;
        if round_up {
            coeff.iadd(&BigUInt::one());
        }
        Ok(BigDecimal::new(BigInt::from_biguint(coeff, negative), precision as i32))
    }

    /// Re-scale to `new_scale`, applying `policy` when digits must be
    /// dropped. Widening (`new_scale > scale`) is exact.
    pub fn round(&self, new_scale: i32, policy: RoundingPolicy) -> Self {
        if new_scale >= self.scale {
            let diff = (new_scale - self.scale) as u32;
            return BigDecimal::new(self.coefficient.mul(&pow10_bigint(diff)), new_scale);
        }
        let drop = (self.scale - new_scale) as u32;
        let negative = self.coefficient.is_negative();
        let coeff = round_drop_digits(self.coefficient.magnitude(), drop, policy, negative);
        BigDecimal::new(BigInt::from_biguint(coeff, negative), new_scale)
    }

    // ---------------------------------------------------------------
    // Square root
    // ---------------------------------------------------------------

    /// Newton's method on the coefficient after doubling the working scale;
    /// detects an exact square and strips the trailing zero digits Newton
    /// would otherwise leave padded on.
    pub fn sqrt(&self, precision: u32) -> DecimalResult<Self> {
        if self.coefficient.is_negative() {
            return Err(DecimalError::domain("BigDecimal::sqrt", "argument must be non-negative"));
        }
        if self.is_zero() {
            return Ok(BigDecimal::new(BigInt::zero(), precision as i32));
        }
        let shift = 2 * precision as i64 - self.scale as i64;
        let scaled = if shift >= 0 {
            self.coefficient.magnitude().mul(&biguint::pow10(shift as u32))
        } else {
            let (q, _) = self.coefficient.magnitude().divmod(&biguint::pow10((-shift) as u32))?;
            q
        };
        let mut root = scaled.sqrt();
        let exact = root.mul(&root) == scaled;
        let mut scale = precision as i32;
        if exact {
            let ten = BigUInt::from_u64(10);
            while scale > 0 {
                let (q, r) = root.divmod(&ten).unwrap();
                if !r.is_zero() {
                    break;
                }
                root = q;
                scale -= 1;
            }
        }
        Ok(BigDecimal::new(BigInt::from_biguint(root, false), scale))
    }

    // ---------------------------------------------------------------
    // Integer / fractional split (exp's range reduction)
    // ---------------------------------------------------------------

    fn split_integer_fraction(&self) -> (BigInt, BigDecimal) {
        if self.scale <= 0 {
            let n = self.coefficient.mul(&pow10_bigint((-self.scale) as u32));
            return (n, BigDecimal::new(BigInt::zero(), 0));
        }
        let divisor = biguint::pow10(self.scale as u32);
        let (q_mag, r_mag) = self.coefficient.magnitude().divmod(&divisor).expect("pow10 is never zero");
        let negative = self.coefficient.is_negative();
        let n = BigInt::from_biguint(q_mag, negative);
        let r = BigDecimal::new(BigInt::from_biguint(r_mag, negative), self.scale);
        (n, r)
    }

    /// `x = m × 10^q` with `1 ≤ m < 10` (or `m = 0`). Free — only the scale
    /// changes, since `coefficient` already holds every significant digit.
    fn normalize_pow10(&self) -> (BigDecimal, i64) {
        if self.is_zero() {
            return (self.clone(), 0);
        }
        let digits = self.coefficient.magnitude().to_decimal_string();
        let digit_count = digits.len() as i64;
        let q = digit_count - 1 - self.scale as i64;
        (BigDecimal::new(self.coefficient.clone(), (self.scale as i64 + q) as i32), q)
    }

    // ---------------------------------------------------------------
    // exp / ln / power
    // ---------------------------------------------------------------

    /// `e^x`. Range-reduces the integer part of `x` through the
    /// precomputed `e^k` table (`k ∈ {1..16, 32}`), then evaluates the
    /// Taylor series `Σ rⁿ/n!` on the fractional remainder `|r| < 1`.
    /// Precondition: `|x| ≲ 66` (enforced) to keep the integer part's
    /// reduction within the precomputed table's reach and the result
    /// finite at any supported precision.
    pub fn exp(&self, precision: u32) -> DecimalResult<Self> {
        if precision > constants::MAX_USABLE_PRECISION {
            return Err(DecimalError::invalid(
                "BigDecimal::exp",
                format!("precision {} exceeds the supported maximum {}", precision, constants::MAX_USABLE_PRECISION),
            ));
        }
        let guard = 10u32;
        let wp = precision + guard;
        let (n_int, frac) = self.split_integer_fraction();
        let n = n_int
            .to_i64()
            .ok_or_else(|| DecimalError::domain("BigDecimal::exp", "argument too large"))?;
        if n.unsigned_abs() > 66 {
            return Err(DecimalError::domain("BigDecimal::exp", "argument exceeds the supported range (~66)"));
        }

        let neg_exponent = n < 0;
        let mut magnitude = n.unsigned_abs();
        let mut int_part = BigDecimal::one();
        for &block in &[32u32, 16] {
            while magnitude >= block as u64 {
                int_part = int_part.mul(&constants::e_pow_small(block));
                magnitude -= block as u64;
            }
        }
        if magnitude > 0 {
            int_part = int_part.mul(&constants::e_pow_small(magnitude as u32));
        }
        if neg_exponent && !int_part.is_zero() {
            int_part = BigDecimal::one().divide(&int_part, wp, RoundingPolicy::HalfEven)?;
        }

        let frac_exp = Self::exp_taylor(&frac, wp)?;
        let result = int_part.mul(&frac_exp);
        Ok(result.round(precision as i32, RoundingPolicy::HalfEven))
    }

    /// `e^x` for `|x| < 1` via the defining Taylor series, iterating until
    /// the term drops below `10^(-precision)` or a divergence-guard cap is
    /// hit.
    fn exp_taylor(x: &Self, precision: u32) -> DecimalResult<Self> {
        let threshold = BigDecimal::new(BigInt::one(), precision as i32);
        let mut term = BigDecimal::one();
        let mut sum = BigDecimal::one();
        const MAX_ITERS: i64 = 500;
        let mut n: i64 = 1;
        while n <= MAX_ITERS {
            term = term.mul(x).divide(&BigDecimal::from_i64(n), precision, RoundingPolicy::HalfEven)?;
            sum = sum.add(&term);
            if term.abs().cmp_value(&threshold) == Ordering::Less {
                break;
            }
            n += 1;
        }
        Ok(sum)
    }

    /// `ln(x)`, `x > 0`. Reduces `x = m · 10^q` with `1 ≤ m < 10` (free, via
    /// [`normalize_pow10`](Self::normalize_pow10)), then solves `ln(m)` by
    /// Newton's method on `f(y) = e^y − m`:
    /// `y ← y − 1 + m·e^{−y}`, seeded from `f64::ln` of the bounded `m`.
    /// Reuses `exp` as the iteration step rather than a separate
    /// precomputed decimal anchor table: `exp` already provides
    /// everything Newton's iteration needs, and `m`'s bounded range
    /// keeps it inside `exp`'s own `|x| ≲ 66` precondition trivially.
    pub fn ln(&self, precision: u32) -> DecimalResult<Self> {
        if self.is_zero() || self.coefficient.is_negative() {
            return Err(DecimalError::domain("BigDecimal::ln", "argument must be positive"));
        }
        let guard = 10u32;
        let wp = precision + guard;
        let (m, q) = self.normalize_pow10();

        let seed: f64 = m.to_string().parse().unwrap_or(1.0);
        let seed_ln = seed.ln().max(1e-12);
        let mut y: BigDecimal = format!("{:.12}", seed_ln)
            .parse()
            .unwrap_or_else(|_| BigDecimal::zero());
        y = y.round(wp as i32, RoundingPolicy::HalfEven);

        const MAX_ITERS: usize = 100;
        let mut prev: Option<BigDecimal> = None;
        for _ in 0..MAX_ITERS {
            let exp_y = y.exp(wp)?;
            let exp_neg_y = BigDecimal::one().divide(&exp_y, wp, RoundingPolicy::HalfEven)?;
            let next = y.sub(&BigDecimal::one()).add(&m.mul(&exp_neg_y)).round(wp as i32, RoundingPolicy::HalfEven);
            if let Some(p) = &prev {
                if *p == next {
                    y = next;
                    break;
                }
            }
            prev = Some(y);
            y = next;
        }

        let result = y.add(&constants::ln10().mul(&BigDecimal::from_i64(q)));
        Ok(result.round(precision as i32, RoundingPolicy::HalfEven))
    }

    fn to_integer_exponent(&self) -> Option<i64> {
        if self.scale <= 0 {
            let extra = (-self.scale) as u32;
            let mag = self.coefficient.magnitude().mul(&biguint::pow10(extra));
            let mut v = mag.to_u64()? as i64;
            if self.coefficient.is_negative() {
                v = -v;
            }
            return Some(v);
        }
        let divisor = biguint::pow10(self.scale as u32);
        let (q, r) = self.coefficient.magnitude().divmod(&divisor).ok()?;
        if !r.is_zero() {
            return None;
        }
        let mut v = q.to_u64()? as i64;
        if self.coefficient.is_negative() {
            v = -v;
        }
        Some(v)
    }

    /// `base^exponent`. An integer exponent uses binary exponentiation
    /// directly on the coefficient; `±0.5` routes through [`sqrt`](Self::sqrt);
    /// any other exponent requires a positive base and computes
    /// `exp(exponent · ln(base))`.
    pub fn power(&self, exponent: &Self, precision: u32) -> DecimalResult<Self> {
        if let Some(e) = exponent.to_integer_exponent() {
            if e >= 0 {
                return Ok(self.pow_integer(e as u32));
            }
            if self.is_zero() {
                return Err(DecimalError::domain("BigDecimal::power", "0 raised to a negative exponent"));
            }
            let positive = self.pow_integer((-e) as u32);
            return BigDecimal::one().divide(&positive, precision, RoundingPolicy::HalfEven);
        }

        let half = BigDecimal::new(BigInt::from_i64(5), 1);
        if *exponent == half {
            return self.sqrt(precision);
        }
        if *exponent == half.neg() {
            let root = self.sqrt(precision)?;
            return BigDecimal::one().divide(&root, precision, RoundingPolicy::HalfEven);
        }

        if self.coefficient.is_negative() || self.is_zero() {
            return Err(DecimalError::domain(
                "BigDecimal::power",
                "non-integer exponent requires a positive base",
            ));
        }
        let guard = 10;
        let wp = precision + guard;
        let ln_b = self.ln(wp)?;
        let product = exponent.round(wp as i32, RoundingPolicy::HalfEven).mul(&ln_b);
        product.exp(precision)
    }

    // ---------------------------------------------------------------
    // Display helpers
    // ---------------------------------------------------------------

    /// Groups the integer part's digits in clusters of 3 from the right.
    pub fn to_string_with_separators(&self, sep: &str) -> String {
        let rendered = self.to_string();
        let negative = rendered.starts_with('-');
        let body = if negative { &rendered[1..] } else { &rendered[..] };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (body, None),
        };
        let mut grouped = String::new();
        let bytes = int_part.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if i > 0 && (bytes.len() - i) % 3 == 0 {
                grouped.push_str(sep);
            }
            grouped.push(b as char);
        }
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(f) = frac_part {
            out.push('.');
            out.push_str(f);
        }
        out
    }

    /// Wraps the canonical rendering at `line_width` characters per line.
    pub fn to_decimal_string(&self, line_width: usize) -> String {
        let rendered = self.to_string();
        if line_width == 0 {
            return rendered;
        }
        rendered
            .as_bytes()
            .chunks(line_width)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.coefficient.is_negative();
        let digits = self.coefficient.magnitude().to_decimal_string();
        if negative {
            f.write_str("-")?;
        }
        if self.scale <= 0 {
            f.write_str(&digits)?;
            for _ in 0..(-self.scale) {
                f.write_str("0")?;
            }
            Ok(())
        } else {
            let scale = self.scale as usize;
            if digits.len() <= scale {
                f.write_str("0.")?;
                for _ in 0..(scale - digits.len()) {
                    f.write_str("0")?;
                }
                f.write_str(&digits)
            } else {
                let (int_part, frac_part) = digits.split_at(digits.len() - scale);
                write!(f, "{}.{}", int_part, frac_part)
            }
        }
    }
}

impl FromStr for BigDecimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = crate::parse::parse_numeric(s)?;
        let magnitude = BigUInt::from_decimal_digits(&parsed.digits);
        Ok(BigDecimal::new(BigInt::from_biguint(magnitude, parsed.negative), parsed.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn display_round_trip() {
        for s in ["0", "123.456", "-0.001", "1000", "-42"] {
            assert_eq!(d(s).to_string(), s);
        }
    }

    #[test]
    fn add_aligns_scales() {
        assert_eq!(d("1.5").add(&d("2.25")), d("3.75"));
    }

    #[test]
    fn mul_sums_scales() {
        let r = d("1.5").mul(&d("2.00"));
        assert_eq!(r.scale(), 4);
        assert_eq!(r, d("3.00"));
    }

    #[test]
    fn decimal128_style_addition_scenario() {
        let a = d("123456789012345678901234567.89");
        let b = d("0.01");
        assert_eq!(a.add(&b), d("123456789012345678901234567.90"));
    }

    #[test]
    fn divide_scenario_100_12_minus_23_17() {
        // 1200 - 23/17 to 50 fractional digits, correctly rounded HALF_EVEN.
        let frac = d("23").divide(&d("17"), 50).unwrap();
        let expr = d("100").mul(&d("12")).sub(&frac);
        assert_eq!(expr.to_string(), "1198.64705882352941176470588235294117647058823529411765");
    }

    #[test]
    fn half_even_rounds_ties_to_even() {
        assert_eq!(d("2.5").round(0, RoundingPolicy::HalfEven), d("2"));
        assert_eq!(d("3.5").round(0, RoundingPolicy::HalfEven), d("4"));
    }

    #[test]
    fn sqrt_exact_square_strips_trailing_zeros() {
        let r = d("4").sqrt(10).unwrap();
        assert_eq!(r, d("2"));
    }

    #[test]
    fn sqrt_domain_error_on_negative() {
        assert!(d("-1").sqrt(10).is_err());
    }

    #[test]
    fn ln_of_one_is_zero() {
        let r = d("1").ln(30).unwrap();
        assert_eq!(r.round(10, RoundingPolicy::HalfEven), d("0").round(10, RoundingPolicy::HalfEven));
    }

    #[test]
    fn ln_two_matches_known_digits() {
        let r = d("2").ln(50).unwrap();
        let expected = "0.69314718055994530941723212145817656807550013436025";
        assert_eq!(r.to_string(), expected);
    }

    #[test]
    fn exp_of_zero_is_one() {
        let r = d("0").exp(20).unwrap();
        assert_eq!(r, d("1"));
    }

    #[test]
    fn power_integer_exponent() {
        assert_eq!(d("2").power(&d("10"), 10).unwrap(), d("1024"));
    }

    #[test]
    fn power_half_routes_through_sqrt() {
        assert_eq!(d("9").power(&d("0.5"), 10).unwrap(), d("3"));
    }

    #[test]
    fn gcd_lcm_identity_via_bigint() {
        let a = BigInt::from_i64(-12);
        let b = BigInt::from_i64(8);
        assert_eq!(a.gcd(&b), BigInt::from_i64(4));
    }
}
