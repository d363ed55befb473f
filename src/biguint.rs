//! Base-2^30 arbitrary-precision unsigned integer engine.
//!
//! Limbs are stored little-endian (`limbs[0]` is least significant) in the
//! half-open range `[0, 2^30)`. The radix is chosen so that two limbs
//! multiply without overflowing 64 bits (30 + 30 = 60), so a 64-bit
//! accumulator can absorb carries across many limbs, and so that shifts by
//! 30 bits align to a limb boundary.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{DecimalError, DecimalResult};

pub(crate) const LIMB_BITS: u32 = 30;
pub(crate) const LIMB_BASE: u64 = 1 << LIMB_BITS;
pub(crate) const LIMB_MASK: u32 = (1 << LIMB_BITS) - 1;

/// Below this limb count of the *smaller* operand, multiplication uses
/// plain schoolbook accumulation.
const KARATSUBA_THRESHOLD: usize = 32;

/// Below this limb count of the divisor, division uses Knuth's Algorithm D
/// directly instead of recursing through Burnikel-Ziegler.
const BZ_THRESHOLD: usize = 64;

/// Divide-and-conquer threshold (in decimal digits) for `to_decimal_string`.
const DC_STRING_THRESHOLD: usize = 10_000;

/// An arbitrary-precision unsigned integer, stored as base-2^30 limbs.
///
/// Canonical form: the limb vector is never empty, no trailing
/// (most-significant) limb is zero except for the single-limb
/// representation of zero, and every limb lies in `[0, 2^30)`.
#[derive(Clone, Debug, Eq)]
pub struct BigUInt {
    limbs: Vec<u32>,
}

impl BigUInt {
    /// The canonical representation of zero.
    pub fn zero() -> Self {
        BigUInt { limbs: vec![0] }
    }

    /// The canonical representation of one.
    pub fn one() -> Self {
        BigUInt { limbs: vec![1] }
    }

    /// Check if this value is zero.
    ///
    /// # Returns
    ///
    /// `true` if the value is zero, `false` otherwise.
    pub fn is_zero(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == 0
    }

    /// Check if this value is one.
    ///
    /// # Returns
    ///
    /// `true` if the value is one, `false` otherwise.
    pub fn is_one(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == 1
    }

    /// Construct from a native `u64`.
    pub fn from_u64(mut v: u64) -> Self {
        if v == 0 {
            return Self::zero();
        }
        let mut limbs = Vec::new();
        while v > 0 {
            limbs.push((v & LIMB_MASK as u64) as u32);
            v >>= LIMB_BITS;
        }
        BigUInt { limbs }
    }

    /// Construct from a native `u128`.
    pub fn from_u128(mut v: u128) -> Self {
        if v == 0 {
            return Self::zero();
        }
        let mut limbs = Vec::new();
        while v > 0 {
            limbs.push((v & LIMB_MASK as u128) as u32);
            v >>= LIMB_BITS;
        }
        BigUInt { limbs }
    }

    /// Narrow to a `u128` if the value fits, otherwise `None`.
    pub fn to_u128(&self) -> Option<u128> {
        if self.bit_length() > 128 {
            return None;
        }
        let mut acc: u128 = 0;
        for &limb in self.limbs.iter().rev() {
            acc = (acc << LIMB_BITS) | limb as u128;
        }
        Some(acc)
    }

    /// Narrow to a `u64` if the value fits, otherwise `None`.
    pub fn to_u64(&self) -> Option<u64> {
        if self.limbs.len() > 3 {
            return None;
        }
        let mut acc: u128 = 0;
        for &limb in self.limbs.iter().rev() {
            acc = (acc << LIMB_BITS) | limb as u128;
        }
        u64::try_from(acc).ok()
    }

    pub(crate) fn limbs(&self) -> &[u32] {
        &self.limbs
    }

    pub(crate) fn from_limbs_vec(mut limbs: Vec<u32>) -> Self {
        if limbs.is_empty() {
            limbs.push(0);
        }
        let mut v = BigUInt { limbs };
        v.trim();
        v
    }

    fn trim(&mut self) {
        while self.limbs.len() > 1 && *self.limbs.last().unwrap() == 0 {
            self.limbs.pop();
        }
    }

    /// Number of base-2^30 limbs in the canonical representation.
    ///
    /// # Returns
    ///
    /// The limb count (always at least 1, even for zero).
    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// Total number of bits needed to represent the value (0 for zero).
    pub fn bit_length(&self) -> u32 {
        if self.is_zero() {
            return 0;
        }
        let top = *self.limbs.last().unwrap();
        (self.limbs.len() as u32 - 1) * LIMB_BITS + (32 - top.leading_zeros())
    }

    /// Number of trailing zero bits (undefined — returns 0 — for zero).
    pub fn trailing_zero_bits(&self) -> u32 {
        for (i, &limb) in self.limbs.iter().enumerate() {
            if limb != 0 {
                return i as u32 * LIMB_BITS + limb.trailing_zeros();
            }
        }
        0
    }

    /// Test a single bit, counting from the least significant bit.
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based bit position to test.
    ///
    /// # Returns
    ///
    /// `true` if the bit at `index` is set. Positions past the most
    /// significant limb read as `false`.
    pub fn bit(&self, index: u32) -> bool {
        let limb_index = (index / LIMB_BITS) as usize;
        if limb_index >= self.limbs.len() {
            return false;
        }
        (self.limbs[limb_index] >> (index % LIMB_BITS)) & 1 == 1
    }

    // ---------------------------------------------------------------
    // Comparison
    // ---------------------------------------------------------------

    /// Compare two values by magnitude.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to compare against.
    ///
    /// # Returns
    ///
    /// The `Ordering` of `self` relative to `other`.
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        if self.limbs.len() != other.limbs.len() {
            return self.limbs.len().cmp(&other.limbs.len());
        }
        for i in (0..self.limbs.len()).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                other_order => return other_order,
            }
        }
        Ordering::Equal
    }

    // ---------------------------------------------------------------
    // Addition / subtraction
    // ---------------------------------------------------------------

    /// `self + other`.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to add.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` holding the sum.
    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.iadd(other);
        result
    }

    /// Add `other` into `self` in place.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to add.
    pub fn iadd(&mut self, other: &Self) {
        let n = self.limbs.len().max(other.limbs.len());
        self.limbs.resize(n, 0);
        let mut carry: u64 = 0;
        for i in 0..n {
            let a = self.limbs[i] as u64;
            let b = *other.limbs.get(i).unwrap_or(&0) as u64;
            let sum = a + b + carry;
            self.limbs[i] = (sum & LIMB_MASK as u64) as u32;
            carry = sum >> LIMB_BITS;
        }
        if carry > 0 {
            self.limbs.push(carry as u32);
        }
        self.trim();
    }

    /// `self - other`. Fails with [`DecimalError::Underflow`] if `self < other`.
    pub fn sub(&self, other: &Self) -> DecimalResult<Self> {
        let mut result = self.clone();
        result.isub(other)?;
        Ok(result)
    }

    /// Subtract `other` from `self` in place.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to subtract.
    ///
    /// # Panics
    ///
    /// Does not panic; fails with [`DecimalError::Underflow`] instead if
    /// `self < other`.
    pub fn isub(&mut self, other: &Self) -> DecimalResult<()> {
        if self.cmp_magnitude(other) == Ordering::Less {
            return Err(DecimalError::Underflow);
        }
        let mut borrow: i64 = 0;
        for i in 0..self.limbs.len() {
            let a = self.limbs[i] as i64;
            let b = *other.limbs.get(i).unwrap_or(&0) as i64;
            let mut diff = a - b - borrow;
            if diff < 0 {
                diff += LIMB_BASE as i64;
                borrow = 1;
            } else {
                borrow = 0;
            }
            self.limbs[i] = diff as u32;
        }
        debug_assert_eq!(borrow, 0);
        self.trim();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Shifts
    // ---------------------------------------------------------------

    /// Shift left by `n` bits (multiply by `2^n`).
    ///
    /// # Arguments
    ///
    /// * `n` - Number of bit positions to shift.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` holding `self << n`.
    pub fn shl(&self, n: u32) -> Self {
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        let limb_shift = (n / LIMB_BITS) as usize;
        let bit_shift = n % LIMB_BITS;

        let mut out = vec![0u32; self.limbs.len() + limb_shift + 1];
        for (i, &limb) in self.limbs.iter().enumerate() {
            let wide = (limb as u64) << bit_shift;
            out[i + limb_shift] |= (wide & LIMB_MASK as u64) as u32;
            out[i + limb_shift + 1] |= (wide >> LIMB_BITS) as u32;
        }
        Self::from_limbs_vec(out)
    }

    /// Shift right by `n` bits (floor-divide by `2^n`).
    ///
    /// # Arguments
    ///
    /// * `n` - Number of bit positions to shift.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` holding `self >> n`. Returns zero if `n` shifts out
    /// every limb.
    pub fn shr(&self, n: u32) -> Self {
        let limb_shift = (n / LIMB_BITS) as usize;
        let bit_shift = n % LIMB_BITS;
        if limb_shift >= self.limbs.len() {
            return Self::zero();
        }
        let src = &self.limbs[limb_shift..];
        let mut out = vec![0u32; src.len()];
        for i in 0..src.len() {
            let lo = src[i] as u64 >> bit_shift;
            let hi = if bit_shift == 0 {
                0
            } else if i + 1 < src.len() {
                (src[i + 1] as u64) << (LIMB_BITS - bit_shift)
            } else {
                0
            };
            out[i] = ((lo | hi) & LIMB_MASK as u64) as u32;
        }
        Self::from_limbs_vec(out)
    }

    /// Shift `self` left by `n` bits in place.
    ///
    /// # Arguments
    ///
    /// * `n` - Number of bit positions to shift.
    pub fn ishl(&mut self, n: u32) {
        *self = self.shl(n);
    }

    /// Shift `self` right by `n` bits in place.
    ///
    /// # Arguments
    ///
    /// * `n` - Number of bit positions to shift.
    pub fn ishr(&mut self, n: u32) {
        *self = self.shr(n);
    }

    // ---------------------------------------------------------------
    // Bitwise (operate on zero-padded limb vectors; meaningful for
    // BigInt's two's-complement emulation)
    // ---------------------------------------------------------------

    /// Bitwise AND over the raw limb vectors.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to AND against.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` truncated to the shorter operand's limb count (limbs
    /// past the shorter operand's end AND to zero).
    pub fn bitand(&self, other: &Self) -> Self {
        let n = self.limbs.len().min(other.limbs.len());
        let out: Vec<u32> = (0..n).map(|i| self.limbs[i] & other.limbs[i]).collect();
        Self::from_limbs_vec(out)
    }

    /// Bitwise OR over the raw limb vectors.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to OR against.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` holding the limbwise OR, zero-padding the shorter
    /// operand.
    pub fn bitor(&self, other: &Self) -> Self {
        let n = self.limbs.len().max(other.limbs.len());
        let out: Vec<u32> = (0..n)
            .map(|i| {
                self.limbs.get(i).copied().unwrap_or(0) | other.limbs.get(i).copied().unwrap_or(0)
            })
            .collect();
        Self::from_limbs_vec(out)
    }

    /// Bitwise XOR over the raw limb vectors.
    ///
    /// # Arguments
    ///
    /// * `other` - The value to XOR against.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` holding the limbwise XOR, zero-padding the shorter
    /// operand.
    pub fn bitxor(&self, other: &Self) -> Self {
        let n = self.limbs.len().max(other.limbs.len());
        let out: Vec<u32> = (0..n)
            .map(|i| {
                self.limbs.get(i).copied().unwrap_or(0) ^ other.limbs.get(i).copied().unwrap_or(0)
            })
            .collect();
        Self::from_limbs_vec(out)
    }

    // ---------------------------------------------------------------
    // Multiplication
    // ---------------------------------------------------------------

    /// `self * other`, dispatching to schoolbook or Karatsuba multiplication
    /// based on [`KARATSUBA_THRESHOLD`].
    ///
    /// # Arguments
    ///
    /// * `other` - The multiplicand.
    ///
    /// # Returns
    ///
    /// A new `BigUInt` holding the product.
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let min_len = self.limbs.len().min(other.limbs.len());
        if min_len < KARATSUBA_THRESHOLD {
            Self::mul_schoolbook(&self.limbs, &other.limbs)
        } else {
            Self::mul_karatsuba(self, other)
        }
    }

    /// Multiply `self` by `other` in place.
    ///
    /// # Arguments
    ///
    /// * `other` - The multiplicand.
    pub fn imul(&mut self, other: &Self) {
        *self = self.mul(other);
    }

    fn mul_schoolbook(a: &[u32], b: &[u32]) -> Self {
        let mut out = vec![0u64; a.len() + b.len()];
        for (i, &ai) in a.iter().enumerate() {
            if ai == 0 {
                continue;
            }
            let mut carry: u64 = 0;
            for (j, &bj) in b.iter().enumerate() {
                let idx = i + j;
                let prod = ai as u64 * bj as u64 + out[idx] + carry;
                out[idx] = prod & LIMB_MASK as u64;
                carry = prod >> LIMB_BITS;
            }
            let mut k = i + b.len();
            while carry > 0 {
                let sum = out[k] + carry;
                out[k] = sum & LIMB_MASK as u64;
                carry = sum >> LIMB_BITS;
                k += 1;
            }
        }
        let limbs = out.into_iter().map(|x| x as u32).collect();
        Self::from_limbs_vec(limbs)
    }

    /// `a·b = A·B·β^{2k} + ((A+C)(B+D) − A·B − C·D)·β^k + C·D`
    /// where `self = A·β^k + C`, `other = B·β^k + D` — the cross term
    /// `A·D + C·B` recovered from one extra product instead of two.
    fn mul_karatsuba(a: &Self, b: &Self) -> Self {
        let n = a.limbs.len().max(b.limbs.len());
        if n.min(a.limbs.len().min(b.limbs.len())) < KARATSUBA_THRESHOLD {
            return Self::mul_schoolbook(&a.limbs, &b.limbs);
        }
        let k = n / 2;

        let (a_hi, a_lo) = split_limbs(&a.limbs, k);
        let (b_hi, b_lo) = split_limbs(&b.limbs, k);

        let a_hi = Self::from_limbs_vec(a_hi);
        let a_lo = Self::from_limbs_vec(a_lo);
        let b_hi = Self::from_limbs_vec(b_hi);
        let b_lo = Self::from_limbs_vec(b_lo);

        let z2 = Self::mul_karatsuba(&a_hi, &b_hi); // A*B
        let z0 = Self::mul_karatsuba(&a_lo, &b_lo); // C*D
        let a_sum = a_hi.add(&a_lo);
        let b_sum = b_hi.add(&b_lo);
        let z1_full = Self::mul_karatsuba(&a_sum, &b_sum); // (A+B)(C+D)
        // z1 = z1_full - z2 - z0, all non-negative by construction.
        let z1 = z1_full.sub(&z2).unwrap().sub(&z0).unwrap();

        let mut result = z0;
        result.iadd(&z1.shl_limbs(k));
        result.iadd(&z2.shl_limbs(2 * k));
        result
    }

    /// Multiply by `base^k` (shift by whole limbs; cheaper than `shl`).
    fn shl_limbs(&self, k: usize) -> Self {
        if self.is_zero() || k == 0 {
            return self.clone();
        }
        let mut out = vec![0u32; k];
        out.extend_from_slice(&self.limbs);
        Self::from_limbs_vec(out)
    }

    // ---------------------------------------------------------------
    // Division
    // ---------------------------------------------------------------

    /// `(quotient, remainder)` such that `self = quotient·other + remainder`,
    /// `0 ≤ remainder < other`. Fails with [`DecimalError::DivisionByZero`]
    /// if `other` is zero.
    pub fn divmod(&self, other: &Self) -> DecimalResult<(Self, Self)> {
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero("BigUInt::divmod"));
        }
        if self.cmp_magnitude(other) == Ordering::Less {
            return Ok((Self::zero(), self.clone()));
        }
        if other.limbs.len() == 1 {
            let (q, r) = self.divmod_small(other.limbs[0]);
            return Ok((q, Self::from_u64(r as u64)));
        }
        if other.limbs.len() <= BZ_THRESHOLD {
            Ok(Self::divmod_schoolbook(self, other))
        } else {
            Ok(Self::divmod_burnikel_ziegler(self, other))
        }
    }

    /// Single-limb divisor fast path: one 60-bit-dividend/30-bit-divisor
    /// step per limb of `self`.
    pub fn divmod_small(&self, divisor: u32) -> (Self, u32) {
        debug_assert_ne!(divisor, 0);
        let mut quotient = vec![0u32; self.limbs.len()];
        let mut rem: u64 = 0;
        for i in (0..self.limbs.len()).rev() {
            let cur = (rem << LIMB_BITS) | self.limbs[i] as u64;
            quotient[i] = (cur / divisor as u64) as u32;
            rem = cur % divisor as u64;
        }
        (Self::from_limbs_vec(quotient), rem as u32)
    }

    /// Knuth Algorithm D: schoolbook long division with a two-limb trial
    /// quotient digit and correction.
    fn divmod_schoolbook(a: &Self, b: &Self) -> (Self, Self) {
        let shift = (LIMB_BITS - 1) - highest_bit_in_limb(*b.limbs.last().unwrap());
        let u = a.shl(shift);
        let v = b.shl(shift);

        let n = v.limbs.len();
        let mut u_limbs = u.limbs.clone();
        u_limbs.resize(u_limbs.len().max(n) + 1, 0);
        let m = u_limbs.len() - n - 1;

        let mut q = vec![0u32; m + 1];
        let v_top = v.limbs[n - 1] as u64;
        let v_second = if n >= 2 { v.limbs[n - 2] as u64 } else { 0 };

        for j in (0..=m).rev() {
            let u_top = ((u_limbs[j + n] as u64) << LIMB_BITS) | u_limbs[j + n - 1] as u64;
            let mut qhat = u_top / v_top;
            let mut rhat = u_top % v_top;
            if qhat >= LIMB_BASE {
                qhat = LIMB_BASE - 1;
                rhat = u_top - qhat * v_top;
            }
            while rhat < LIMB_BASE
                && qhat * v_second > (rhat << LIMB_BITS) + if j + n >= 2 { u_limbs[j + n - 2] as u64 } else { 0 }
            {
                qhat -= 1;
                rhat += v_top;
            }

            // Multiply-and-subtract qhat*v from u[j..j+n+1].
            let mut borrow: i64 = 0;
            let mut carry: u64 = 0;
            for i in 0..n {
                let p = qhat * v.limbs[i] as u64 + carry;
                carry = p >> LIMB_BITS;
                let sub = u_limbs[j + i] as i64 - (p & LIMB_MASK as u64) as i64 - borrow;
                if sub < 0 {
                    u_limbs[j + i] = (sub + LIMB_BASE as i64) as u32;
                    borrow = 1;
                } else {
                    u_limbs[j + i] = sub as u32;
                    borrow = 0;
                }
            }
            let top = u_limbs[j + n] as i64 - carry as i64 - borrow;
            if top < 0 {
                // qhat was one too large; add v back.
                u_limbs[j + n] = (top + LIMB_BASE as i64) as u32;
                qhat -= 1;
                let mut carry2: u64 = 0;
                for i in 0..n {
                    let sum = u_limbs[j + i] as u64 + v.limbs[i] as u64 + carry2;
                    u_limbs[j + i] = (sum & LIMB_MASK as u64) as u32;
                    carry2 = sum >> LIMB_BITS;
                }
                u_limbs[j + n] = ((u_limbs[j + n] as u64 + carry2) & LIMB_MASK as u64) as u32;
            } else {
                u_limbs[j + n] = top as u32;
            }
            q[j] = qhat as u32;
        }

        let quotient = Self::from_limbs_vec(q);
        let remainder = Self::from_limbs_vec(u_limbs[..n].to_vec()).shr(shift);
        (quotient, remainder)
    }

    /// Recursive Burnikel-Ziegler division for large divisors: normalize,
    /// split the dividend into `|b|`-limb blocks, and reduce successive
    /// pairs of blocks via the `D2n1n`/`D3n2n` recursion, bottoming out at
    /// schoolbook division below [`BZ_THRESHOLD`].
    fn divmod_burnikel_ziegler(a: &Self, b: &Self) -> (Self, Self) {
        let n = b.limbs.len();
        if n <= BZ_THRESHOLD {
            return Self::divmod_schoolbook(a, b);
        }

        let shift = (LIMB_BITS - 1) - highest_bit_in_limb(*b.limbs.last().unwrap());
        let bn_val = b.shl(shift);
        let an_val = a.shl(shift);

        let mut blocks = an_val.limbs.clone();
        // Pad so the dividend splits into a whole number of n-limb blocks,
        // with at least 2 blocks, leaving room for the leading block.
        let t = ((blocks.len() + n - 1) / n).max(2);
        blocks.resize(t * n, 0);

        let bn_limbs = bn_val.limbs.clone();
        let top_two = blocks[(t - 2) * n..t * n].to_vec();
        let mut z = Self::from_limbs_vec(top_two);

        let mut q_blocks: Vec<Vec<u32>> = Vec::with_capacity(t - 1);
        let mut ri: Vec<u32> = Vec::new();
        for i in (0..t - 2).rev() {
            let (qi, r) = Self::d2n1n(&z, &bn_limbs, n);
            q_blocks.push(qi);
            ri = r;
            // Bring down the next (less significant) block: new dividend
            // is ri·β^n + block_i, i.e. block_i occupies the low n limbs.
            let mut combined = blocks[i * n..(i + 1) * n].to_vec();
            combined.resize(n, 0);
            let mut ri_padded = ri.clone();
            ri_padded.resize(n, 0);
            combined.extend_from_slice(&ri_padded);
            z = Self::from_limbs_vec(combined);
        }
        let (qi, r) = Self::d2n1n(&z, &bn_limbs, n);
        q_blocks.push(qi);
        ri = r;

        q_blocks.reverse();
        let mut q_limbs = Vec::with_capacity(q_blocks.len() * n);
        for block in q_blocks {
            let mut block = block;
            block.resize(n, 0);
            q_limbs.extend_from_slice(&block);
        }

        let quotient = Self::from_limbs_vec(q_limbs);
        let remainder = Self::from_limbs_vec(ri).shr(shift);
        (quotient, remainder)
    }

    /// Divide a `2n`-limb dividend (padded to exactly `2n` limbs) by the
    /// `n`-limb normalized divisor `b`. Returns `(quotient limbs, remainder
    /// limbs)` with quotient at most `n` limbs (the caller guarantees
    /// `a < b·β^n`).
    fn d2n1n(a: &Self, b: &[u32], n: usize) -> (Vec<u32>, Vec<u32>) {
        let mut a_limbs = a.limbs.clone();
        a_limbs.resize(2 * n, 0);

        if n % 2 == 1 || n <= BZ_THRESHOLD {
            let a_val = Self::from_limbs_vec(a_limbs);
            let b_val = Self::from_limbs_vec(b.to_vec());
            let (q, r) = Self::divmod_schoolbook(&a_val, &b_val);
            let mut rl = r.limbs;
            rl.resize(n, 0);
            return (q.limbs, rl);
        }

        let n2 = n / 2;
        // a = a1·β^{3n2} + a2·β^{2n2} + a3·β^{n2} + a4, most significant first.
        let a1 = a_limbs[3 * n2..4 * n2].to_vec();
        let a2 = a_limbs[2 * n2..3 * n2].to_vec();
        let a3 = a_limbs[n2..2 * n2].to_vec();
        let a4 = a_limbs[0..n2].to_vec();

        let a123 = concat_limbs(&[&a1, &a2, &a3]);
        let (q1, r1) = Self::d3n2n(&a123, b, n2);

        // Combine R1 (n limbs = 2·n2) with A4: new 3·n2-digit dividend is
        // R1·β^{n2} + A4, split most-significant first as [hi(R1), lo(R1), A4].
        let mut r1_padded = r1;
        r1_padded.resize(n, 0);
        let a_r1a4 = concat_limbs(&[&r1_padded[n2..], &r1_padded[..n2], &a4]);
        let (q2, r2) = Self::d3n2n(&a_r1a4, b, n2);

        let q = concat_limbs(&[&q1, &q2]);
        (q, r2)
    }

    /// Divide a `3·n2`-limb dividend by the `2·n2`-limb normalized divisor
    /// `b`, per the Burnikel-Ziegler `D3n2n` step.
    fn d3n2n(a: &[u32], b: &[u32], n2: usize) -> (Vec<u32>, Vec<u32>) {
        let mut a_limbs = a.to_vec();
        a_limbs.resize(3 * n2, 0);
        let a1 = a_limbs[2 * n2..3 * n2].to_vec();
        let a2 = a_limbs[n2..2 * n2].to_vec();
        let a3 = a_limbs[0..n2].to_vec();

        let mut b_limbs = b.to_vec();
        b_limbs.resize(2 * n2, 0);
        let b1 = b_limbs[n2..2 * n2].to_vec();
        let b2 = b_limbs[0..n2].to_vec();

        let a1_val = Self::from_limbs_vec(a1.clone());
        let b1_val = Self::from_limbs_vec(b1.clone());

        let (q, r1): (Vec<u32>, Vec<u32>) = if a1_val.cmp_magnitude(&b1_val) == Ordering::Less {
            let a12 = concat_limbs(&[&a1, &a2]);
            Self::d2n1n(&Self::from_limbs_vec(a12), &b1, n2)
        } else {
            // a1 >= b1: the quotient digit is the maximal n2-limb value
            // β^{n2} - 1. Compute the remainder as (a12 + b1) - q·b1,
            // adding before subtracting so the intermediate never goes
            // negative (a12 >= b1·β^{n2} here, so a12 + b1 >= q·b1).
            let q_max = vec![LIMB_MASK; n2];
            let q_val = Self::from_limbs_vec(q_max.clone());
            let a12 = Self::from_limbs_vec(concat_limbs(&[&a1, &a2]));
            let prod = q_val.mul(&b1_val);
            let mut r = a12.add(&b1_val);
            r = r
                .sub(&prod)
                .expect("burnikel-ziegler: a1 >= b1 implies a12+b1 >= q_max*b1");
            (q_max, r.limbs)
        };

        let mut r1_full = r1;
        r1_full.resize(n2 + n2, 0);
        let d = Self::from_limbs_vec(q.clone()).mul(&Self::from_limbs_vec(b2));
        let r1a3 = Self::from_limbs_vec(concat_limbs(&[&r1_full, &a3]));

        let mut q_val = Self::from_limbs_vec(q);
        let b_val = Self::from_limbs_vec(b_limbs);

        let r = if r1a3.cmp_magnitude(&d) != Ordering::Less {
            r1a3.sub(&d).expect("r1a3 >= d")
        } else {
            // R = r1a3 - d would be negative: add B and decrement Q until
            // non-negative. Track the positive deficit d - r1a3 instead of
            // a signed remainder.
            let mut deficit = d.sub(&r1a3).expect("d > r1a3");
            loop {
                q_val.isub(&BigUInt::one()).expect("d3n2n quotient underflow");
                if deficit.cmp_magnitude(&b_val) != Ordering::Greater {
                    break b_val.sub(&deficit).expect("b >= deficit");
                }
                deficit.isub(&b_val).expect("deficit shrinks by b");
            }
        };

        let mut r_limbs = r.limbs;
        r_limbs.resize(2 * n2, 0);
        (q_val.limbs, r_limbs)
    }

    // ---------------------------------------------------------------
    // GCD
    // ---------------------------------------------------------------

    /// Binary GCD (Stein's algorithm): factor out common powers of two,
    /// then repeatedly strip trailing zero bits and subtract the smaller
    /// from the larger.
    pub fn gcd(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let mut a = self.clone();
        let mut b = other.clone();
        let shift = a.trailing_zero_bits().min(b.trailing_zero_bits());
        a.ishr(a.trailing_zero_bits());
        loop {
            b.ishr(b.trailing_zero_bits());
            if a.cmp_magnitude(&b) == Ordering::Greater {
                std::mem::swap(&mut a, &mut b);
            }
            b.isub(&a).unwrap();
            if b.is_zero() {
                break;
            }
        }
        a.ishl(shift);
        a
    }

    // ---------------------------------------------------------------
    // Square root
    // ---------------------------------------------------------------

    /// Integer square root via Newton iteration, seeded from an `f64`
    /// approximation of the leading bits. `s·s ≤ self < (s+1)·(s+1)`.
    pub fn sqrt(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        if self.is_one() {
            return Self::one();
        }
        let bits = self.bit_length();
        let seed_bits = bits.div_ceil(2);
        let mut x = Self::one().shl(seed_bits);

        const MAX_ITERS: usize = 100;
        let mut prev: Option<Self> = None;
        for _ in 0..MAX_ITERS {
            let (q, _) = self.divmod(&x).unwrap();
            let sum = x.add(&q);
            let next = sum.shr(1);
            if let Some(p) = &prev {
                if *p == next || next.cmp_magnitude(&x) != Ordering::Less {
                    break;
                }
            }
            prev = Some(x);
            x = next;
        }
        // Final adjustment: Newton may overshoot by one on the low side.
        loop {
            let sq = x.mul(&x);
            if sq.cmp_magnitude(self) != Ordering::Greater {
                break;
            }
            x.isub(&Self::one()).unwrap();
        }
        loop {
            let next = x.add(&Self::one());
            let sq = next.mul(&next);
            if sq.cmp_magnitude(self) == Ordering::Greater {
                break;
            }
            x = next;
        }
        x
    }

    // ---------------------------------------------------------------
    // Decimal string conversion
    // ---------------------------------------------------------------

    /// Render as a plain decimal string (no leading zeros, "0" for zero).
    pub fn to_decimal_string(&self) -> String {
        let digit_estimate = (self.bit_length() as f64 * std::f64::consts::LOG10_2).ceil() as usize + 1;
        if digit_estimate > DC_STRING_THRESHOLD {
            self.to_decimal_string_dc()
        } else {
            self.to_decimal_string_small()
        }
    }

    fn to_decimal_string_small(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut chunks = Vec::new();
        let mut cur = self.clone();
        while !cur.is_zero() {
            let (q, r) = cur.divmod_small(1_000_000_000);
            chunks.push(r);
            cur = q;
        }
        let mut s = String::new();
        let last = chunks.pop().unwrap();
        s.push_str(&last.to_string());
        for chunk in chunks.into_iter().rev() {
            s.push_str(&format!("{:09}", chunk));
        }
        s
    }

    /// Recursive divide-and-conquer rendering: split by `10^k` at
    /// `k ≈ digits/2` and concatenate the halves.
    fn to_decimal_string_dc(&self) -> String {
        fn helper(n: &BigUInt, digits: usize) -> String {
            if digits <= DC_STRING_THRESHOLD || n.bit_length() < 64 {
                return n.to_decimal_string_small();
            }
            let half = digits / 2;
            let divisor = pow10(half);
            let (hi, lo) = n.divmod(&divisor).unwrap();
            let hi_str = helper(&hi, digits - half);
            let lo_str = helper(&lo, half);
            format!("{}{:0>width$}", hi_str, lo_str, width = half)
        }
        let digit_estimate = (self.bit_length() as f64 * std::f64::consts::LOG10_2).ceil() as usize + 2;
        helper(self, digit_estimate)
    }

    /// Parse a plain decimal digit-value string (no sign) into a `BigUInt`,
    /// via the inverse divide-and-conquer fold: `acc = acc·10^k + chunk`.
    pub fn from_decimal_digits(digits: &[u8]) -> Self {
        if digits.len() <= 18 {
            let mut v: u64 = 0;
            for &d in digits {
                v = v * 10 + d as u64;
            }
            return Self::from_u64(v);
        }
        let mid = digits.len() / 2;
        let (hi, lo) = digits.split_at(digits.len() - mid);
        let hi_val = Self::from_decimal_digits(hi);
        let lo_val = Self::from_decimal_digits(lo);
        let scale = pow10(mid);
        hi_val.mul(&scale).add(&lo_val)
    }
}

pub(crate) fn pow10(n: usize) -> BigUInt {
    let mut result = BigUInt::one();
    let ten = BigUInt::from_u64(10);
    let mut base = ten;
    let mut exp = n;
    while exp > 0 {
        if exp & 1 == 1 {
            result.imul(&base);
        }
        base = base.mul(&base);
        exp >>= 1;
    }
    result
}

fn highest_bit_in_limb(limb: u32) -> u32 {
    31 - limb.leading_zeros()
}

/// Split a little-endian limb slice at limb index `k`: returns
/// `(high limbs, low k limbs)` such that `value = high·β^k + low`.
fn split_limbs(limbs: &[u32], k: usize) -> (Vec<u32>, Vec<u32>) {
    if k >= limbs.len() {
        return (vec![0], limbs.to_vec());
    }
    let low = limbs[..k].to_vec();
    let high = limbs[k..].to_vec();
    (high, low)
}

/// Concatenate limb chunks most-significant-first into one little-endian
/// limb vector (i.e. the last slice passed is least significant).
fn concat_limbs(chunks: &[&[u32]]) -> Vec<u32> {
    let mut out = Vec::new();
    for chunk in chunks.iter().rev() {
        out.extend_from_slice(chunk);
    }
    out
}

impl PartialEq for BigUInt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_magnitude(other) == Ordering::Equal
    }
}

impl PartialOrd for BigUInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigUInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_magnitude(other)
    }
}

impl fmt::Display for BigUInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl std::str::FromStr for BigUInt {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecimalError::MalformedNumeric(
                "BigUInt literals must be plain unsigned decimal digits".to_string(),
            ));
        }
        let digits: Vec<u8> = s.bytes().map(|b| b - b'0').collect();
        Ok(Self::from_decimal_digits(&digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigUInt {
        s.parse().unwrap()
    }

    #[test]
    fn canonical_zero_has_single_limb() {
        let z = BigUInt::zero();
        assert_eq!(z.limbs(), &[0]);
    }

    #[test]
    fn add_basic() {
        assert_eq!(big("999999999999999999999999").add(&BigUInt::one()).to_decimal_string(), "1000000000000000000000000");
    }

    #[test]
    fn nines_plus_one_carries_fully() {
        let nines = big(&"9".repeat(100));
        let expected = format!("1{}", "0".repeat(100));
        assert_eq!(nines.add(&BigUInt::one()).to_decimal_string(), expected);
    }

    #[test]
    fn sub_underflow_errors() {
        assert!(BigUInt::one().sub(&BigUInt::from_u64(2)).is_err());
    }

    #[test]
    fn mul_matches_schoolbook_and_karatsuba() {
        let a = big(&"7".repeat(50));
        let b = big(&"3".repeat(50));
        let small = a.mul(&b);

        let a_big = big(&"123456789".repeat(40));
        let b_big = big(&"987654321".repeat(40));
        let via_mul = a_big.mul(&b_big);
        let (q, r) = via_mul.divmod(&b_big).unwrap();
        assert_eq!(q, a_big);
        assert!(r.is_zero());
        let _ = small;
    }

    #[test]
    fn divmod_euclidean_identity() {
        let a = big(&format!("{}7", "1".repeat(1199)));
        let b = big(&format!("{}3", "1".repeat(699)));
        let (q, r) = a.divmod(&b).unwrap();
        assert_eq!(q.mul(&b).add(&r), a);
        assert!(r.cmp_magnitude(&b) == Ordering::Less);
    }

    #[test]
    fn divmod_small_divisor() {
        let a = big("123456789");
        let (q, r) = a.divmod(&BigUInt::from_u64(97)).unwrap();
        assert_eq!(q.mul(&BigUInt::from_u64(97)).add(&BigUInt::from_u64(r.to_u64().unwrap())), a);
    }

    #[test]
    fn divmod_by_zero_errors() {
        assert!(BigUInt::one().divmod(&BigUInt::zero()).is_err());
    }

    #[test]
    fn gcd_basic() {
        assert_eq!(BigUInt::from_u64(12).gcd(&BigUInt::from_u64(8)), BigUInt::from_u64(4));
        assert_eq!(BigUInt::from_u64(17).gcd(&BigUInt::from_u64(5)), BigUInt::one());
    }

    #[test]
    fn sqrt_bounds() {
        for n in [0u64, 1, 2, 3, 4, 15, 16, 17, 1_000_000, 999_999_999_999] {
            let v = BigUInt::from_u64(n);
            let s = v.sqrt();
            let s_plus_1 = s.add(&BigUInt::one());
            assert!(s.mul(&s).cmp_magnitude(&v) != Ordering::Greater);
            assert!(s_plus_1.mul(&s_plus_1).cmp_magnitude(&v) == Ordering::Greater);
        }
    }

    #[test]
    fn shl_shr_roundtrip() {
        let v = big("123456789012345678901234567890");
        for n in [0u32, 1, 29, 30, 31, 61, 128] {
            assert_eq!(v.shl(n).shr(n), v);
        }
    }

    #[test]
    fn shift_matches_power_of_two() {
        let one = BigUInt::one();
        for n in [0u32, 1, 30, 60, 100, 128] {
            let shifted = one.shl(n);
            assert_eq!(shifted.bit_length(), n + 1);
        }
    }

    #[test]
    fn to_decimal_string_large() {
        let v = big(&"123456789".repeat(2000));
        let s = v.to_decimal_string();
        assert_eq!(s.len(), "123456789".len() * 2000);
        assert_eq!(s.parse::<BigUInt>().unwrap(), v);
    }

    #[test]
    fn bitwise_identities() {
        let x = big("987654321987654321");
        assert_eq!(x.bitxor(&x), BigUInt::zero());
        assert_eq!(x.bitor(&BigUInt::zero()), x);
    }
}
