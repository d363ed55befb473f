/*!
Arbitrary-precision and fixed-width decimal arithmetic.

This crate provides a small stack of numeric types built from the
ground up on base-2^30 limb arithmetic:

- [`BigUInt`](biguint::BigUInt) — arbitrary-precision unsigned integer
  (schoolbook/Karatsuba multiplication, Knuth Algorithm D and
  Burnikel-Ziegler division, binary GCD, Newton's-method square root).
- [`BigInt`](bigint::BigInt) — signed arbitrary-precision integer with
  Python-style floor division and two's-complement-emulated bitwise ops.
- [`BigDecimal`](bigdecimal::BigDecimal) — variable-precision decimal
  (a `BigInt` coefficient plus a signed scale), with correctly-rounded
  arithmetic and `exp`/`ln`/`power`/`sqrt`.
- [`Decimal128`](decimal128::Decimal128) — fixed-width 96-bit-coefficient
  decimal for the hot paths a heap-allocated coefficient is overkill
  for; its arithmetic lowers onto the same `BigInt`/`BigUInt` engine.

None of these types do I/O, hold interior mutability, or talk to the
network or filesystem — every public operation is a pure function from
inputs to a `Result<T, DecimalError>`.

## Example

```rust
use decicore::BigDecimal;

let a: BigDecimal = "100".parse().unwrap();
let b: BigDecimal = "12".parse().unwrap();
let divisor: BigDecimal = "17".parse().unwrap();
let frac = "23".parse::<BigDecimal>().unwrap().divide(&divisor, 50).unwrap();
let result = a.mul(&b).sub(&frac);
assert_eq!(result.to_string(), "1198.64705882352941176470588235294117647058823529411765");
```
*/

pub mod bigdecimal;
pub mod bigint;
pub mod biguint;
pub mod constants;
pub mod decimal128;
pub mod error;
pub mod evaluate;
pub mod parse;
pub mod rounding;

pub use bigdecimal::BigDecimal;
pub use bigint::BigInt;
pub use biguint::BigUInt;
pub use decimal128::Decimal128;
pub use error::{DecimalError, DecimalResult};
pub use evaluate::evaluate;
pub use parse::{parse_numeric, ParsedNumber};
pub use rounding::RoundingPolicy;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_level_types_interoperate() {
        let a: BigDecimal = "100".parse().unwrap();
        let b: BigDecimal = "12".parse().unwrap();
        let frac: BigDecimal = "23".parse::<BigDecimal>().unwrap()
            .divide(&"17".parse::<BigDecimal>().unwrap(), 50)
            .unwrap();
        let result = a.mul(&b).sub(&frac);
        assert_eq!(
            result.to_string(),
            "1198.64705882352941176470588235294117647058823529411765"
        );
    }

    #[test]
    fn evaluate_matches_direct_composition() {
        let via_evaluate = evaluate("100 * 12 - 23/17", 50).unwrap();
        let expected: BigDecimal = "1198.64705882352941176470588235294117647058823529411765"
            .parse()
            .unwrap();
        assert_eq!(via_evaluate, expected);
    }

    #[test]
    fn decimal128_and_bigdecimal_agree_on_small_values() {
        let fixed: Decimal128 = "1.50".parse().unwrap();
        let variable: BigDecimal = "1.50".parse().unwrap();
        assert_eq!(fixed.to_string(), variable.to_string());
    }
}
