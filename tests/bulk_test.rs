use decicore::{evaluate, BigDecimal, BigInt, BigUInt, RoundingPolicy};

#[test]
fn bigdecimal_arithmetic_round_trips_through_many_scales() {
    let cases: Vec<(&str, &str, &str)> = vec![
        ("1", "1", "2"),
        ("0.1", "0.2", "0.3"),
        ("123456789012345678901234567890", "1", "123456789012345678901234567891"),
        ("-5.5", "5.5", "0"),
        ("1000000.000001", "0.000001", "1000000.000002"),
    ];
    for (a, b, expected) in cases {
        let a: BigDecimal = a.parse().unwrap();
        let b: BigDecimal = b.parse().unwrap();
        let expected: BigDecimal = expected.parse().unwrap();
        assert_eq!(a.add(&b), expected, "{} + {}", a, b);
    }
}

#[test]
fn biguint_multiplication_matches_division_inverse_across_sizes() {
    for digits in [1usize, 5, 37, 101, 500, 2000] {
        let a: BigUInt = "7".repeat(digits).parse().unwrap();
        let b: BigUInt = "3".repeat(digits).parse().unwrap();
        let product = a.mul(&b);
        let (q, r) = product.divmod(&b).unwrap();
        assert_eq!(q, a);
        assert!(r.is_zero());
    }
}

#[test]
fn bigint_gcd_lcm_consistency() {
    let cases = [(48, 18), (-48, 18), (0, 5), (17, 5), (-100, -75)];
    for (a, b) in cases {
        let a = BigInt::from_i64(a);
        let b = BigInt::from_i64(b);
        let g = a.gcd(&b);
        if !a.is_zero() && !b.is_zero() {
            let l = a.lcm(&b).unwrap();
            assert_eq!(g.mul(&l), a.abs().mul(&b.abs()));
        }
    }
}

#[test]
fn evaluate_composes_every_documented_function() {
    let scenarios: Vec<(&str, &str, u32)> = vec![
        ("2 + 3 * 4 - 1", "13", 10),
        ("(2 + 3) * 4", "20", 10),
        ("2 ^ 10", "1024", 10),
        ("sqrt(16)", "4", 10),
        ("cbrt(27)", "3", 10),
        ("root(32, 5)", "2", 10),
        ("abs(-42.5)", "42.5", 10),
        ("exp(0)", "1", 10),
    ];
    for (expr, expected, precision) in scenarios {
        let got = evaluate(expr, precision).unwrap();
        let expected: BigDecimal = expected.parse().unwrap();
        assert_eq!(got, expected, "evaluating '{}'", expr);
    }
}

#[test]
fn rounding_policies_disagree_at_the_same_tie() {
    let half: BigDecimal = "2.5".parse().unwrap();
    assert_eq!(half.round(0, RoundingPolicy::HalfEven), "2".parse::<BigDecimal>().unwrap());
    assert_eq!(half.round(0, RoundingPolicy::HalfUp), "3".parse::<BigDecimal>().unwrap());
    assert_eq!(half.round(0, RoundingPolicy::Down), "2".parse::<BigDecimal>().unwrap());
    assert_eq!(half.round(0, RoundingPolicy::Up), "3".parse::<BigDecimal>().unwrap());
    assert_eq!(half.round(0, RoundingPolicy::Ceiling), "3".parse::<BigDecimal>().unwrap());
    assert_eq!(half.round(0, RoundingPolicy::Floor), "2".parse::<BigDecimal>().unwrap());

    let neg_half: BigDecimal = "-2.5".parse().unwrap();
    assert_eq!(neg_half.round(0, RoundingPolicy::Ceiling), "-2".parse::<BigDecimal>().unwrap());
    assert_eq!(neg_half.round(0, RoundingPolicy::Floor), "-3".parse::<BigDecimal>().unwrap());
}
