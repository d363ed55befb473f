use decicore::{evaluate, BigDecimal, BigInt, BigUInt, Decimal128};

#[test]
fn zero_coefficient_never_reports_negative() {
    let a: BigInt = "-5".parse().unwrap();
    let b: BigInt = "5".parse().unwrap();
    assert!(!a.add(&b).is_negative());

    let d: Decimal128 = "-3.00".parse().unwrap();
    let e: Decimal128 = "3.00".parse().unwrap();
    assert!(!d.add(&e).unwrap().is_negative());
}

#[test]
fn division_by_zero_is_an_error_everywhere() {
    assert!(BigUInt::one().divmod(&BigUInt::zero()).is_err());
    assert!("1".parse::<BigInt>().unwrap().div_floor(&BigInt::zero()).is_err());
    assert!("1".parse::<BigDecimal>().unwrap().divide(&BigDecimal::zero(), 10).is_err());
    assert!("1".parse::<Decimal128>().unwrap().divide(&Decimal128::zero()).is_err());
    assert!(evaluate("1/0", 10).is_err());
}

#[test]
fn sqrt_and_ln_reject_out_of_domain_arguments() {
    let negative: BigDecimal = "-1".parse().unwrap();
    assert!(negative.sqrt(10).is_err());
    assert!(negative.ln(10).is_err());
    assert!(BigDecimal::zero().ln(10).is_err());
    assert!(evaluate("sqrt(-4)", 10).is_err());
}

#[test]
fn decimal128_overflow_on_coefficient_too_wide() {
    let huge = "9".repeat(40);
    assert!(huge.parse::<Decimal128>().is_err());

    let near_max = Decimal128::from_parts(decicore::decimal128::MAX_COEF, 0, false).unwrap();
    assert!(near_max.mul(&near_max).is_err());
}

#[test]
fn decimal128_scale_cannot_exceed_max() {
    assert!(Decimal128::from_parts(1, 29, false).is_err());
    assert!(Decimal128::from_parts(1, 28, false).is_ok());
}

#[test]
fn mod_inverse_fails_without_coprimality() {
    let a: BigInt = "4".parse().unwrap();
    let m: BigInt = "8".parse().unwrap();
    assert!(a.mod_inverse(&m).is_err());
}

#[test]
fn malformed_numeric_literals_are_rejected() {
    assert!("".parse::<BigDecimal>().is_err());
    assert!("12.34.56".parse::<BigDecimal>().is_err());
    assert!("--5".parse::<BigInt>().is_err());
    assert!("1.5".parse::<BigInt>().is_err());
}
