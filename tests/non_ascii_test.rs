use decicore::BigDecimal;

#[test]
fn grouping_separators_are_ignored_between_digits() {
    let a: BigDecimal = "1_000_000".parse().unwrap();
    let b: BigDecimal = "1,000,000".parse().unwrap();
    let c: BigDecimal = "1 000 000".parse().unwrap();
    let expected: BigDecimal = "1000000".parse().unwrap();
    assert_eq!(a, expected);
    assert_eq!(b, expected);
    assert_eq!(c, expected);
}

#[test]
fn separator_cannot_close_a_literal() {
    assert!("123_".parse::<BigDecimal>().is_err());
    assert!("123,".parse::<BigDecimal>().is_err());
}

#[test]
fn scientific_notation_round_trips_through_the_parser() {
    let a: BigDecimal = "1.5e3".parse().unwrap();
    assert_eq!(a, "1500".parse::<BigDecimal>().unwrap());

    let b: BigDecimal = "2.5E-2".parse().unwrap();
    assert_eq!(b, "0.025".parse::<BigDecimal>().unwrap());
}

#[test]
fn non_ascii_bytes_are_rejected_rather_than_silently_dropped() {
    assert!("1\u{00A0}234".parse::<BigDecimal>().is_err());
    assert!("café".parse::<BigDecimal>().is_err());
    assert!("一二三".parse::<BigDecimal>().is_err());
}

#[test]
fn grouping_preserved_through_to_string_with_separators() {
    let a: BigDecimal = "1234567.89".parse().unwrap();
    assert_eq!(a.to_string_with_separators("_"), "1_234_567.89");
}
