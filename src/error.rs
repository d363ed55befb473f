//! Error taxonomy shared across the numeric core.

use thiserror::Error;

/// Every way an operation in this crate can fail.
///
/// Variants map directly onto the failure kinds produced by the parser,
/// the big-integer engine, and the two decimal layers built on top of it.
/// Nothing in the public API panics on bad *input*; panics remain reserved
/// for violated internal invariants (a canonicalization bug, not a caller
/// mistake).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    /// A numeric string failed validation during parsing.
    #[error("malformed numeric literal: {0}")]
    MalformedNumeric(String),

    /// The divisor of an operation was zero.
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    /// An operation received an argument outside its mathematical domain
    /// (square root of a negative number, logarithm of a non-positive
    /// number, a negative base raised to a non-integer exponent, ...).
    #[error("domain error in {op}: {detail}")]
    DomainError { op: &'static str, detail: String },

    /// A fixed-width [`Decimal128`](crate::decimal128::Decimal128) operation
    /// produced a value that cannot be represented in 96 bits / 29 digits.
    #[error("overflow in {0}")]
    Overflow(&'static str),

    /// Internal: an unsigned subtraction would have gone negative. Always
    /// intercepted by [`BigInt`](crate::bigint::BigInt) before reaching a
    /// caller.
    #[error("underflow: minuend is smaller than subtrahend")]
    Underflow,

    /// [`mod_inverse`](crate::bigint::BigInt::mod_inverse) was asked for the
    /// inverse of a value that shares a nontrivial factor with the modulus.
    #[error("{0} has no inverse modulo {1}: gcd is not 1")]
    NotInvertible(String, String),

    /// An argument violated a documented precondition (e.g. a negative
    /// exponent passed to `mod_pow`, a non-positive modulus).
    #[error("invalid argument in {op}: {detail}")]
    InvalidArgument { op: &'static str, detail: String },
}

impl DecimalError {
    pub(crate) fn domain(op: &'static str, detail: impl Into<String>) -> Self {
        DecimalError::DomainError { op, detail: detail.into() }
    }

    pub(crate) fn invalid(op: &'static str, detail: impl Into<String>) -> Self {
        DecimalError::InvalidArgument { op, detail: detail.into() }
    }
}

pub type DecimalResult<T> = Result<T, DecimalError>;
