//! Integer-only fraction arithmetic.
//!
//! Weights go through [`fraction`], which multiplies in arbitrary precision
//! and divides euclidean-style: the remainder is never negative, so for a
//! positive denominator the quotient is the floor. Index values go through
//! [`fraction_toward_zero`], which truncates like plain integer division.
//! Neither rounds; both reproduce historical values exactly.

use num_bigint::BigInt;
use num_traits::{Signed as _, ToPrimitive as _};

use crate::{Error, Result};

/// Multiplier applied to both sides of a weight fraction to keep three extra
/// decimal digits through the integer division.
pub const PRECISION_MAGNIFIER: i64 = 1_000;

/// `current * INDEX_SCALE / base` is the conventional percentage index
/// (×100) carried with three extra decimal digits (×1000).
pub const INDEX_SCALE: i64 = 100_000;

/// Compute `value * numerator / denominator` with euclidean division, i.e.
/// `floor(value * numerator / denominator)` when the denominator is positive.
///
/// The product is formed in arbitrary precision, so it never overflows. The
/// quotient must fit in an `i64`.
pub fn fraction(value: i64, numerator: i64, denominator: i64) -> Result<i64> {
  let (mut quotient, remainder) = divide(value, numerator, denominator)?;
  if remainder.is_negative() {
    if denominator > 0 {
      quotient -= 1;
    } else {
      quotient += 1;
    }
  }
  quotient.to_i64().ok_or(Error::Overflow)
}

/// Compute `value * numerator / denominator`, truncating toward zero.
pub fn fraction_toward_zero(value: i64, numerator: i64, denominator: i64) -> Result<i64> {
  let (quotient, _) = divide(value, numerator, denominator)?;
  quotient.to_i64().ok_or(Error::Overflow)
}

/// Truncating quotient and remainder of the exact product.
fn divide(value: i64, numerator: i64, denominator: i64) -> Result<(BigInt, BigInt)> {
  if denominator == 0 {
    return Err(Error::DivisionByZero);
  }

  let product = BigInt::from(value) * BigInt::from(numerator);
  let denominator = BigInt::from(denominator);
  Ok((&product / &denominator, &product % &denominator))
}
