//! Request parsing and validation.
//!
//! Raw `(method, date, date_to)` inputs are validated once here and turned
//! into a [`Method`] and a [`Query`]. Everything downstream works with those
//! typed values.
//!
//! Resolution is decided purely by the shape of the query:
//!
//! | `date`        | `date_to` | [`Resolution`] |
//! |---------------|-----------|----------------|
//! | `0000-00-00`  | any       | `Base`         |
//! | empty         | any       | `Latest`       |
//! | a date        | absent    | `Exact`        |
//! | a date        | a date    | `Range`        |

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Sentinel date meaning "the earliest nonzero value ever recorded".
pub const ZERO_DATE: &str = "0000-00-00";

/// The textual format of every date crossing the engine boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Method ──────────────────────────────────────────────────────────────────

/// A series operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
  /// Raw observations (`get_value`, also accepted as `get_primitive`).
  Value,
  /// Observations normalised against the series' base value (`get_index`).
  Index,
}

impl Method {
  /// The canonical procedure name.
  pub fn name(self) -> &'static str {
    match self {
      Self::Value => "get_value",
      Self::Index => "get_index",
    }
  }
}

impl FromStr for Method {
  type Err = Error;

  fn from_str(name: &str) -> Result<Self> {
    match name.to_ascii_lowercase().as_str() {
      "get_value" | "get_primitive" => Ok(Self::Value),
      "get_index" => Ok(Self::Index),
      _ => Err(Error::UnknownMethod(name.to_owned())),
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// The `date` half of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelector {
  /// The zero-date sentinel: earliest nonzero value.
  Earliest,
  /// The empty date: most recent value.
  Latest,
  On(NaiveDate),
}

/// How a query is resolved against a backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Base,
  Latest,
  Exact(NaiveDate),
  Range { from: NaiveDate, to: NaiveDate },
}

/// A validated `(date, date_to)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
  pub date:    DateSelector,
  pub date_to: Option<NaiveDate>,
}

impl Query {
  pub fn latest() -> Self { Self { date: DateSelector::Latest, date_to: None } }

  pub fn earliest() -> Self {
    Self { date: DateSelector::Earliest, date_to: None }
  }

  pub fn on(date: NaiveDate) -> Self {
    Self { date: DateSelector::On(date), date_to: None }
  }

  /// A closed range `[from, to]`. Fails if `to` precedes `from`.
  pub fn range(from: NaiveDate, to: NaiveDate) -> Result<Self> {
    if to < from {
      return Err(Error::DateRangeInverted { from, to });
    }
    Ok(Self { date: DateSelector::On(from), date_to: Some(to) })
  }

  /// Parse textual arguments. An empty `date` selects the latest value; an
  /// empty or absent `date_to` means a single-point query.
  pub fn parse(date: &str, date_to: Option<&str>) -> Result<Self> {
    let selector = match date {
      "" => DateSelector::Latest,
      ZERO_DATE => DateSelector::Earliest,
      other => DateSelector::On(parse_date(other)?),
    };

    let date_to = match date_to {
      None | Some("") => None,
      Some(s) => Some(parse_date(s)?),
    };

    if let (DateSelector::On(from), Some(to)) = (selector, date_to)
      && to < from
    {
      return Err(Error::DateRangeInverted { from, to });
    }

    Ok(Self { date: selector, date_to })
  }

  /// Parse the untyped positional argument list of a procedure call:
  /// exactly `[date, date_to]`, where `date` is a string and `date_to` is a
  /// string or null.
  pub fn from_args(args: &[Value]) -> Result<Self> {
    if args.len() != 2 {
      return Err(Error::InvalidArgumentArity { expected: 2, got: args.len() });
    }

    let date = match &args[0] {
      Value::String(s) => s.as_str(),
      other => {
        return Err(Error::InvalidArgumentType {
          argument: "date",
          expected: "string",
          got:      json_type_name(other),
        });
      }
    };

    let date_to = match &args[1] {
      Value::Null => None,
      Value::String(s) => Some(s.as_str()),
      other => {
        return Err(Error::InvalidArgumentType {
          argument: "date_to",
          expected: "string or null",
          got:      json_type_name(other),
        });
      }
    };

    Self::parse(date, date_to)
  }

  pub fn resolution(&self) -> Resolution {
    match (self.date, self.date_to) {
      (DateSelector::Earliest, _) => Resolution::Base,
      (DateSelector::Latest, _) => Resolution::Latest,
      (DateSelector::On(date), None) => Resolution::Exact(date),
      (DateSelector::On(from), Some(to)) => Resolution::Range { from, to },
    }
  }

  pub fn is_single_point(&self) -> bool { self.date_to.is_none() }
}

impl fmt::Display for Query {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.date {
      DateSelector::Earliest => f.write_str(ZERO_DATE)?,
      DateSelector::Latest => f.write_str("latest")?,
      DateSelector::On(d) => write!(f, "{}", d.format(DATE_FORMAT))?,
    }
    if let Some(to) = self.date_to {
      write!(f, "..{}", to.format(DATE_FORMAT))?;
    }
    Ok(())
  }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  let bytes = s.as_bytes();
  let shaped = bytes.len() == 10
    && bytes[4] == b'-'
    && bytes[7] == b'-'
    && bytes
      .iter()
      .enumerate()
      .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
  if !shaped {
    return Err(Error::InvalidDateFormat(s.to_owned()));
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|_| Error::InvalidDateFormat(s.to_owned()))
}

fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::ErrorKind;

  fn d(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  #[test]
  fn method_names() {
    assert_eq!("get_value".parse::<Method>().unwrap(), Method::Value);
    assert_eq!("GET_PRIMITIVE".parse::<Method>().unwrap(), Method::Value);
    assert_eq!("get_index".parse::<Method>().unwrap(), Method::Index);
    assert_eq!(
      "get_change".parse::<Method>().unwrap_err().kind(),
      ErrorKind::UnknownMethod
    );
  }

  #[test]
  fn resolution_follows_input_shape() {
    assert_eq!(Query::parse(ZERO_DATE, None).unwrap().resolution(), Resolution::Base);
    assert_eq!(Query::parse("", None).unwrap().resolution(), Resolution::Latest);
    assert_eq!(
      Query::parse("", Some("2024-01-02")).unwrap().resolution(),
      Resolution::Latest
    );
    assert_eq!(
      Query::parse("2024-01-01", Some("")).unwrap().resolution(),
      Resolution::Exact(d("2024-01-01"))
    );
    assert_eq!(
      Query::parse("2024-01-01", Some("2024-01-31")).unwrap().resolution(),
      Resolution::Range { from: d("2024-01-01"), to: d("2024-01-31") }
    );
  }

  #[test]
  fn malformed_dates_are_rejected() {
    for bad in ["2024-1-01", "2024/01/01", "20240101", "2024-02-30", "yesterday"] {
      assert_eq!(
        Query::parse(bad, None).unwrap_err().kind(),
        ErrorKind::InvalidDateFormat,
        "{bad}"
      );
    }
    assert_eq!(
      Query::parse("2024-01-01", Some("2024-13-01")).unwrap_err().kind(),
      ErrorKind::InvalidDateFormat
    );
    // The sentinel is only meaningful as `date`.
    assert_eq!(
      Query::parse("2024-01-01", Some(ZERO_DATE)).unwrap_err().kind(),
      ErrorKind::InvalidDateFormat
    );
  }

  #[test]
  fn inverted_range_is_rejected() {
    let err = Query::parse("2024-02-01", Some("2024-01-01")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DateRangeInverted);

    let same_day = Query::parse("2024-02-01", Some("2024-02-01")).unwrap();
    assert_eq!(same_day.date_to, Some(d("2024-02-01")));
  }

  #[test]
  fn untyped_args() {
    let q = Query::from_args(&[json!("2024-01-01"), json!(null)]).unwrap();
    assert_eq!(q, Query::on(d("2024-01-01")));

    let q = Query::from_args(&[json!("2024-01-01"), json!("2024-01-05")]).unwrap();
    assert_eq!(q, Query::range(d("2024-01-01"), d("2024-01-05")).unwrap());

    assert_eq!(
      Query::from_args(&[json!("2024-01-01")]).unwrap_err().kind(),
      ErrorKind::InvalidArgumentArity
    );
    assert_eq!(
      Query::from_args(&[json!(20240101), json!(null)]).unwrap_err().kind(),
      ErrorKind::InvalidArgumentType
    );
    assert_eq!(
      Query::from_args(&[json!(""), json!(5)]).unwrap_err().kind(),
      ErrorKind::InvalidArgumentType
    );
  }

  #[test]
  fn display_is_stable() {
    let q = Query::range(d("2024-01-01"), d("2024-01-05")).unwrap();
    assert_eq!(q.to_string(), "2024-01-01..2024-01-05");
    assert_eq!(Query::latest().to_string(), "latest");
  }
}
