//! Field validators for editor input.
//!
//! Each checker maps one raw input string to a typed normalized value or a
//! format error whose `Display` is the message shown to the user. Checkers
//! never panic; the empty string never reaches a checker because an empty
//! cell means "leave unset".

use chrono::{Datelike, NaiveDate};
use std::fmt;
use thiserror::Error;

use crate::model::BIRTHDAY_FORMAT;

/// Why an entered value was rejected. The messages are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("use only alphanumeric symbols and spaces in names")]
    BadName,
    #[error("enter 11 digits, or 12 characters starting with +7")]
    BadPhoneNumber,
    #[error("enter the date in the format {0}")]
    BadBirthday(&'static str),
    #[error("enter an integer number")]
    BadInteger,
    #[error("enter one age, or an interval from-to with from <= to")]
    BadAgeRange,
}

/// A validated, normalized field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Bool(bool),
    AgeRange { from: u32, to: u32 },
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_age_range(&self) -> Option<(u32, u32)> {
        match self {
            FieldValue::AgeRange { from, to } => Some((*from, *to)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            FieldValue::AgeRange { from, to } if from == to => write!(f, "{from}"),
            FieldValue::AgeRange { from, to } => write!(f, "{from}-{to}"),
        }
    }
}

/// Which checker applies to an editor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    PhoneNumber,
    BirthdayFull,
    /// Day-month only; used by the search form.
    BirthdayShort,
    Integer,
    Boolean,
    /// Single age or inclusive `from-to` interval.
    Age,
    /// Pass-through, for description fields.
    FreeText,
}

impl FieldKind {
    pub fn check(self, raw: &str) -> Result<FieldValue, FieldError> {
        match self {
            FieldKind::Name => check_name(raw),
            FieldKind::PhoneNumber => check_number(raw),
            FieldKind::BirthdayFull => check_birthday_full(raw),
            FieldKind::BirthdayShort => check_birthday_short(raw),
            FieldKind::Integer => check_int(raw),
            FieldKind::Boolean => Ok(check_bool(raw)),
            FieldKind::Age => check_age(raw),
            FieldKind::FreeText => Ok(FieldValue::Text(raw.to_string())),
        }
    }
}

/// Trim, require every space-separated token to be alphanumeric, and
/// capitalize the first character.
fn check_name(raw: &str) -> Result<FieldValue, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::BadName);
    }
    for token in trimmed.split(' ') {
        if !token.chars().all(char::is_alphanumeric) {
            return Err(FieldError::BadName);
        }
    }
    let mut chars = trimmed.chars();
    let first = chars.next().expect("non-empty after trim");
    let name = first.to_uppercase().chain(chars).collect();
    Ok(FieldValue::Text(name))
}

/// Accept exactly 11 digits, or a 12-character `+7...` form which is
/// rewritten to the domestic leading-8 form.
fn check_number(raw: &str) -> Result<FieldValue, FieldError> {
    let trimmed = raw.trim();
    let number = if trimmed.len() == 12 && trimmed.starts_with("+7") {
        format!("8{}", &trimmed[2..])
    } else {
        trimmed.to_string()
    };
    if number.len() == 11 && number.chars().all(|c| c.is_ascii_digit()) {
        Ok(FieldValue::Text(number))
    } else {
        Err(FieldError::BadPhoneNumber)
    }
}

fn check_birthday_full(raw: &str) -> Result<FieldValue, FieldError> {
    let date = NaiveDate::parse_from_str(raw.trim(), BIRTHDAY_FORMAT)
        .map_err(|_| FieldError::BadBirthday("dd-mm-yyyy"))?;
    Ok(FieldValue::Text(date.format(BIRTHDAY_FORMAT).to_string()))
}

/// Day-month only. Validated against a leap year so `29-02` is a legal
/// birthday; normalized to zero-padded `dd-mm`.
fn check_birthday_short(raw: &str) -> Result<FieldValue, FieldError> {
    let date = NaiveDate::parse_from_str(&format!("{}-2000", raw.trim()), BIRTHDAY_FORMAT)
        .map_err(|_| FieldError::BadBirthday("dd-mm"))?;
    Ok(FieldValue::Text(format!(
        "{:02}-{:02}",
        date.day(),
        date.month()
    )))
}

fn check_int(raw: &str) -> Result<FieldValue, FieldError> {
    raw.trim()
        .parse::<i64>()
        .map(FieldValue::Int)
        .map_err(|_| FieldError::BadInteger)
}

/// `"0"` means false; any other non-empty input means true. The empty case
/// is handled upstream as "unset".
fn check_bool(raw: &str) -> FieldValue {
    FieldValue::Bool(raw.trim() != "0")
}

fn check_age(raw: &str) -> Result<FieldValue, FieldError> {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    let bounds: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| FieldError::BadAgeRange)?;
    match bounds.as_slice() {
        [age] => Ok(FieldValue::AgeRange {
            from: *age,
            to: *age,
        }),
        [from, to] if from <= to => Ok(FieldValue::AgeRange {
            from: *from,
            to: *to,
        }),
        _ => Err(FieldError::BadAgeRange),
    }
}
