//! # String Validators
//!
//! Side-constraints shared by the service schemas. Each function returns a
//! [`Validator`] meant to be attached to a string field with
//! [`FieldExt::validated_by`]; the field's own type check runs first, so the
//! validators only ever see strings in practice.
//!
//! Dates and times are checked with `chrono`, URLs with `url`.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use doolally_core::{Field, FieldExt, StringField, Validator};
use url::Url;

/// Wrap a check over `&str` as a [`Validator`]. The check returns the
/// rejection message.
fn string_check<F>(check: F) -> Validator
where
    F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
{
    Validator::from_fn(move |ctx, value| {
        let Some(text) = value.as_str() else {
            return Err(ctx.type_error("expected type in (string)"));
        };
        check(text).map_err(|message| ctx.value_error(message))
    })
}

/// Even-length string of hex digits (either case).
pub fn hexstring() -> Validator {
    string_check(|text| {
        if is_hexstring(text) {
            Ok(())
        } else {
            Err("expected hexstring".to_string())
        }
    })
}

fn is_hexstring(text: &str) -> bool {
    text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// A string of exactly `len` hex digits, e.g. a 32-digit session id.
pub fn hexstring_of_length(len: usize) -> Field {
    StringField::new()
        .min_length(len)
        .max_length(len)
        .validated_by(hexstring())
}

/// `name@domain.tld` with a single `@`, no empty domain labels, and labels
/// and name starting with a letter, digit or `-` (`.` is also allowed to
/// start the name).
pub fn email_address() -> Validator {
    string_check(|text| check_email(text).map_err(str::to_string))
}

fn check_email(text: &str) -> Result<(), &'static str> {
    let mut parts = text.split('@');
    let (Some(name), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected exactly one @ in email address");
    };

    for label in domain.split('.') {
        let Some(first) = label.chars().next() else {
            return Err("repeated . not allowed in email domain");
        };
        if !(first.is_ascii_alphanumeric() || first == '-') {
            return Err("subdomain in email not valid");
        }
    }

    match name.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '-' || c == '.' => Ok(()),
        _ => Err("invalid name in email address"),
    }
}

/// Digits only, optionally prefixed with `+`.
pub fn phone_number() -> Validator {
    string_check(|text| {
        if text.is_empty() {
            return Err("empty phone number not allowed".to_string());
        }
        let digits = text.strip_prefix('+').unwrap_or(text);
        if digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err("invalid character in phone number".to_string())
        }
    })
}

fn date_format(format: &'static str) -> Validator {
    string_check(move |text| {
        NaiveDate::parse_from_str(text, format)
            .map(drop)
            .map_err(|err| format!("date {text} does not match {format}: {err}"))
    })
}

/// `2024-03-01`, as produced by a browser date input.
pub fn javascript_date() -> Validator {
    date_format("%Y-%m-%d")
}

/// `01 Mar 2024`.
pub fn date() -> Validator {
    date_format("%d %b %Y")
}

/// `Fri 01 Mar 2024`. The weekday must match the date.
pub fn event_date() -> Validator {
    date_format("%a %d %b %Y")
}

/// `14:30`, 24-hour clock.
pub fn time_of_day() -> Validator {
    string_check(|text| {
        NaiveTime::parse_from_str(text, "%H:%M")
            .map(drop)
            .map_err(|err| format!("time {text} does not match %H:%M: {err}"))
    })
}

/// An ISO 8601 date or date-time, with or without an offset.
pub fn iso_timestamp() -> Validator {
    string_check(|text| {
        if is_iso_timestamp(text) {
            Ok(())
        } else {
            Err(format!("invalid isoformat string: {text:?}"))
        }
    })
}

fn is_iso_timestamp(text: &str) -> bool {
    const NAIVE: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    DateTime::parse_from_rfc3339(text).is_ok()
        || NAIVE
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// An absolute `https://` URL with a host.
pub fn https_url() -> Validator {
    string_check(|text| {
        let url = Url::parse(text).map_err(|err| format!("invalid url: {err}"))?;
        if !url.scheme().eq_ignore_ascii_case("https") {
            return Err("url scheme must be https".to_string());
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err("empty url domain".to_string());
        }
        Ok(())
    })
}

/// Accept only values in `allowed`; anything else is rejected with
/// `"{message} {value}"`.
pub fn one_of<I, S>(message: &'static str, allowed: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: BTreeSet<String> = allowed.into_iter().map(Into::into).collect();
    string_check(move |text| {
        if allowed.contains(text) {
            Ok(())
        } else {
            Err(format!("{message} {text}"))
        }
    })
}
