//! Validators shared by every form.

use url::Url;

use crate::form::Value;
use crate::validation::errors::RuleError;
use crate::validation::pipeline::RuleContext;
use crate::validation::validators::{fail, ValidatorError};

pub fn required(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    if value.is_empty() {
        return fail(format!("{} is required", key));
    }
    ctx.set_working(Value::String(value.to_string()));
    Ok(())
}

pub fn int(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    match value.parse::<i64>() {
        Ok(number) => {
            ctx.set_working(Value::Int(number));
            Ok(())
        }
        Err(_) => fail(format!("{} value must be an integer", key)),
    }
}

pub fn string(ctx: &mut RuleContext<'_>, _key: &str, value: &str) -> Result<(), ValidatorError> {
    ctx.set_working(Value::String(value.to_string()));
    Ok(())
}

/// Lower bound: character count for strings, numeric value for integers.
pub fn min(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let bound = parse_bound("min", key, value)?;
    match ctx.working() {
        Some(Value::String(s)) if (s.chars().count() as i64) < bound => {
            fail(format!("{} must have at least {} characters", key, bound))
        }
        Some(Value::Int(n)) if *n < bound => fail(format!("{} cannot be less than {}", key, bound)),
        Some(Value::String(_)) | Some(Value::Int(_)) => Ok(()),
        other => Err(unsupported("min", key, other)),
    }
}

/// Upper bound: character count for strings, numeric value for integers.
pub fn max(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let bound = parse_bound("max", key, value)?;
    match ctx.working() {
        Some(Value::String(s)) if (s.chars().count() as i64) > bound => {
            fail(format!("{} cannot be longer than {} characters", key, bound))
        }
        Some(Value::Int(n)) if *n > bound => fail(format!("{} cannot be greater than {}", key, bound)),
        Some(Value::String(_)) | Some(Value::Int(_)) => Ok(()),
        other => Err(unsupported("max", key, other)),
    }
}

/// Marks the rest of the field as skipped when the input is empty.
pub fn optional(ctx: &mut RuleContext<'_>, _key: &str, value: &str) -> Result<(), ValidatorError> {
    if value.is_empty() {
        ctx.set_skip_remaining(true);
    }
    ctx.set_working(Value::String(value.to_string()));
    Ok(())
}

/// Absolute url whose host has a dot that is neither first nor last.
pub fn url(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let parsed = match Url::parse(value) {
        Ok(parsed) => parsed,
        Err(_) => return fail(format!("{} is not a valid url", key)),
    };

    let host = parsed.host_str().unwrap_or("");
    let dotted = matches!(host.find('.'), Some(first) if first > 0)
        && host.rfind('.') != Some(host.len() - 1);

    if parsed.scheme().is_empty() || host.is_empty() || !dotted {
        return fail(format!("{} is not a valid url", key));
    }

    ctx.set_working(Value::Url(parsed));
    Ok(())
}

/// Compares against the `<key>_confirm` field, read directly from the form.
pub fn confirm(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let companion = format!("{}_confirm", key);
    if value != ctx.get(&companion).trim() {
        return fail(format!("{} does not match {}", key, companion));
    }
    Ok(())
}

/// Letters, decimal digits and spaces only. Fractions and letter-like
/// numerals (`½`, `Ⅻ`) are not letters.
pub fn alpha_num(_ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    if value
        .chars()
        .all(|c| (c.is_alphabetic() && !c.is_numeric()) || c.is_ascii_digit() || c == ' ')
    {
        Ok(())
    } else {
        fail(format!("{} is not alphanumeric", key))
    }
}

pub fn boolean(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    match parse_bool(value) {
        Some(b) => {
            ctx.set_working(Value::Bool(b));
            Ok(())
        }
        None => fail(format!("{} is not valid", key)),
    }
}

/// The working value must be the boolean `true`.
pub fn is_true(ctx: &mut RuleContext<'_>, key: &str, _value: &str) -> Result<(), ValidatorError> {
    match ctx.working() {
        Some(Value::Bool(true)) => Ok(()),
        Some(Value::Bool(false)) => fail(format!("{} is not valid", key)),
        other => Err(unsupported("true", key, other)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_bound(rule: &'static str, key: &str, value: &str) -> Result<i64, RuleError> {
    value.parse().map_err(|_| RuleError::InvalidArgument {
        rule,
        field: key.to_string(),
        argument: value.to_string(),
    })
}

pub(crate) fn unsupported(rule: &'static str, key: &str, found: Option<&Value>) -> ValidatorError {
    RuleError::UnsupportedValue {
        rule,
        field: key.to_string(),
        found: found.map(Value::kind).unwrap_or("no value"),
    }
    .into()
}
