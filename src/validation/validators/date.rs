//! Date and time validation against placeholder layouts.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::NaiveDateTime;

use crate::form::Value;
use crate::validation::pipeline::RuleContext;
use crate::validation::validators::general::unsupported;
use crate::validation::validators::{fail, ValidatorError};

const PLACEHOLDERS: &[(&str, &str)] = &[
    ("year", "%Y"),
    ("month", "%m"),
    ("day", "%d"),
    ("hour", "%H"),
    ("minute", "%M"),
    ("second", "%S"),
];

/// Parse the working string with the layout given as the rule argument,
/// e.g. `date:day/month/year` or `date:year-month-day hour.minute`. Rule
/// arguments cannot contain `:`.
pub fn date(ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    let input = match ctx.working() {
        Some(Value::String(s)) => s.clone(),
        other => return Err(unsupported("date", key, other)),
    };

    match parse(&input, &layout(value)) {
        Some(parsed) => {
            ctx.set_working(Value::DateTime(parsed));
            Ok(())
        }
        None => fail(format!("{} is not a valid date", key)),
    }
}

/// Translate a placeholder layout into a `chrono` format string.
pub fn layout(template: &str) -> String {
    PLACEHOLDERS
        .iter()
        .fold(template.replace('%', "%%"), |acc, (word, spec)| acc.replace(word, spec))
}

/// Parse `input` against `pattern`, then default every component the layout
/// left out: year 0, January, day 1, midnight.
fn parse(input: &str, pattern: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::default();
    format::parse(&mut parsed, input, StrftimeItems::new(pattern)).ok()?;

    // Setters only fill empty components; the error on a parsed one is expected.
    let _ = parsed.set_year(0);
    let _ = parsed.set_month(1);
    let _ = parsed.set_day(1);
    let _ = parsed.set_hour(0);
    let _ = parsed.set_minute(0);
    let _ = parsed.set_second(0);

    let date = parsed.to_naive_date().ok()?;
    let time = parsed.to_naive_time().ok()?;
    Some(date.and_time(time))
}
