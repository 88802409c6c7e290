use std::time::Duration;

use crate::error::ValidationError;

/// Upper bound for intervals and timeouts (one year), so deadlines built
/// from them always fit in an `Instant`.
const MAX_DURATION: Duration = Duration::from_secs(31_536_000);

/// Parse `500ms`, `10s`, `1m`, `2h`, or a bare number of seconds.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    ensure_duration_in_range(duration)
}

pub(crate) fn ensure_duration_in_range(duration: Duration) -> Result<Duration, ValidationError> {
    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }
    if duration > MAX_DURATION {
        return Err(ValidationError::DurationTooLong {
            max_secs: MAX_DURATION.as_secs(),
        });
    }
    Ok(duration)
}
