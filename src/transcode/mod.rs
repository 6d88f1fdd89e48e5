//! Transcoders between the configuration model and the wire model.
//!
//! `expand` turns a planned configuration into the record sent to the API.
//! `to_state` projects an API record back into configuration form. Both
//! are pure. Absent wire fields project to absent state, never to the
//! schema default, and time units come back exactly as the server sent
//! them.

pub mod device_policy;
pub mod device_policy_migration;
pub mod fido2_policy;
pub mod mfa_settings;
pub mod push_credential;

use crate::diagnostics::AttributePath;
use crate::error::{Error, Result};
use crate::model::TimePeriodConfig;
use crate::value::Value;
use crate::wire::{TimePeriod, TimeUnit, UnknownVariant};
use chrono::{DateTime, SecondsFormat, Utc};
use std::str::FromStr;

pub(crate) fn required<'a, T>(value: &'a Value<T>, path: &AttributePath) -> Result<&'a T> {
    match value {
        Value::Present(v) => Ok(v),
        Value::Absent => Err(Error::invalid_data(
            path,
            "a value is required but none was configured",
        )),
        Value::Unknown => Err(Error::invalid_data(path, "the value is not yet known")),
    }
}

pub(crate) fn optional<T: Clone>(value: &Value<T>) -> Option<T> {
    value.get().cloned()
}

pub(crate) fn parse_enum<E>(value: &str, path: &AttributePath) -> Result<E>
where
    E: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|e: UnknownVariant| Error::invalid_data(path, e.to_string()))
}

pub(crate) fn required_enum<E>(value: &Value<String>, path: &AttributePath) -> Result<E>
where
    E: FromStr<Err = UnknownVariant>,
{
    parse_enum(required(value, path)?, path)
}

pub(crate) fn optional_enum<E>(value: &Value<String>, path: &AttributePath) -> Result<Option<E>>
where
    E: FromStr<Err = UnknownVariant>,
{
    value.get().map(|v| parse_enum(v, path)).transpose()
}

/// Expand a nested record when present.
pub(crate) fn expand_object<T, W, F>(value: &Value<T>, path: &AttributePath, f: F) -> Result<Option<W>>
where
    F: FnOnce(&T, &AttributePath) -> Result<W>,
{
    value.get().map(|v| f(v, path)).transpose()
}

pub(crate) fn expand_time_period(config: &TimePeriodConfig, path: &AttributePath) -> Result<TimePeriod> {
    Ok(TimePeriod {
        duration: *required(&config.duration, &path.attr("duration"))?,
        time_unit: required_enum(&config.time_unit, &path.attr("time_unit"))?,
    })
}

/// Expand a wire-required period, injecting `default` when omitted.
pub(crate) fn time_period_or(
    value: &Value<TimePeriodConfig>,
    path: &AttributePath,
    default: TimePeriod,
) -> Result<TimePeriod> {
    Ok(expand_object(value, path, expand_time_period)?.unwrap_or(default))
}

pub(crate) fn time_period_state(period: &TimePeriod) -> TimePeriodConfig {
    TimePeriodConfig {
        duration: Value::Present(period.duration),
        time_unit: Value::Present(period.time_unit.to_string()),
    }
}

pub(crate) fn optional_time_period_state(period: &Option<TimePeriod>) -> Value<TimePeriodConfig> {
    period.as_ref().map(time_period_state).into()
}

pub(crate) fn enum_state<E: ToString>(value: &Option<E>) -> Value<String> {
    value.as_ref().map(ToString::to_string).into()
}

pub(crate) fn timestamp_state(value: &Option<DateTime<Utc>>) -> Value<String> {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .into()
}

pub(crate) fn minutes(duration: i32) -> TimePeriod {
    TimePeriod::new(duration, TimeUnit::Minutes)
}

pub(crate) fn seconds(duration: i32) -> TimePeriod {
    TimePeriod::new(duration, TimeUnit::Seconds)
}
