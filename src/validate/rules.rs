//! Attribute-level rules shared by every validator.
//!
//! Each rule inspects one [`Value`] and appends to a [`Diagnostics`]
//! collector. Absent and unknown values are skipped: they are either
//! caught by a presence rule or cannot be judged until apply time.

use crate::diagnostics::{AttributePath, Diagnostics};
use crate::value::Value;
use crate::wire::TimeUnit;
use ipnet::IpNet;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// PingOne resource identifiers are lower-case 8-4-4-4-12 UUIDs.
pub const RESOURCE_ID_PATTERN: &str =
    "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

static RESOURCE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(RESOURCE_ID_PATTERN).expect("resource id pattern is a valid regex")
});

pub fn is_resource_id(value: &str) -> bool {
    RESOURCE_ID_REGEX.is_match(value)
}

fn quoted(values: &[&str]) -> String {
    let joined = values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{}]", joined)
}

/// Presence rule for attributes marked required. Unknown values pass.
pub fn required_attribute<T>(diags: &mut Diagnostics, path: &AttributePath, value: &Value<T>) {
    if value.is_absent() {
        diags.add_error_at(
            path,
            "Missing Configuration for Required Attribute",
            format!(
                "Must set a configuration value for the {} attribute as the provider has marked it as required.",
                path
            ),
        );
    }
}

/// Closed-set membership for enum-valued strings.
pub fn one_of(diags: &mut Diagnostics, path: &AttributePath, value: &Value<String>, allowed: &[&str]) {
    if let Some(v) = value.get() {
        if !allowed.contains(&v.as_str()) {
            diags.add_error_at(
                path,
                "Invalid Attribute Value Match",
                format!(
                    "Attribute {} value must be one of: {}, got: \"{}\"",
                    path,
                    quoted(allowed),
                    v
                ),
            );
        }
    }
}

pub fn between(diags: &mut Diagnostics, path: &AttributePath, value: &Value<i32>, min: i32, max: i32) {
    if let Some(v) = value.copied() {
        if v < min || v > max {
            diags.add_error_at(
                path,
                "Invalid Attribute Value",
                format!(
                    "Attribute {} value must be between {} and {}, got: {}",
                    path, min, max, v
                ),
            );
        }
    }
}

pub fn at_least(diags: &mut Diagnostics, path: &AttributePath, value: &Value<i32>, min: i32) {
    if let Some(v) = value.copied() {
        if v < min {
            diags.add_error_at(
                path,
                "Invalid Attribute Value",
                format!("Attribute {} value must be at least {}, got: {}", path, min, v),
            );
        }
    }
}

pub fn length_between(
    diags: &mut Diagnostics,
    path: &AttributePath,
    value: &Value<String>,
    min: usize,
    max: usize,
) {
    if let Some(v) = value.get() {
        let len = v.chars().count();
        if len < min || len > max {
            diags.add_error_at(
                path,
                "Invalid Attribute Value Length",
                format!(
                    "Attribute {} string length must be between {} and {}, got: {}",
                    path, min, max, len
                ),
            );
        }
    }
}

pub fn matches(
    diags: &mut Diagnostics,
    path: &AttributePath,
    value: &Value<String>,
    regex: &Regex,
    message: &str,
) {
    if let Some(v) = value.get() {
        if !regex.is_match(v) {
            diags.add_error_at(
                path,
                "Invalid Attribute Value Match",
                format!("Attribute {} {}, got: {}", path, message, v),
            );
        }
    }
}

pub fn resource_id(diags: &mut Diagnostics, path: &AttributePath, value: &Value<String>) {
    matches(
        diags,
        path,
        value,
        &RESOURCE_ID_REGEX,
        "must be a valid PingOne resource ID",
    );
}

pub fn cidr(diags: &mut Diagnostics, path: &AttributePath, value: &str) {
    if !value.contains('/') || IpNet::from_str(value).is_err() {
        diags.add_error_at(
            path,
            "Invalid Attribute Value Match",
            format!(
                "Attribute {} Expected value to be in CIDR notation (e.g., 192.168.0.1/24 or 10.0.0.5/32), got: {}",
                path, value
            ),
        );
    }
}

/// The attribute must be set when `policy_type` has the given value.
pub fn required_if(
    diags: &mut Diagnostics,
    path: &AttributePath,
    is_absent: bool,
    discriminator: &str,
    discriminator_value: &str,
) {
    if is_absent {
        diags.add_error_at(
            path,
            "Missing required argument",
            format!(
                "The argument {} is required because {} is configured as: \"{}\".",
                path, discriminator, discriminator_value
            ),
        );
    }
}

/// The attribute must not be set when `policy_type` has the given value.
pub fn conflicts_if(
    diags: &mut Diagnostics,
    path: &AttributePath,
    is_set: bool,
    discriminator: &str,
    discriminator_value: &str,
) {
    if is_set {
        diags.add_error_at(
            path,
            "Invalid argument combination",
            format!(
                "The argument cannot be defined if the value \"{}\" is present at the defined path: [{}]",
                discriminator_value, discriminator
            ),
        );
    }
}

/// Range check that depends on the configured time unit.
pub fn duration_for_unit(
    diags: &mut Diagnostics,
    path: &AttributePath,
    duration: &Value<i32>,
    time_unit: &Value<String>,
    ranges: &[(TimeUnit, i32, i32)],
) {
    let (Some(d), Some(unit)) = (duration.copied(), time_unit.get()) else {
        return;
    };
    let Ok(unit) = unit.parse::<TimeUnit>() else {
        return;
    };
    if let Some((_, min, max)) = ranges.iter().find(|(u, _, _)| *u == unit) {
        if d < *min || d > *max {
            diags.add_error_at(
                path,
                "Invalid Attribute Value",
                format!(
                    "Attribute {} value must be between {} and {} when the time unit is {}, got: {}",
                    path, min, max, unit, d
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> AttributePath {
        AttributePath::root("x")
    }

    #[test]
    fn test_between_boundaries() {
        for (v, ok) in [(0, false), (1, true), (7, true), (8, false)] {
            let mut diags = Diagnostics::new();
            between(&mut diags, &path(), &Value::Present(v), 1, 7);
            assert_eq!(diags.has_error(), !ok, "value {v}");
        }
    }

    #[test]
    fn test_absent_and_unknown_are_skipped() {
        let mut diags = Diagnostics::new();
        between(&mut diags, &path(), &Value::Absent, 1, 7);
        between(&mut diags, &path(), &Value::Unknown, 1, 7);
        one_of(&mut diags, &path(), &Value::Unknown, &["A"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_required_attribute() {
        let mut diags = Diagnostics::new();
        required_attribute(&mut diags, &path(), &Value::Present(true));
        required_attribute::<bool>(&mut diags, &path(), &Value::Unknown);
        assert!(diags.is_empty());

        required_attribute::<bool>(&mut diags, &path().attr("enabled"), &Value::Absent);
        assert!(diags.mentions("Must set a configuration value for the x.enabled attribute"));
    }

    #[test]
    fn test_one_of_lists_allowed_values() {
        let mut diags = Diagnostics::new();
        one_of(
            &mut diags,
            &path(),
            &Value::Present("MAYBE".into()),
            &["permissive", "restrictive"],
        );
        assert!(diags.mentions("Invalid Attribute Value Match"));
        assert!(diags.mentions("[\"permissive\" \"restrictive\"]"));
    }

    #[test]
    fn test_cidr() {
        let mut diags = Diagnostics::new();
        cidr(&mut diags, &path(), "10.0.0.0/8");
        cidr(&mut diags, &path(), "2001:db8::/32");
        assert!(diags.is_empty());

        cidr(&mut diags, &path(), "192.168.1.1");
        assert!(diags.mentions("Expected value to be in CIDR notation"));
    }

    #[test]
    fn test_resource_id() {
        assert!(is_resource_id("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f"));
        assert!(!is_resource_id("0C0A4C39-3B4E-4B0E-9A5E-3E6F6F6F6F6F"));
        assert!(!is_resource_id("not-an-id"));
    }

    #[test]
    fn test_duration_for_unit() {
        let ranges = [(TimeUnit::Minutes, 1, 30), (TimeUnit::Seconds, 1, 1800)];
        let mut diags = Diagnostics::new();
        duration_for_unit(
            &mut diags,
            &path(),
            &Value::Present(1800),
            &Value::Present("SECONDS".into()),
            &ranges,
        );
        assert!(diags.is_empty());
        duration_for_unit(
            &mut diags,
            &path(),
            &Value::Present(31),
            &Value::Present("MINUTES".into()),
            &ranges,
        );
        assert!(diags.has_error());
    }
}
