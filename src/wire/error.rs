//! PingOne API error body.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct P1Error {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<P1ErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct P1ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<P1InnerError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct P1InnerError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_minimum_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_maximum_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,
}

pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_CONSTRAINT_VIOLATION: &str = "CONSTRAINT_VIOLATION";
pub const CODE_INVALID_DATA: &str = "INVALID_DATA";

impl P1Error {
    pub fn code_is(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    pub fn message_str(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// First detail target, which the API sets to the offending field.
    pub fn first_target(&self) -> Option<&str> {
        self.details.iter().find_map(|d| d.target.as_deref())
    }

    /// Multi-line rendering used as diagnostic detail.
    pub fn render_details(&self) -> String {
        let mut out = String::from("PingOne Error Details:");
        let _ = write!(out, "\nID:\t\t{}", self.id.as_deref().unwrap_or_default());
        let _ = write!(out, "\nCode:\t\t{}", self.code.as_deref().unwrap_or_default());
        let _ = write!(out, "\nMessage:\t{}", self.message_str());

        for detail in &self.details {
            out.push_str("\nDetails:");
            if let Some(code) = &detail.code {
                let _ = write!(out, "\n  - Code:\t{}", code);
            }
            if let Some(message) = &detail.message {
                let _ = write!(out, "\n    Message:\t{}", message);
            }
            if let Some(target) = &detail.target {
                let _ = write!(out, "\n    Target:\t{}", target);
            }
            if let Some(inner) = &detail.inner_error {
                if let Some(min) = inner.range_minimum_value {
                    let _ = write!(out, "\n    Allowed Minimum:\t{}", min);
                }
                if let Some(max) = inner.range_maximum_value {
                    let _ = write!(out, "\n    Allowed Maximum:\t{}", max);
                }
                if let Some(pattern) = &inner.allowed_pattern {
                    let _ = write!(out, "\n    Allowed Pattern:\t{}", pattern);
                }
            }
        }

        out
    }
}
