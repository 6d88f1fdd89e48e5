//! Import identifiers: slash-separated resource ids.

use crate::error::{Error, Result};
use crate::validate::rules::{is_resource_id, RESOURCE_ID_PATTERN};

/// The ordered components of a resource's import id.
#[derive(Debug, Clone, Copy)]
pub struct ImportFormat {
    pub components: &'static [&'static str],
}

impl ImportFormat {
    pub const fn new(components: &'static [&'static str]) -> Self {
        Self { components }
    }

    fn regex(&self) -> String {
        let id = RESOURCE_ID_PATTERN.trim_start_matches('^').trim_end_matches('$');
        let parts = vec![format!("({})", id); self.components.len()];
        format!("^{}$", parts.join("/"))
    }

    /// Split `id` into its components, in declaration order.
    pub fn parse(&self, id: &str) -> Result<Vec<String>> {
        let parts: Vec<&str> = id.split('/').collect();
        if parts.len() != self.components.len() || !parts.iter().all(|p| is_resource_id(p)) {
            return Err(Error::ImportIdentifier(format!(
                "Invalid import ID specified (\"{}\").  The ID should be in the format \"{}\" and must match regex: {}",
                id,
                self.components.join("/"),
                self.regex()
            )));
        }
        Ok(parts.into_iter().map(str::to_string).collect())
    }

    pub fn format(&self, values: &[&str]) -> String {
        values.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV: &str = "0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f";
    const POLICY: &str = "5a1b2c3d-0000-4000-8000-00000000beef";
    const FORMAT: ImportFormat = ImportFormat::new(&["environment_id", "mfa_device_policy_id"]);

    #[test]
    fn test_parse_and_format_are_symmetric() {
        let id = FORMAT.format(&[ENV, POLICY]);
        assert_eq!(FORMAT.parse(&id).unwrap(), vec![ENV, POLICY]);
    }

    #[test]
    fn test_rejects_bad_ids() {
        let extra = format!("{ENV}/{POLICY}/extra");
        let trailing = format!("{ENV}/");
        for bad in [ENV, "a/b", extra.as_str(), trailing.as_str()] {
            let err = FORMAT.parse(bad).unwrap_err();
            assert!(matches!(err, Error::ImportIdentifier(_)));
            assert!(err
                .to_string()
                .contains("The ID should be in the format \"environment_id/mfa_device_policy_id\""));
        }
    }
}
