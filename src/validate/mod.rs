//! Plan-time validation.
//!
//! Attribute rules and cross-field gates run without I/O and accumulate
//! every failure into one [`Diagnostics`]. The mobile application gates in
//! [`applications`] read the Application resource through an
//! [`crate::appref::ApplicationLookup`].

pub mod applications;
pub mod device_policy;
pub mod device_policy_migration;
pub mod fido2_policy;
pub mod mfa_settings;
pub mod push_credential;
pub mod rules;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};

/// Turn accumulated diagnostics into an error when any of them is one.
/// Warnings are handed back so the caller can pass them on.
pub fn ensure_valid(diags: Diagnostics) -> Result<Diagnostics> {
    if diags.has_error() {
        Err(Error::Validation(diags))
    } else {
        Ok(diags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_valid() {
        let mut diags = Diagnostics::new();
        diags.add_warning("w", "only a warning");
        assert_eq!(ensure_valid(diags).unwrap().len(), 1);

        let mut diags = Diagnostics::new();
        diags.add_error("e", "bad");
        assert!(matches!(ensure_valid(diags), Err(Error::Validation(_))));
    }
}
