//! # pingone-mfa
//!
//! Declarative lifecycle management for PingOne MFA configuration: device
//! authentication policies (including the environment default), FIDO2
//! policies, application push credentials and environment MFA settings.
//!
//! Each managed object is a [`resources::Resource`]: plan validation,
//! create/read/update/delete against the PingOne REST API, and import.
//! Outcomes are returned as state plus [`diagnostics::Diagnostics`] rather
//! than bare errors, so a host can render warnings next to results.

pub mod appref;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod locator;
pub mod logging;
pub mod model;
pub mod resources;
pub mod transcode;
pub mod validate;
pub mod value;
pub mod wire;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use diagnostics::{AttributePath, Diagnostic, Diagnostics};
pub use error::{Error, ErrorKind, Result};
pub use resources::{OperationContext, Resource, Response};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_is_exposed() {
        let err = Error::Config("bad".to_string());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("bad"));
    }
}
