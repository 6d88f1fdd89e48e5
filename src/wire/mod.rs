//! Wire model of the PingOne MFA REST resources.
//!
//! These records serialize exactly as the API expects (camelCase, absent
//! optionals omitted). They carry no defaults and no validation; that lives
//! in [`crate::model`] and [`crate::validate`].

pub mod application;
pub mod device_policy;
pub mod device_policy_migration;
pub mod enums;
pub mod error;
pub mod fido2_policy;
pub mod mfa_settings;
pub mod push_credential;

pub use application::Application;
pub use device_policy::*;
pub use device_policy_migration::*;
pub use enums::*;
pub use error::{P1Error, P1ErrorDetail, P1InnerError};
pub use fido2_policy::*;
pub use mfa_settings::*;
pub use push_credential::{PushCredentialRequest, PushCredentialResponse};
