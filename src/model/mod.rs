//! User-facing configuration model.

pub mod defaults;
pub mod device_policy;
pub mod device_policy_migration;
pub mod fido2_policy;
pub mod mfa_settings;
pub mod push_credential;

pub use device_policy::*;
pub use device_policy_migration::*;
pub use fido2_policy::*;
pub use mfa_settings::*;
pub use push_credential::*;
