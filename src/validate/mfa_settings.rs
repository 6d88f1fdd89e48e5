use super::rules::*;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::model::MfaSettingsConfig;
use crate::wire::PairingKeyFormat;

pub const MAX_ALLOWED_DEVICES_MIN: i32 = 1;
pub const MAX_ALLOWED_DEVICES_MAX: i32 = 15;

pub fn validate(config: &MfaSettingsConfig) -> Diagnostics {
    let mut diags = Diagnostics::new();

    resource_id(&mut diags, &AttributePath::root("environment_id"), &config.environment_id);

    let pairing_path = AttributePath::root("pairing");
    match config.pairing.get() {
        Some(pairing) => {
            between(
                &mut diags,
                &pairing_path.attr("max_allowed_devices"),
                &pairing.max_allowed_devices,
                MAX_ALLOWED_DEVICES_MIN,
                MAX_ALLOWED_DEVICES_MAX,
            );
            one_of(
                &mut diags,
                &pairing_path.attr("pairing_key_format"),
                &pairing.pairing_key_format,
                &PairingKeyFormat::allowed_values(),
            );
        }
        None if config.pairing.is_absent() => diags.add_error_at(
            &pairing_path,
            "Missing required argument",
            "The argument pairing is required.",
        ),
        None => {}
    }

    if let Some(lockout) = config.lockout.get() {
        at_least(
            &mut diags,
            &AttributePath::root("lockout").attr("failure_count"),
            &lockout.failure_count,
            1,
        );
    }

    diags
}
