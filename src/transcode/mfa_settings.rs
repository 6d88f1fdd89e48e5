//! MFA settings `expand` / `to_state`.

use super::*;
use crate::model::{
    LockoutSettingsConfig, MfaSettingsConfig, PairingSettingsConfig, PhoneExtensionsConfig,
    UsersSettingsConfig,
};
use crate::wire::{
    MfaSettings, MfaSettingsLockout, MfaSettingsPairing, MfaSettingsPhoneExtensions,
    MfaSettingsUsers,
};

pub fn expand(config: &MfaSettingsConfig) -> Result<MfaSettings> {
    let pairing_path = AttributePath::root("pairing");
    let pairing = required(&config.pairing, &pairing_path)?;

    Ok(MfaSettings {
        environment: None,
        pairing: MfaSettingsPairing {
            max_allowed_devices: *required(
                &pairing.max_allowed_devices,
                &pairing_path.attr("max_allowed_devices"),
            )?,
            pairing_key_format: required_enum(
                &pairing.pairing_key_format,
                &pairing_path.attr("pairing_key_format"),
            )?,
        },
        lockout: expand_object(&config.lockout, &AttributePath::root("lockout"), |l, p| {
            Ok(MfaSettingsLockout {
                failure_count: *required(&l.failure_count, &p.attr("failure_count"))?,
                duration_seconds: optional(&l.duration_seconds),
            })
        })?,
        phone_extensions: expand_object(
            &config.phone_extensions,
            &AttributePath::root("phone_extensions"),
            |pe, p| {
                Ok(MfaSettingsPhoneExtensions {
                    enabled: *required(&pe.enabled, &p.attr("enabled"))?,
                })
            },
        )?,
        users: expand_object(&config.users, &AttributePath::root("users"), |u, p| {
            Ok(MfaSettingsUsers {
                mfa_enabled: *required(&u.mfa_enabled, &p.attr("mfa_enabled"))?,
            })
        })?,
        updated_at: None,
    })
}

/// The settings singleton is keyed by its environment.
pub fn to_state(settings: &MfaSettings, environment_id: &str) -> MfaSettingsConfig {
    MfaSettingsConfig {
        id: Value::Present(environment_id.to_string()),
        environment_id: Value::Present(environment_id.to_string()),
        pairing: Value::Present(PairingSettingsConfig {
            max_allowed_devices: Value::Present(settings.pairing.max_allowed_devices),
            pairing_key_format: Value::Present(settings.pairing.pairing_key_format.to_string()),
        }),
        lockout: settings
            .lockout
            .as_ref()
            .map(|l| LockoutSettingsConfig {
                failure_count: Value::Present(l.failure_count),
                duration_seconds: l.duration_seconds.into(),
            })
            .into(),
        phone_extensions: settings
            .phone_extensions
            .as_ref()
            .map(|pe| PhoneExtensionsConfig {
                enabled: Value::Present(pe.enabled),
            })
            .into(),
        users: settings
            .users
            .as_ref()
            .map(|u| UsersSettingsConfig {
                mfa_enabled: Value::Present(u.mfa_enabled),
            })
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::PairingKeyFormat;

    #[test]
    fn test_round_trip_with_defaults() {
        let mut config = MfaSettingsConfig {
            environment_id: Value::Present("env".into()),
            pairing: Value::Present(PairingSettingsConfig {
                pairing_key_format: Value::Present("ALPHANUMERIC".into()),
                ..Default::default()
            }),
            lockout: Value::Present(LockoutSettingsConfig {
                failure_count: Value::Present(5),
                duration_seconds: Value::Present(600),
            }),
            ..Default::default()
        };
        config.apply_defaults();

        let wire = expand(&config).unwrap();
        assert_eq!(wire.pairing.max_allowed_devices, 5);
        assert_eq!(wire.pairing.pairing_key_format, PairingKeyFormat::Alphanumeric);
        assert_eq!(wire.users.as_ref().map(|u| u.mfa_enabled), Some(true));

        let state = to_state(&wire, "env");
        assert_eq!(state.id, Value::Present("env".to_string()));
        assert_eq!(expand(&state).unwrap(), wire);
    }
}
