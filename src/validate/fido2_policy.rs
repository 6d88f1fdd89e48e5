//! FIDO2 policy validation.

use super::rules::*;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::model::Fido2PolicyConfig;
use crate::value::Value;
use crate::wire::{
    AttestationRequirements, AuthenticatorAttachment, DiscoverableCredentials,
    MdsAuthenticatorsOption, TimeUnit, UserVerificationOption,
};
use regex::Regex;
use std::sync::LazyLock;

static RELYING_PARTY_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w-]+\.)+(?:[a-z]{2,}|xn--[a-z0-9]+)$")
        .expect("relying party pattern is a valid regex")
});

const USERNAME_ATTRIBUTE: &str = "username";
const USER_PRESENCE_TIMEOUT_RANGES: &[(TimeUnit, i32, i32)] =
    &[(TimeUnit::Minutes, 1, 10), (TimeUnit::Seconds, 60, 600)];

fn root(name: &str) -> AttributePath {
    AttributePath::root(name)
}

pub fn validate(config: &Fido2PolicyConfig) -> Diagnostics {
    let mut diags = Diagnostics::new();

    resource_id(&mut diags, &root("environment_id"), &config.environment_id);
    length_between(&mut diags, &root("name"), &config.name, 1, 256);
    length_between(
        &mut diags,
        &root("device_display_name"),
        &config.device_display_name,
        1,
        100,
    );
    matches(
        &mut diags,
        &root("relying_party_id"),
        &config.relying_party_id,
        &RELYING_PARTY_ID_REGEX,
        "must be a valid domain name",
    );

    one_of(
        &mut diags,
        &root("attestation_requirements"),
        &config.attestation_requirements,
        &AttestationRequirements::allowed_values(),
    );
    one_of(
        &mut diags,
        &root("authenticator_attachment"),
        &config.authenticator_attachment,
        &AuthenticatorAttachment::allowed_values(),
    );
    one_of(
        &mut diags,
        &root("discoverable_credentials"),
        &config.discoverable_credentials,
        &DiscoverableCredentials::allowed_values(),
    );
    if let Some(uv) = config.user_verification.get() {
        one_of(
            &mut diags,
            &root("user_verification").attr("option"),
            &uv.option,
            &UserVerificationOption::allowed_values(),
        );
    }

    if let Some(timeout) = config.user_presence_timeout.get() {
        let path = root("user_presence_timeout");
        one_of(
            &mut diags,
            &path.attr("time_unit"),
            &timeout.time_unit,
            &["MINUTES", "SECONDS"],
        );
        duration_for_unit(
            &mut diags,
            &path.attr("duration"),
            &timeout.duration,
            &timeout.time_unit,
            USER_PRESENCE_TIMEOUT_RANGES,
        );
    }

    validate_mds(config, &mut diags);
    validate_display_name_attributes(config, &mut diags);

    diags
}

fn validate_mds(config: &Fido2PolicyConfig, diags: &mut Diagnostics) {
    let Some(mds) = config.mds_authenticators_requirements.get() else {
        return;
    };
    let path = root("mds_authenticators_requirements");
    let option_path = path.attr("option");
    one_of(
        diags,
        &option_path,
        &mds.option,
        &MdsAuthenticatorsOption::allowed_values(),
    );

    let ids_path = path.attr("allowed_authenticator_ids");
    let specific = MdsAuthenticatorsOption::Specific.as_str();
    match mds.option.get().map(String::as_str) {
        Some(option) if option == specific => {
            let empty = mds
                .allowed_authenticator_ids
                .get()
                .map(|ids| ids.is_empty())
                .unwrap_or(!mds.allowed_authenticator_ids.is_unknown());
            required_if(diags, &ids_path, empty, &option_path.to_string(), specific);
        }
        Some(_) => {
            if mds.allowed_authenticator_ids.is_present() {
                diags.add_error_at(
                    &ids_path,
                    "Invalid argument combination",
                    format!(
                        "The argument {} can only be defined when {} is configured as: \"{}\".",
                        ids_path, option_path, specific
                    ),
                );
            }
        }
        None => {}
    }

    // NONE attestation pairs with NONE metadata requirements
    let none = AttestationRequirements::None.as_str();
    if let (Some(attestation), Some(option)) =
        (config.attestation_requirements.get(), mds.option.get())
    {
        if (attestation == none) != (option == MdsAuthenticatorsOption::None.as_str()) {
            diags.add_error_at(
                &option_path,
                "Invalid argument combination",
                format!(
                    "The argument {} must be \"NONE\" if and only if attestation_requirements is \"{}\".",
                    option_path, none
                ),
            );
        }
    }
}

fn validate_display_name_attributes(config: &Fido2PolicyConfig, diags: &mut Diagnostics) {
    let path = root("user_display_name_attributes").attr("attributes");
    let Some(attributes) = config
        .user_display_name_attributes
        .get()
        .and_then(|a| a.attributes.get())
    else {
        return;
    };

    let names: Vec<&Value<String>> = attributes.iter().map(|a| &a.name).collect();
    let all_known = names.iter().all(|n| !n.is_unknown());
    if all_known && !names.iter().any(|n| n.get().map(String::as_str) == Some(USERNAME_ATTRIBUTE)) {
        diags.add_error_at(
            &path,
            "Missing required attribute",
            format!(
                "The {} list must contain an entry with name \"{}\".",
                path, USERNAME_ATTRIBUTE
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn valid() -> Fido2PolicyConfig {
        Fido2PolicyConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            name: Value::Present("Passkeys".into()),
            attestation_requirements: Value::Present("NONE".into()),
            authenticator_attachment: Value::Present("BOTH".into()),
            device_display_name: Value::Present("Passkey".into()),
            discoverable_credentials: Value::Present("REQUIRED".into()),
            mds_authenticators_requirements: Value::Present(MdsAuthenticatorsRequirementsConfig {
                enforce_during_authentication: Value::Present(false),
                option: Value::Present("NONE".into()),
                ..Default::default()
            }),
            relying_party_id: Value::Present("auth.example.com".into()),
            user_display_name_attributes: Value::Present(UserDisplayNameAttributesConfig {
                attributes: Value::Present(vec![DisplayNameAttributeConfig {
                    name: Value::Present("username".into()),
                    ..Default::default()
                }]),
            }),
            user_presence_timeout: Value::Present(TimePeriodConfig::new(2, "MINUTES")),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_policy() {
        let diags = validate(&valid());
        assert!(diags.is_empty(), "{diags}");
    }

    #[test]
    fn test_relying_party_must_be_domain() {
        let mut config = valid();
        config.relying_party_id = Value::Present("localhost".into());
        assert!(validate(&config).mentions("must be a valid domain name"));
    }

    #[test]
    fn test_specific_requires_ids() {
        let mut config = valid();
        config.attestation_requirements = Value::Present("DIRECT".into());
        config.mds_authenticators_requirements.get_mut().unwrap().option =
            Value::Present("SPECIFIC".into());
        assert!(validate(&config).mentions("allowed_authenticator_ids is required"));

        config
            .mds_authenticators_requirements
            .get_mut()
            .unwrap()
            .allowed_authenticator_ids = Value::Present(["aaguid-1".to_string()].into());
        assert!(!validate(&config).has_error());
    }

    #[test]
    fn test_attestation_and_mds_option_pair() {
        let mut config = valid();
        config.mds_authenticators_requirements.get_mut().unwrap().option =
            Value::Present("GLOBAL".into());
        assert!(validate(&config).mentions("must be \"NONE\" if and only if"));
    }

    #[test]
    fn test_username_attribute_required() {
        let mut config = valid();
        config.user_display_name_attributes = Value::Present(UserDisplayNameAttributesConfig {
            attributes: Value::Present(vec![DisplayNameAttributeConfig {
                name: Value::Present("email".into()),
                ..Default::default()
            }]),
        });
        assert!(validate(&config).mentions("Missing required attribute"));
    }

    #[test]
    fn test_user_presence_timeout_ranges() {
        for (d, unit, ok) in [(10, "MINUTES", true), (11, "MINUTES", false), (59, "SECONDS", false), (600, "SECONDS", true)] {
            let mut config = valid();
            config.user_presence_timeout = Value::Present(TimePeriodConfig::new(d, unit));
            assert_eq!(!validate(&config).has_error(), ok, "{d} {unit}");
        }
    }
}
