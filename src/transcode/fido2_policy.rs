//! FIDO2 policy `expand` / `to_state`.

use super::*;
use crate::model::{
    BackupEligibilityConfig, DisplayNameAttributeConfig, Fido2PolicyConfig,
    MdsAuthenticatorsRequirementsConfig, SubAttributeConfig, UserDisplayNameAttributesConfig,
    UserVerificationConfig,
};
use crate::wire::{
    BackupEligibility, Fido2Policy, MdsAuthenticatorsRequirements, NamedAttribute, ObjectReference,
    UserDisplayNameAttribute, UserDisplayNameAttributes, UserVerification,
};
use std::collections::BTreeSet;

fn root(name: &str) -> AttributePath {
    AttributePath::root(name)
}

pub fn expand(config: &Fido2PolicyConfig) -> Result<Fido2Policy> {
    let backup_path = root("backup_eligibility");
    let backup = required(&config.backup_eligibility, &backup_path)?;

    let mds_path = root("mds_authenticators_requirements");
    let mds = required(&config.mds_authenticators_requirements, &mds_path)?;

    let uv_path = root("user_verification");
    let uv = required(&config.user_verification, &uv_path)?;

    let attrs_path = root("user_display_name_attributes").attr("attributes");
    let attributes = required(&config.user_display_name_attributes, &root("user_display_name_attributes"))
        .and_then(|a| required(&a.attributes, &attrs_path))?
        .iter()
        .enumerate()
        .map(|(i, attr)| expand_display_name_attribute(attr, &attrs_path.index(i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Fido2Policy {
        id: optional(&config.id),
        environment: None,
        name: required(&config.name, &root("name"))?.clone(),
        description: optional(&config.description),
        default: None,
        attestation_requirements: required_enum(
            &config.attestation_requirements,
            &root("attestation_requirements"),
        )?,
        authenticator_attachment: required_enum(
            &config.authenticator_attachment,
            &root("authenticator_attachment"),
        )?,
        backup_eligibility: BackupEligibility {
            allow: *required(&backup.allow, &backup_path.attr("allow"))?,
            enforce_during_authentication: *required(
                &backup.enforce_during_authentication,
                &backup_path.attr("enforce_during_authentication"),
            )?,
        },
        device_display_name: required(&config.device_display_name, &root("device_display_name"))?
            .clone(),
        discoverable_credentials: required_enum(
            &config.discoverable_credentials,
            &root("discoverable_credentials"),
        )?,
        mds_authenticators_requirements: MdsAuthenticatorsRequirements {
            allowed_authenticators: mds
                .allowed_authenticator_ids
                .get()
                .map(|ids| ids.iter().map(|id| ObjectReference { id: id.clone() }).collect()),
            enforce_during_authentication: *required(
                &mds.enforce_during_authentication,
                &mds_path.attr("enforce_during_authentication"),
            )?,
            option: required_enum(&mds.option, &mds_path.attr("option"))?,
        },
        relying_party_id: required(&config.relying_party_id, &root("relying_party_id"))?.clone(),
        user_display_name_attributes: UserDisplayNameAttributes { attributes },
        user_presence_timeout: expand_object(
            &config.user_presence_timeout,
            &root("user_presence_timeout"),
            expand_time_period,
        )?,
        user_verification: UserVerification {
            enforce_during_authentication: *required(
                &uv.enforce_during_authentication,
                &uv_path.attr("enforce_during_authentication"),
            )?,
            option: required_enum(&uv.option, &uv_path.attr("option"))?,
        },
        created_at: None,
        updated_at: None,
    })
}

fn expand_display_name_attribute(
    config: &DisplayNameAttributeConfig,
    path: &AttributePath,
) -> Result<UserDisplayNameAttribute> {
    let sub_path = path.attr("sub_attributes");
    let sub_attributes = match config.sub_attributes.get() {
        Some(subs) => Some(
            subs.iter()
                .enumerate()
                .map(|(i, sub)| {
                    Ok(NamedAttribute {
                        name: required(&sub.name, &sub_path.index(i).attr("name"))?.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        None => None,
    };

    Ok(UserDisplayNameAttribute {
        name: required(&config.name, &path.attr("name"))?.clone(),
        sub_attributes,
    })
}

/// Project an API record into configuration state. Each nested block is
/// projected field by field so a partially populated record never loses
/// the fields it does carry.
pub fn to_state(policy: &Fido2Policy, environment_id: &str) -> Result<Fido2PolicyConfig> {
    let id = policy
        .id
        .clone()
        .ok_or_else(|| Error::missing_data("FIDO2 policy id"))?;

    let mds = &policy.mds_authenticators_requirements;

    Ok(Fido2PolicyConfig {
        id: Value::Present(id),
        environment_id: Value::Present(environment_id.to_string()),
        name: Value::Present(policy.name.clone()),
        description: policy.description.clone().into(),
        default: Value::Present(policy.default.unwrap_or(false)),
        attestation_requirements: Value::Present(policy.attestation_requirements.to_string()),
        authenticator_attachment: Value::Present(policy.authenticator_attachment.to_string()),
        backup_eligibility: Value::Present(BackupEligibilityConfig {
            allow: Value::Present(policy.backup_eligibility.allow),
            enforce_during_authentication: Value::Present(
                policy.backup_eligibility.enforce_during_authentication,
            ),
        }),
        device_display_name: Value::Present(policy.device_display_name.clone()),
        discoverable_credentials: Value::Present(policy.discoverable_credentials.to_string()),
        mds_authenticators_requirements: Value::Present(MdsAuthenticatorsRequirementsConfig {
            allowed_authenticator_ids: mds
                .allowed_authenticators
                .as_ref()
                .map(|refs| refs.iter().map(|r| r.id.clone()).collect::<BTreeSet<_>>())
                .into(),
            enforce_during_authentication: Value::Present(mds.enforce_during_authentication),
            option: Value::Present(mds.option.to_string()),
        }),
        relying_party_id: Value::Present(policy.relying_party_id.clone()),
        user_display_name_attributes: Value::Present(UserDisplayNameAttributesConfig {
            attributes: Value::Present(
                policy
                    .user_display_name_attributes
                    .attributes
                    .iter()
                    .map(|attr| DisplayNameAttributeConfig {
                        name: Value::Present(attr.name.clone()),
                        sub_attributes: attr
                            .sub_attributes
                            .as_ref()
                            .map(|subs| {
                                subs.iter()
                                    .map(|s| SubAttributeConfig {
                                        name: Value::Present(s.name.clone()),
                                    })
                                    .collect::<Vec<_>>()
                            })
                            .into(),
                    })
                    .collect(),
            ),
        }),
        user_presence_timeout: optional_time_period_state(&policy.user_presence_timeout),
        user_verification: Value::Present(UserVerificationConfig {
            enforce_during_authentication: Value::Present(
                policy.user_verification.enforce_during_authentication,
            ),
            option: Value::Present(policy.user_verification.option.to_string()),
        }),
    })
}
