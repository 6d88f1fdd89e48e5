//! Device policy `expand` / `to_state`.
//!
//! The policy type decides which factor blocks and which per-application
//! fields cross the wire. PingID policies carry `desktop`, `yubikey`,
//! biometrics, request-duration and IP-pairing settings; PingOne MFA
//! policies carry auto enrollment, device authorization and push timeouts.

use super::*;
use crate::model::defaults::*;
use crate::model::*;
use crate::wire::{
    Authentication, DeviceAuthenticationPolicy, DeviceAuthorization, Enabled, FailureOtp, Fido2,
    IpPairingConfiguration, Mobile, MobileApplication, MobileApplicationType, MobilePush,
    NewRequestDurationConfiguration, ObjectReference, OfflineDevice, OfflineDeviceOtp, OtpFailure,
    PingIdDevice, PingIdDeviceOtp, PingIdOtpFailure, PushLimit, RememberMe, RememberMeWeb, Totp,
};
use std::collections::BTreeMap;

fn root(name: &str) -> AttributePath {
    AttributePath::root(name)
}

/// Expand a planned device policy into its wire record.
pub fn expand(config: &DevicePolicyConfig) -> Result<DeviceAuthenticationPolicy> {
    let policy_type = config.policy_type().unwrap_or(PolicyType::PingoneMfa);
    let pingid = policy_type == PolicyType::Pingid;

    Ok(DeviceAuthenticationPolicy {
        id: optional(&config.id),
        name: required(&config.name, &root("name"))?.clone(),
        authentication: expand_object(&config.authentication, &root("authentication"), |a, p| {
            Ok(Authentication {
                device_selection: required_enum(&a.device_selection, &p.attr("device_selection"))?,
            })
        })?,
        new_device_notification: optional_enum(
            &config.new_device_notification,
            &root("new_device_notification"),
        )?,
        ignore_user_lock: optional(&config.ignore_user_lock),
        notifications_policy: config
            .notifications_policy
            .get()
            .and_then(|n| n.id.get())
            .filter(|id| !id.is_empty())
            .map(|id| ObjectReference { id: id.clone() }),
        remember_me: expand_object(&config.remember_me, &root("remember_me"), expand_remember_me)?,
        sms: expand_object(&config.sms, &root("sms"), expand_offline_device)?,
        voice: expand_object(&config.voice, &root("voice"), expand_offline_device)?,
        email: expand_object(&config.email, &root("email"), expand_offline_device)?,
        mobile: expand_object(&config.mobile, &root("mobile"), |m, p| {
            expand_mobile(m, p, policy_type)
        })?,
        totp: expand_object(&config.totp, &root("totp"), expand_totp)?,
        fido2: expand_object(&config.fido2, &root("fido2"), expand_fido2)?,
        desktop: if pingid {
            expand_object(&config.desktop, &root("desktop"), expand_pingid_device)?
        } else {
            None
        },
        yubikey: if pingid {
            expand_object(&config.yubikey, &root("yubikey"), expand_pingid_device)?
        } else {
            None
        },
        oath_token: expand_object(&config.oath_token, &root("oath_token"), expand_pingid_device)?,
        default: None,
        for_sign_on_policy: None,
        environment: None,
        created_at: None,
        updated_at: None,
    })
}

/// Expand for the environment's default policy. The record is always
/// flagged as the default and never as a sign-on policy.
pub fn expand_default(config: &DevicePolicyConfig) -> Result<DeviceAuthenticationPolicy> {
    let mut policy = expand(config)?;
    policy.default = Some(true);
    policy.for_sign_on_policy = Some(false);
    Ok(policy)
}

fn expand_remember_me(config: &RememberMeConfig, path: &AttributePath) -> Result<RememberMe> {
    let web_path = path.attr("web");
    let web = required(&config.web, &web_path)?;
    Ok(RememberMe {
        web: RememberMeWeb {
            enabled: *required(&web.enabled, &web_path.attr("enabled"))?,
            life_time: expand_object(&web.life_time, &web_path.attr("life_time"), expand_time_period)?,
        },
    })
}

fn expand_failure(
    value: &Value<OtpFailureConfig>,
    path: &AttributePath,
    count_default: i32,
    cool_down_default: i32,
) -> Result<OtpFailure> {
    match value.get() {
        Some(failure) => Ok(OtpFailure {
            count: failure.count.copied().unwrap_or(count_default),
            cool_down: time_period_or(
                &failure.cool_down,
                &path.attr("cool_down"),
                minutes(cool_down_default),
            )?,
        }),
        None => Ok(OtpFailure {
            count: count_default,
            cool_down: minutes(cool_down_default),
        }),
    }
}

fn expand_offline_device(config: &OfflineDeviceConfig, path: &AttributePath) -> Result<OfflineDevice> {
    Ok(OfflineDevice {
        enabled: *required(&config.enabled, &path.attr("enabled"))?,
        otp: expand_object(&config.otp, &path.attr("otp"), |otp, p| {
            Ok(OfflineDeviceOtp {
                lifetime: time_period_or(
                    &otp.lifetime,
                    &p.attr("lifetime"),
                    minutes(OFFLINE_OTP_LIFETIME_DEFAULT),
                )?,
                failure: expand_failure(
                    &otp.failure,
                    &p.attr("failure"),
                    OFFLINE_OTP_FAILURE_COUNT_DEFAULT,
                    OFFLINE_OTP_COOL_DOWN_DEFAULT,
                )?,
                otp_length: optional(&otp.otp_length),
            })
        })?,
        pairing_disabled: optional(&config.pairing_disabled),
        prompt_for_nickname_on_pairing: optional(&config.prompt_for_nickname_on_pairing),
    })
}

fn expand_failure_otp(
    config: &FailureOtpConfig,
    path: &AttributePath,
    count_default: i32,
    cool_down_default: i32,
) -> Result<FailureOtp> {
    Ok(FailureOtp {
        failure: expand_failure(
            &config.failure,
            &path.attr("failure"),
            count_default,
            cool_down_default,
        )?,
    })
}

fn expand_enabled(config: &EnabledConfig, path: &AttributePath) -> Result<Enabled> {
    Ok(Enabled {
        enabled: *required(&config.enabled, &path.attr("enabled"))?,
    })
}

fn expand_mobile(config: &MobileConfig, path: &AttributePath, policy_type: PolicyType) -> Result<Mobile> {
    let apps_path = path.attr("applications");
    let applications = match config.applications.get() {
        Some(apps) => Some(
            apps.iter()
                .map(|(id, app)| expand_mobile_application(id, app, &apps_path.key(id), policy_type))
                .collect::<Result<Vec<_>>>()?,
        ),
        None => None,
    };

    Ok(Mobile {
        enabled: *required(&config.enabled, &path.attr("enabled"))?,
        otp: expand_object(&config.otp, &path.attr("otp"), |otp, p| {
            expand_failure_otp(
                otp,
                p,
                MOBILE_OTP_FAILURE_COUNT_DEFAULT,
                MOBILE_OTP_COOL_DOWN_DEFAULT,
            )
        })?,
        applications,
        prompt_for_nickname_on_pairing: optional(&config.prompt_for_nickname_on_pairing),
    })
}

fn expand_mobile_application(
    id: &str,
    config: &MobileApplicationConfig,
    path: &AttributePath,
    policy_type: PolicyType,
) -> Result<MobileApplication> {
    let mut app = MobileApplication::new(id);

    app.otp = expand_object(&config.otp, &path.attr("otp"), expand_enabled)?;
    app.pairing_disabled = optional(&config.pairing_disabled);
    app.pairing_key_lifetime = expand_object(
        &config.pairing_key_lifetime,
        &path.attr("pairing_key_lifetime"),
        expand_time_period,
    )?;
    app.push = expand_object(&config.push, &path.attr("push"), |push, p| {
        Ok(MobilePush {
            enabled: *required(&push.enabled, &p.attr("enabled"))?,
            number_matching: expand_object(
                &push.number_matching,
                &p.attr("number_matching"),
                expand_enabled,
            )?,
        })
    })?;
    app.push_limit = expand_object(&config.push_limit, &path.attr("push_limit"), |limit, p| {
        Ok(PushLimit {
            count: optional(&limit.count),
            lock_duration: expand_object(&limit.lock_duration, &p.attr("lock_duration"), expand_time_period)?,
            time_period: expand_object(&limit.time_period, &p.attr("time_period"), expand_time_period)?,
        })
    })?;
    app.integrity_detection =
        optional_enum(&config.integrity_detection, &path.attr("integrity_detection"))?;

    match policy_type {
        PolicyType::Pingid => {
            app.app_type = Some(
                optional_enum(&config.app_type, &path.attr("type"))?
                    .unwrap_or(MobileApplicationType::PingIdAppConfig),
            );
            app.biometrics_enabled = optional(&config.biometrics_enabled);
            app.new_request_duration_configuration = expand_object(
                &config.new_request_duration_configuration,
                &path.attr("new_request_duration_configuration"),
                |nrdc, p| {
                    Ok(NewRequestDurationConfiguration {
                        device_timeout: time_period_or(
                            &nrdc.device_timeout,
                            &p.attr("device_timeout"),
                            seconds(DEVICE_TIMEOUT_DEFAULT),
                        )?,
                        total_timeout: time_period_or(
                            &nrdc.total_timeout,
                            &p.attr("total_timeout"),
                            seconds(TOTAL_TIMEOUT_DEFAULT),
                        )?,
                    })
                },
            )?;
            app.ip_pairing_configuration = expand_object(
                &config.ip_pairing_configuration,
                &path.attr("ip_pairing_configuration"),
                |ip, _| {
                    Ok(IpPairingConfiguration {
                        any_ip_address: optional(&ip.any_ip_address),
                        only_these_ip_addresses: optional(&ip.only_these_ip_addresses),
                    })
                },
            )?;
        }
        PolicyType::PingoneMfa => {
            app.auto_enrollment = expand_object(
                &config.auto_enrollment,
                &path.attr("auto_enrollment"),
                expand_enabled,
            )?;
            app.device_authorization = expand_object(
                &config.device_authorization,
                &path.attr("device_authorization"),
                |da, p| {
                    Ok(DeviceAuthorization {
                        enabled: *required(&da.enabled, &p.attr("enabled"))?,
                        extra_verification: optional_enum(
                            &da.extra_verification,
                            &p.attr("extra_verification"),
                        )?,
                    })
                },
            )?;
            app.push_timeout = expand_object(&config.push_timeout, &path.attr("push_timeout"), |t, p| {
                let time_unit = match t.time_unit.get() {
                    Some(unit) => parse_enum(unit, &p.attr("time_unit"))?,
                    None => crate::wire::TimeUnit::Seconds,
                };
                Ok(crate::wire::TimePeriod {
                    duration: *required(&t.duration, &p.attr("duration"))?,
                    time_unit,
                })
            })?;
        }
    }

    Ok(app)
}

fn expand_totp(config: &TotpConfig, path: &AttributePath) -> Result<Totp> {
    Ok(Totp {
        enabled: *required(&config.enabled, &path.attr("enabled"))?,
        otp: expand_object(&config.otp, &path.attr("otp"), |otp, p| {
            expand_failure_otp(otp, p, TOTP_OTP_FAILURE_COUNT_DEFAULT, TOTP_OTP_COOL_DOWN_DEFAULT)
        })?,
        pairing_disabled: optional(&config.pairing_disabled),
        prompt_for_nickname_on_pairing: optional(&config.prompt_for_nickname_on_pairing),
        uri_parameters: optional(&config.uri_parameters),
    })
}

fn expand_fido2(config: &Fido2FactorConfig, path: &AttributePath) -> Result<Fido2> {
    Ok(Fido2 {
        enabled: *required(&config.enabled, &path.attr("enabled"))?,
        fido2_policy_id: config
            .fido2_policy_id
            .get()
            .filter(|id| !id.is_empty())
            .cloned(),
        pairing_disabled: optional(&config.pairing_disabled),
        prompt_for_nickname_on_pairing: optional(&config.prompt_for_nickname_on_pairing),
    })
}

fn expand_pingid_device(config: &PingIdDeviceConfig, path: &AttributePath) -> Result<PingIdDevice> {
    Ok(PingIdDevice {
        enabled: *required(&config.enabled, &path.attr("enabled"))?,
        otp: expand_object(&config.otp, &path.attr("otp"), |otp, p| {
            let failure_path = p.attr("failure");
            let failure = match otp.failure.get() {
                Some(f) => PingIdOtpFailure {
                    count: optional(&f.count),
                    cool_down: expand_object(
                        &f.cool_down,
                        &failure_path.attr("cool_down"),
                        expand_time_period,
                    )?,
                },
                None => PingIdOtpFailure {
                    count: Some(PINGID_OTP_FAILURE_COUNT_DEFAULT),
                    cool_down: Some(minutes(PINGID_OTP_COOL_DOWN_DEFAULT)),
                },
            };
            Ok(PingIdDeviceOtp { failure })
        })?,
        pairing_disabled: optional(&config.pairing_disabled),
        pairing_key_lifetime: expand_object(
            &config.pairing_key_lifetime,
            &path.attr("pairing_key_lifetime"),
            expand_time_period,
        )?,
        prompt_for_nickname_on_pairing: optional(&config.prompt_for_nickname_on_pairing),
    })
}

/// Policy type implied by a wire record: PingID policies are the only
/// ones that carry desktop or Yubikey settings.
pub fn infer_policy_type(policy: &DeviceAuthenticationPolicy) -> PolicyType {
    if policy.desktop.is_some() || policy.yubikey.is_some() {
        PolicyType::Pingid
    } else {
        PolicyType::PingoneMfa
    }
}

/// Project an API record into configuration state.
pub fn to_state(
    policy: &DeviceAuthenticationPolicy,
    environment_id: &str,
    policy_type: PolicyType,
) -> Result<DevicePolicyConfig> {
    let id = policy
        .id
        .clone()
        .ok_or_else(|| Error::missing_data("device authentication policy id"))?;
    let pingid = policy_type == PolicyType::Pingid;

    Ok(DevicePolicyConfig {
        id: Value::Present(id),
        environment_id: Value::Present(environment_id.to_string()),
        policy_type: Value::Present(policy_type.as_str().to_string()),
        name: Value::Present(policy.name.clone()),
        default: Value::Present(policy.is_default()),
        authentication: policy
            .authentication
            .as_ref()
            .map(|a| AuthenticationConfig {
                device_selection: Value::Present(a.device_selection.to_string()),
            })
            .into(),
        new_device_notification: enum_state(&policy.new_device_notification),
        ignore_user_lock: policy.ignore_user_lock.into(),
        notifications_policy: policy
            .notifications_policy
            .as_ref()
            .map(|n| NotificationsPolicyConfig {
                id: Value::Present(n.id.clone()),
            })
            .into(),
        remember_me: policy
            .remember_me
            .as_ref()
            .map(|r| RememberMeConfig {
                web: Value::Present(RememberMeWebConfig {
                    enabled: Value::Present(r.web.enabled),
                    life_time: optional_time_period_state(&r.web.life_time),
                }),
            })
            .into(),
        sms: policy.sms.as_ref().map(offline_device_state).into(),
        voice: policy.voice.as_ref().map(offline_device_state).into(),
        email: policy.email.as_ref().map(offline_device_state).into(),
        mobile: policy
            .mobile
            .as_ref()
            .map(|m| mobile_state(m, policy_type))
            .into(),
        totp: policy.totp.as_ref().map(totp_state).into(),
        fido2: policy.fido2.as_ref().map(fido2_state).into(),
        desktop: if pingid {
            policy.desktop.as_ref().map(pingid_device_state).into()
        } else {
            Value::Absent
        },
        yubikey: if pingid {
            policy.yubikey.as_ref().map(pingid_device_state).into()
        } else {
            Value::Absent
        },
        oath_token: policy.oath_token.as_ref().map(pingid_device_state).into(),
        updated_at: timestamp_state(&policy.updated_at),
    })
}

fn failure_state(failure: &OtpFailure) -> OtpFailureConfig {
    OtpFailureConfig {
        count: Value::Present(failure.count),
        cool_down: Value::Present(time_period_state(&failure.cool_down)),
    }
}

fn failure_otp_state(otp: &FailureOtp) -> FailureOtpConfig {
    FailureOtpConfig {
        failure: Value::Present(failure_state(&otp.failure)),
    }
}

fn enabled_state(enabled: &Enabled) -> EnabledConfig {
    EnabledConfig::new(enabled.enabled)
}

fn offline_device_state(device: &OfflineDevice) -> OfflineDeviceConfig {
    OfflineDeviceConfig {
        enabled: Value::Present(device.enabled),
        otp: device
            .otp
            .as_ref()
            .map(|otp| OfflineOtpConfig {
                lifetime: Value::Present(time_period_state(&otp.lifetime)),
                failure: Value::Present(failure_state(&otp.failure)),
                otp_length: otp.otp_length.into(),
            })
            .into(),
        pairing_disabled: device.pairing_disabled.into(),
        prompt_for_nickname_on_pairing: device.prompt_for_nickname_on_pairing.into(),
    }
}

fn mobile_state(mobile: &Mobile, policy_type: PolicyType) -> MobileConfig {
    MobileConfig {
        enabled: Value::Present(mobile.enabled),
        otp: mobile.otp.as_ref().map(failure_otp_state).into(),
        prompt_for_nickname_on_pairing: mobile.prompt_for_nickname_on_pairing.into(),
        applications: mobile
            .applications
            .as_ref()
            .map(|apps| {
                apps.iter()
                    .map(|app| (app.id.clone(), mobile_application_state(app, policy_type)))
                    .collect::<BTreeMap<_, _>>()
            })
            .into(),
    }
}

fn mobile_application_state(app: &MobileApplication, policy_type: PolicyType) -> MobileApplicationConfig {
    let mut state = MobileApplicationConfig {
        otp: app.otp.as_ref().map(enabled_state).into(),
        pairing_disabled: app.pairing_disabled.into(),
        pairing_key_lifetime: optional_time_period_state(&app.pairing_key_lifetime),
        push: app
            .push
            .as_ref()
            .map(|push| PushConfig {
                enabled: Value::Present(push.enabled),
                number_matching: push.number_matching.as_ref().map(enabled_state).into(),
            })
            .into(),
        push_limit: app
            .push_limit
            .as_ref()
            .map(|limit| PushLimitConfig {
                count: limit.count.into(),
                lock_duration: optional_time_period_state(&limit.lock_duration),
                time_period: optional_time_period_state(&limit.time_period),
            })
            .into(),
        integrity_detection: enum_state(&app.integrity_detection),
        ..Default::default()
    };

    match policy_type {
        PolicyType::Pingid => {
            state.app_type = enum_state(&app.app_type);
            state.biometrics_enabled = app.biometrics_enabled.into();
            state.new_request_duration_configuration = app
                .new_request_duration_configuration
                .as_ref()
                .map(|nrdc| NewRequestDurationConfig {
                    device_timeout: Value::Present(time_period_state(&nrdc.device_timeout)),
                    total_timeout: Value::Present(time_period_state(&nrdc.total_timeout)),
                })
                .into();
            state.ip_pairing_configuration = app
                .ip_pairing_configuration
                .as_ref()
                .map(|ip| IpPairingConfig {
                    any_ip_address: ip.any_ip_address.into(),
                    only_these_ip_addresses: ip.only_these_ip_addresses.clone().into(),
                })
                .into();
        }
        PolicyType::PingoneMfa => {
            state.auto_enrollment = app.auto_enrollment.as_ref().map(enabled_state).into();
            state.device_authorization = app
                .device_authorization
                .as_ref()
                .map(|da| DeviceAuthorizationConfig {
                    enabled: Value::Present(da.enabled),
                    extra_verification: enum_state(&da.extra_verification),
                })
                .into();
            state.push_timeout = optional_time_period_state(&app.push_timeout);
        }
    }

    state
}

fn totp_state(totp: &Totp) -> TotpConfig {
    TotpConfig {
        enabled: Value::Present(totp.enabled),
        otp: totp.otp.as_ref().map(failure_otp_state).into(),
        pairing_disabled: totp.pairing_disabled.into(),
        prompt_for_nickname_on_pairing: totp.prompt_for_nickname_on_pairing.into(),
        uri_parameters: totp.uri_parameters.clone().into(),
    }
}

/// A missing policy pointer reads back as the empty string, matching the
/// value a user writes to clear it.
fn fido2_state(fido2: &Fido2) -> Fido2FactorConfig {
    Fido2FactorConfig {
        enabled: Value::Present(fido2.enabled),
        fido2_policy_id: Value::Present(fido2.fido2_policy_id.clone().unwrap_or_default()),
        pairing_disabled: fido2.pairing_disabled.into(),
        prompt_for_nickname_on_pairing: fido2.prompt_for_nickname_on_pairing.into(),
    }
}

fn pingid_device_state(device: &PingIdDevice) -> PingIdDeviceConfig {
    PingIdDeviceConfig {
        enabled: Value::Present(device.enabled),
        otp: device
            .otp
            .as_ref()
            .map(|otp| FailureOtpConfig {
                failure: Value::Present(OtpFailureConfig {
                    count: otp.failure.count.into(),
                    cool_down: optional_time_period_state(&otp.failure.cool_down),
                }),
            })
            .into(),
        pairing_disabled: device.pairing_disabled.into(),
        pairing_key_lifetime: optional_time_period_state(&device.pairing_key_lifetime),
        prompt_for_nickname_on_pairing: device.prompt_for_nickname_on_pairing.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{DeviceSelection, IntegrityDetection, NewDeviceNotification, TimeUnit};

    const ENV: &str = "0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f";
    const APP: &str = "a1b2c3d4-0000-4000-8000-000000000001";

    fn enabled_offline(enabled: bool) -> Value<OfflineDeviceConfig> {
        Value::Present(OfflineDeviceConfig {
            enabled: Value::Present(enabled),
            ..Default::default()
        })
    }

    fn pingone_mfa_policy() -> DevicePolicyConfig {
        let mut app = MobileApplicationConfig {
            integrity_detection: Value::Present("permissive".into()),
            otp: Value::Present(EnabledConfig::new(true)),
            push: Value::Present(PushConfig {
                enabled: Value::Present(true),
                ..Default::default()
            }),
            push_timeout: Value::Present(TimePeriodConfig {
                duration: Value::Present(100),
                time_unit: Value::Absent,
            }),
            auto_enrollment: Value::Present(EnabledConfig::new(true)),
            device_authorization: Value::Present(DeviceAuthorizationConfig {
                enabled: Value::Present(true),
                extra_verification: Value::Present("restrictive".into()),
            }),
            ..Default::default()
        };
        app.pairing_key_lifetime = Value::Present(TimePeriodConfig::new(10, "MINUTES"));

        let mut config = DevicePolicyConfig {
            environment_id: Value::Present(ENV.into()),
            policy_type: Value::Present("pingone_mfa".into()),
            name: Value::Present("p1".into()),
            sms: enabled_offline(true),
            voice: enabled_offline(false),
            email: enabled_offline(true),
            mobile: Value::Present(MobileConfig {
                enabled: Value::Present(true),
                applications: Value::Present([(APP.to_string(), app)].into_iter().collect()),
                ..Default::default()
            }),
            totp: Value::Present(TotpConfig {
                enabled: Value::Present(true),
                uri_parameters: Value::Present(
                    [("issuer".to_string(), "Example".to_string())]
                        .into_iter()
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        };
        config.apply_defaults();
        config
    }

    fn pingid_policy() -> DevicePolicyConfig {
        let app = MobileApplicationConfig {
            otp: Value::Present(EnabledConfig::new(true)),
            push: Value::Present(PushConfig {
                enabled: Value::Present(true),
                number_matching: Value::Present(EnabledConfig::new(true)),
            }),
            new_request_duration_configuration: Value::Present(NewRequestDurationConfig {
                device_timeout: Value::Present(TimePeriodConfig::new(15, "SECONDS")),
                total_timeout: Value::Present(TimePeriodConfig::new(30, "SECONDS")),
            }),
            ip_pairing_configuration: Value::Present(IpPairingConfig {
                any_ip_address: Value::Present(false),
                only_these_ip_addresses: Value::Present(vec![
                    "192.168.1.0/24".into(),
                    "10.0.0.0/8".into(),
                ]),
            }),
            ..Default::default()
        };
        let device = || {
            Value::Present(PingIdDeviceConfig {
                enabled: Value::Present(true),
                pairing_key_lifetime: Value::Present(TimePeriodConfig::new(48, "HOURS")),
                ..Default::default()
            })
        };

        let mut config = DevicePolicyConfig {
            environment_id: Value::Present(ENV.into()),
            policy_type: Value::Present("pingid".into()),
            name: Value::Present("Default MFA Policy".into()),
            sms: enabled_offline(true),
            voice: enabled_offline(true),
            email: enabled_offline(true),
            mobile: Value::Present(MobileConfig {
                enabled: Value::Present(true),
                applications: Value::Present([(APP.to_string(), app)].into_iter().collect()),
                ..Default::default()
            }),
            totp: Value::Present(TotpConfig {
                enabled: Value::Present(true),
                ..Default::default()
            }),
            desktop: device(),
            yubikey: device(),
            remember_me: Value::Present(RememberMeConfig {
                web: Value::Present(RememberMeWebConfig {
                    enabled: Value::Present(true),
                    life_time: Value::Present(TimePeriodConfig::new(60, "MINUTES")),
                }),
            }),
            ignore_user_lock: Value::Present(true),
            ..Default::default()
        };
        config.apply_defaults();
        config
    }

    fn with_server_fields(mut policy: DeviceAuthenticationPolicy) -> DeviceAuthenticationPolicy {
        policy.id = Some("5e5f7a0b-1111-4222-8333-444455556666".into());
        policy.updated_at = Some(chrono::Utc::now());
        policy
    }

    #[test]
    fn test_minimal_policy_expands_with_defaults() {
        let wire = expand(&pingone_mfa_policy()).unwrap();
        assert_eq!(
            wire.authentication.as_ref().unwrap().device_selection,
            DeviceSelection::DefaultToFirst
        );
        assert_eq!(wire.new_device_notification, Some(NewDeviceNotification::None));

        let sms = wire.sms.unwrap();
        assert_eq!(sms.pairing_disabled, Some(false));
        let otp = sms.otp.unwrap();
        assert_eq!(otp.lifetime, TimePeriod::new(30, TimeUnit::Minutes));
        assert_eq!(otp.failure.count, 3);

        assert!(wire.desktop.is_none());
        assert!(wire.default.is_none());
    }

    #[test]
    fn test_pingone_mfa_application_fields() {
        let wire = expand(&pingone_mfa_policy()).unwrap();
        let apps = wire.mobile.unwrap().applications.unwrap();
        let app = &apps[0];
        assert_eq!(app.id, APP);
        assert_eq!(app.integrity_detection, Some(IntegrityDetection::Permissive));
        assert_eq!(app.push_timeout, Some(TimePeriod::new(100, TimeUnit::Seconds)));
        assert!(app.auto_enrollment.as_ref().unwrap().enabled);
        assert!(app.app_type.is_none());
        assert!(app.new_request_duration_configuration.is_none());
        assert_eq!(app.push_limit.as_ref().unwrap().count, Some(5));
    }

    #[test]
    fn test_pingid_application_fields() {
        let wire = expand_default(&pingid_policy()).unwrap();
        assert_eq!(wire.default, Some(true));
        assert_eq!(wire.for_sign_on_policy, Some(false));
        assert!(wire.desktop.is_some());
        assert!(wire.yubikey.is_some());

        let app = &wire.mobile.unwrap().applications.unwrap()[0];
        assert_eq!(app.app_type, Some(MobileApplicationType::PingIdAppConfig));
        assert_eq!(app.biometrics_enabled, Some(false));
        assert_eq!(
            app.ip_pairing_configuration.as_ref().unwrap().any_ip_address,
            Some(false)
        );
        assert!(app.push_timeout.is_none());
        assert!(app.auto_enrollment.is_none());
    }

    #[test]
    fn test_round_trip_is_stable() {
        for config in [pingone_mfa_policy(), pingid_policy()] {
            let policy_type = config.policy_type().unwrap();
            let first = expand(&config).unwrap();
            let state = to_state(&with_server_fields(first.clone()), ENV, policy_type).unwrap();
            let second = expand(&state).unwrap();
            assert_eq!(first.without_computed(), second.without_computed());
        }
    }

    #[test]
    fn test_to_state_is_idempotent() {
        let wire = with_server_fields(expand(&pingid_policy()).unwrap());
        let a = to_state(&wire, ENV, PolicyType::Pingid).unwrap();
        let b = to_state(&wire, ENV, PolicyType::Pingid).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_absent_wire_fields_stay_absent() {
        let wire = DeviceAuthenticationPolicy {
            id: Some("id".into()),
            name: "bare".into(),
            ..Default::default()
        };
        let state = to_state(&wire, ENV, PolicyType::PingoneMfa).unwrap();
        assert!(state.authentication.is_absent());
        assert!(state.new_device_notification.is_absent());
        assert!(state.sms.is_absent());
        assert_eq!(state.default, Value::Present(false));
    }

    #[test]
    fn test_to_state_requires_id() {
        let wire = DeviceAuthenticationPolicy {
            name: "no id".into(),
            ..Default::default()
        };
        let err = to_state(&wire, ENV, PolicyType::PingoneMfa).unwrap_err();
        assert!(err.to_string().contains("Please report this to the provider maintainers"));
    }

    #[test]
    fn test_fido2_pointer_clears_to_empty_string() {
        let mut config = pingone_mfa_policy();
        config.fido2 = Value::Present(Fido2FactorConfig {
            enabled: Value::Present(true),
            pairing_disabled: Value::Present(true),
            fido2_policy_id: Value::Present("9f0e1d2c-3b4a-4596-8786-a5b4c3d2e1f0".into()),
            ..Default::default()
        });
        let wire = expand(&config).unwrap();
        assert_eq!(
            wire.fido2.as_ref().unwrap().fido2_policy_id.as_deref(),
            Some("9f0e1d2c-3b4a-4596-8786-a5b4c3d2e1f0")
        );

        let mut cleared = wire.clone();
        cleared.fido2.as_mut().unwrap().fido2_policy_id = None;
        let state = to_state(&with_server_fields(cleared), ENV, PolicyType::PingoneMfa).unwrap();
        assert_eq!(
            state.fido2.get().unwrap().fido2_policy_id,
            Value::Present(String::new())
        );
    }

    #[test]
    fn test_server_time_units_are_preserved() {
        let mut wire = with_server_fields(expand(&pingid_policy()).unwrap());
        wire.remember_me.as_mut().unwrap().web.life_time = Some(TimePeriod::new(1, TimeUnit::Hours));
        let state = to_state(&wire, ENV, PolicyType::Pingid).unwrap();
        let life_time = state
            .remember_me
            .get()
            .and_then(|r| r.web.get())
            .and_then(|w| w.life_time.get())
            .unwrap();
        assert_eq!(life_time, &TimePeriodConfig::new(1, "HOURS"));
    }

    #[test]
    fn test_infer_policy_type() {
        let pingid = expand(&pingid_policy()).unwrap();
        assert_eq!(infer_policy_type(&pingid), PolicyType::Pingid);
        let mfa = expand(&pingone_mfa_policy()).unwrap();
        assert_eq!(infer_policy_type(&mfa), PolicyType::PingoneMfa);
    }

    #[test]
    fn test_missing_required_attribute_reports_path() {
        let mut config = pingone_mfa_policy();
        config.sms.get_mut().unwrap().enabled = Value::Unknown;
        match expand(&config).unwrap_err() {
            Error::InvalidData { path, .. } => assert_eq!(path.to_string(), "sms.enabled"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
