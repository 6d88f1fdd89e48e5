//! Local device policy gates.
//!
//! Runs without I/O. Every check appends to one [`Diagnostics`] so a plan
//! with several problems reports all of them at once.

use super::rules::*;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::model::*;
use crate::value::Value;
use crate::wire::{
    DeviceSelection, ExtraVerification, IntegrityDetection, MobileApplicationType,
    NewDeviceNotification, TimeUnit,
};
use tracing::debug;

const POLICY_TYPE: &str = "policy_type";

const OTP_UNITS: &[&str] = &["MINUTES", "SECONDS"];
const SECONDS_ONLY: &[&str] = &["SECONDS"];
const PAIRING_KEY_LIFETIME_UNITS: &[&str] = &["MINUTES", "HOURS"];
const REMEMBER_ME_UNITS: &[&str] = &["MINUTES", "HOURS", "DAYS"];

const REMEMBER_ME_RANGES: &[(TimeUnit, i32, i32)] = &[
    (TimeUnit::Minutes, 1, 129_600),
    (TimeUnit::Hours, 1, 2_160),
    (TimeUnit::Days, 1, 90),
];
const PAIRING_KEY_LIFETIME_RANGES: &[(TimeUnit, i32, i32)] =
    &[(TimeUnit::Minutes, 1, 2_880), (TimeUnit::Hours, 1, 48)];
const PINGID_COOL_DOWN_RANGES: &[(TimeUnit, i32, i32)] =
    &[(TimeUnit::Seconds, 1, 1_800), (TimeUnit::Minutes, 1, 30)];

pub const OTP_FAILURE_COUNT_MIN: i32 = 1;
pub const OTP_FAILURE_COUNT_MAX: i32 = 7;
pub const PUSH_LIMIT_COUNT_MIN: i32 = 1;
pub const PUSH_LIMIT_COUNT_MAX: i32 = 50;
pub const OTP_LENGTH_MIN: i32 = 6;
pub const OTP_LENGTH_MAX: i32 = 10;
pub const DEVICE_TIMEOUT_MIN: i32 = 15;
pub const DEVICE_TIMEOUT_MAX: i32 = 75;
pub const TOTAL_TIMEOUT_MIN: i32 = 30;
pub const TOTAL_TIMEOUT_MAX: i32 = 90;
/// Seconds the total timeout must exceed the device timeout by.
pub const TIMEOUT_GAP: i32 = 15;

fn root(name: &str) -> AttributePath {
    AttributePath::root(name)
}

/// Run every local gate over a planned device policy.
pub fn validate(config: &DevicePolicyConfig) -> Diagnostics {
    let mut diags = Diagnostics::new();

    // 1. 属性単位のチェック
    debug!("Validating device policy attributes");
    validate_attributes(config, &mut diags);

    // 2. policy_type による組み合わせチェック
    debug!("Validating policy type gates");
    match config.policy_type() {
        Some(PolicyType::PingoneMfa) => validate_pingone_mfa(config, &mut diags),
        Some(PolicyType::Pingid) => validate_pingid(config, &mut diags),
        None => {}
    }

    // 3. モバイルアプリケーション単位のチェック
    for (id, app) in config.mobile_applications() {
        let path = root("mobile").attr("applications").key(id);
        resource_id_key(&mut diags, &path, id);
        validate_application(app, &path, config.policy_type(), &mut diags);
    }

    diags
}

fn resource_id_key(diags: &mut Diagnostics, path: &AttributePath, id: &str) {
    if !is_resource_id(id) {
        diags.add_error_at(
            path,
            "Invalid Attribute Value Match",
            format!(
                "Map key {} must be a valid PingOne resource ID, got: {}",
                path, id
            ),
        );
    }
}

fn validate_time_period(
    diags: &mut Diagnostics,
    path: &AttributePath,
    period: &Value<TimePeriodConfig>,
    units: &[&str],
) {
    if let Some(p) = period.get() {
        one_of(diags, &path.attr("time_unit"), &p.time_unit, units);
    }
}

fn validate_attributes(config: &DevicePolicyConfig, diags: &mut Diagnostics) {
    required_attribute(diags, &root("name"), &config.name);
    length_between(diags, &root("name"), &config.name, 1, usize::MAX);
    resource_id(diags, &root("environment_id"), &config.environment_id);

    let policy_types: Vec<&str> = PolicyType::ALL.iter().map(|p| p.as_str()).collect();
    one_of(diags, &root(POLICY_TYPE), &config.policy_type, &policy_types);

    if let Some(auth) = config.authentication.get() {
        one_of(
            diags,
            &root("authentication").attr("device_selection"),
            &auth.device_selection,
            &DeviceSelection::allowed_values(),
        );
    }
    one_of(
        diags,
        &root("new_device_notification"),
        &config.new_device_notification,
        &NewDeviceNotification::allowed_values(),
    );

    if let Some(notifications) = config.notifications_policy.get() {
        resource_id(diags, &root("notifications_policy").attr("id"), &notifications.id);
    }

    if let Some(web) = config.remember_me.get().and_then(|r| r.web.get()) {
        let path = root("remember_me").attr("web").attr("life_time");
        validate_time_period(diags, &path, &web.life_time, REMEMBER_ME_UNITS);
        if let Some(life_time) = web.life_time.get() {
            duration_for_unit(
                diags,
                &path.attr("duration"),
                &life_time.duration,
                &life_time.time_unit,
                REMEMBER_ME_RANGES,
            );
        }
    }

    for (name, block) in [("sms", &config.sms), ("voice", &config.voice), ("email", &config.email)] {
        required_attribute(diags, &root(name), block);
        if let Some(device) = block.get() {
            required_attribute(diags, &root(name).attr("enabled"), &device.enabled);
            validate_offline_device(device, &root(name), diags);
        }
    }

    required_attribute(diags, &root("mobile"), &config.mobile);
    if let Some(mobile) = config.mobile.get() {
        required_attribute(diags, &root("mobile").attr("enabled"), &mobile.enabled);
        validate_failure_otp(&mobile.otp, &root("mobile").attr("otp"), diags);
    }

    required_attribute(diags, &root("totp"), &config.totp);
    if let Some(totp) = config.totp.get() {
        required_attribute(diags, &root("totp").attr("enabled"), &totp.enabled);
        validate_failure_otp(&totp.otp, &root("totp").attr("otp"), diags);
    }

    if let Some(fido2) = config.fido2.get() {
        required_attribute(diags, &root("fido2").attr("enabled"), &fido2.enabled);
        if fido2.fido2_policy_id.get().is_some_and(|id| !id.is_empty()) {
            resource_id(
                diags,
                &root("fido2").attr("fido2_policy_id"),
                &fido2.fido2_policy_id,
            );
        }
    }

    for (name, block) in [
        ("desktop", &config.desktop),
        ("yubikey", &config.yubikey),
        ("oath_token", &config.oath_token),
    ] {
        if let Some(device) = block.get() {
            required_attribute(diags, &root(name).attr("enabled"), &device.enabled);
            validate_pingid_device(device, &root(name), diags);
        }
    }
}

fn validate_offline_device(device: &OfflineDeviceConfig, path: &AttributePath, diags: &mut Diagnostics) {
    let Some(otp) = device.otp.get() else {
        return;
    };
    let otp_path = path.attr("otp");
    validate_time_period(diags, &otp_path.attr("lifetime"), &otp.lifetime, OTP_UNITS);
    if let Some(failure) = otp.failure.get() {
        validate_time_period(
            diags,
            &otp_path.attr("failure").attr("cool_down"),
            &failure.cool_down,
            OTP_UNITS,
        );
    }
    between(
        diags,
        &otp_path.attr("otp_length"),
        &otp.otp_length,
        OTP_LENGTH_MIN,
        OTP_LENGTH_MAX,
    );
}

/// Mobile and TOTP failure settings.
fn validate_failure_otp(otp: &Value<FailureOtpConfig>, path: &AttributePath, diags: &mut Diagnostics) {
    let Some(failure) = otp.get().and_then(|o| o.failure.get()) else {
        return;
    };
    let failure_path = path.attr("failure");
    between(
        diags,
        &failure_path.attr("count"),
        &failure.count,
        OTP_FAILURE_COUNT_MIN,
        OTP_FAILURE_COUNT_MAX,
    );
    validate_time_period(diags, &failure_path.attr("cool_down"), &failure.cool_down, OTP_UNITS);
}

fn validate_pingid_device(device: &PingIdDeviceConfig, path: &AttributePath, diags: &mut Diagnostics) {
    if let Some(failure) = device.otp.get().and_then(|o| o.failure.get()) {
        let failure_path = path.attr("otp").attr("failure");
        between(
            diags,
            &failure_path.attr("count"),
            &failure.count,
            OTP_FAILURE_COUNT_MIN,
            OTP_FAILURE_COUNT_MAX,
        );
        if let Some(cool_down) = failure.cool_down.get() {
            let cool_down_path = failure_path.attr("cool_down");
            one_of(diags, &cool_down_path.attr("time_unit"), &cool_down.time_unit, OTP_UNITS);
            duration_for_unit(
                diags,
                &cool_down_path.attr("duration"),
                &cool_down.duration,
                &cool_down.time_unit,
                PINGID_COOL_DOWN_RANGES,
            );
        }
    }
    validate_pairing_key_lifetime(&device.pairing_key_lifetime, &path.attr("pairing_key_lifetime"), diags);
}

fn validate_pairing_key_lifetime(
    lifetime: &Value<TimePeriodConfig>,
    path: &AttributePath,
    diags: &mut Diagnostics,
) {
    validate_time_period(diags, path, lifetime, PAIRING_KEY_LIFETIME_UNITS);
    if let Some(l) = lifetime.get() {
        duration_for_unit(
            diags,
            &path.attr("duration"),
            &l.duration,
            &l.time_unit,
            PAIRING_KEY_LIFETIME_RANGES,
        );
    }
}

/// PingID-only factor blocks are rejected on PingOne MFA policies.
fn validate_pingone_mfa(config: &DevicePolicyConfig, diags: &mut Diagnostics) {
    let value = PolicyType::PingoneMfa.as_str();
    for (name, block) in [
        ("desktop", &config.desktop),
        ("yubikey", &config.yubikey),
        ("oath_token", &config.oath_token),
    ] {
        conflicts_if(
            diags,
            &root(name),
            DevicePolicyConfig::pingid_factor_enabled(block),
            POLICY_TYPE,
            value,
        );
    }
}

fn validate_pingid(config: &DevicePolicyConfig, diags: &mut Diagnostics) {
    let value = PolicyType::Pingid.as_str();

    let mobile_enabled = config.mobile.get().map(|m| &m.enabled);
    if matches!(mobile_enabled, Some(Value::Present(false)) | None) && !config.mobile.is_unknown() {
        diags.add_error_at(
            &root("mobile").attr("enabled"),
            "Invalid argument combination",
            format!(
                "Attribute mobile.enabled must be true when attribute {} value is \"{}\"",
                POLICY_TYPE, value
            ),
        );
    }

    required_if(diags, &root("desktop"), config.desktop.is_absent(), POLICY_TYPE, value);
    required_if(diags, &root("yubikey"), config.yubikey.is_absent(), POLICY_TYPE, value);
}

fn validate_application(
    app: &MobileApplicationConfig,
    path: &AttributePath,
    policy_type: Option<PolicyType>,
    diags: &mut Diagnostics,
) {
    one_of(
        diags,
        &path.attr("integrity_detection"),
        &app.integrity_detection,
        &IntegrityDetection::allowed_values(),
    );
    one_of(
        diags,
        &path.attr("type"),
        &app.app_type,
        &MobileApplicationType::allowed_values(),
    );
    for (name, enabled) in [
        ("otp", app.otp.get().map(|o| &o.enabled)),
        ("push", app.push.get().map(|p| &p.enabled)),
        ("auto_enrollment", app.auto_enrollment.get().map(|a| &a.enabled)),
        ("device_authorization", app.device_authorization.get().map(|d| &d.enabled)),
    ] {
        if let Some(enabled) = enabled {
            required_attribute(diags, &path.attr(name).attr("enabled"), enabled);
        }
    }
    if let Some(nm) = app.push.get().and_then(|p| p.number_matching.get()) {
        required_attribute(
            diags,
            &path.attr("push").attr("number_matching").attr("enabled"),
            &nm.enabled,
        );
    }

    if let Some(da) = app.device_authorization.get() {
        one_of(
            diags,
            &path.attr("device_authorization").attr("extra_verification"),
            &da.extra_verification,
            &ExtraVerification::allowed_values(),
        );
    }

    validate_pairing_key_lifetime(&app.pairing_key_lifetime, &path.attr("pairing_key_lifetime"), diags);

    if let Some(limit) = app.push_limit.get() {
        let limit_path = path.attr("push_limit");
        between(
            diags,
            &limit_path.attr("count"),
            &limit.count,
            PUSH_LIMIT_COUNT_MIN,
            PUSH_LIMIT_COUNT_MAX,
        );
        validate_time_period(diags, &limit_path.attr("lock_duration"), &limit.lock_duration, OTP_UNITS);
        validate_time_period(diags, &limit_path.attr("time_period"), &limit.time_period, OTP_UNITS);
    }

    // push_timeout is only expressed in seconds
    validate_time_period(diags, &path.attr("push_timeout"), &app.push_timeout, SECONDS_ONLY);

    if let Some(nrdc) = app.new_request_duration_configuration.get() {
        validate_request_duration(nrdc, &path.attr("new_request_duration_configuration"), diags);
    }

    if let Some(ip) = app.ip_pairing_configuration.get() {
        let ip_path = path.attr("ip_pairing_configuration");
        let list_path = ip_path.attr("only_these_ip_addresses");
        if ip.any_ip_address == Value::Present(false) {
            let empty = ip
                .only_these_ip_addresses
                .get()
                .map(|list| list.is_empty())
                .unwrap_or(!ip.only_these_ip_addresses.is_unknown());
            if empty {
                diags.add_error_at(
                    &list_path,
                    "Missing required argument",
                    format!(
                        "The argument {} is required because {} is configured as: false.",
                        list_path,
                        ip_path.attr("any_ip_address")
                    ),
                );
            }
        }
        if let Some(list) = ip.only_these_ip_addresses.get() {
            for (i, entry) in list.iter().enumerate() {
                cidr(diags, &list_path.index(i), entry);
            }
        }
    }

    // Per-application fields that belong to the other policy type.
    match policy_type {
        Some(PolicyType::Pingid) => {
            let value = PolicyType::Pingid.as_str();
            required_if(
                diags,
                &path.attr("new_request_duration_configuration"),
                app.new_request_duration_configuration.is_absent(),
                POLICY_TYPE,
                value,
            );
            required_if(
                diags,
                &path.attr("ip_pairing_configuration"),
                app.ip_pairing_configuration.is_absent(),
                POLICY_TYPE,
                value,
            );
            for (name, is_set) in [
                ("auto_enrollment", !app.auto_enrollment.is_absent()),
                ("device_authorization", !app.device_authorization.is_absent()),
                ("integrity_detection", !app.integrity_detection.is_absent()),
                ("push_timeout", !app.push_timeout.is_absent()),
            ] {
                conflicts_if(diags, &path.attr(name), is_set, POLICY_TYPE, value);
            }
        }
        Some(PolicyType::PingoneMfa) => {
            let value = PolicyType::PingoneMfa.as_str();
            for (name, is_set) in [
                ("biometrics_enabled", !app.biometrics_enabled.is_absent()),
                (
                    "new_request_duration_configuration",
                    !app.new_request_duration_configuration.is_absent(),
                ),
                ("ip_pairing_configuration", !app.ip_pairing_configuration.is_absent()),
                ("type", !app.app_type.is_absent()),
            ] {
                conflicts_if(diags, &path.attr(name), is_set, POLICY_TYPE, value);
            }
        }
        None => {}
    }
}

fn validate_request_duration(
    nrdc: &NewRequestDurationConfig,
    path: &AttributePath,
    diags: &mut Diagnostics,
) {
    let device_path = path.attr("device_timeout");
    let total_path = path.attr("total_timeout");

    if let Some(device) = nrdc.device_timeout.get() {
        one_of(diags, &device_path.attr("time_unit"), &device.time_unit, SECONDS_ONLY);
        between(
            diags,
            &device_path.attr("duration"),
            &device.duration,
            DEVICE_TIMEOUT_MIN,
            DEVICE_TIMEOUT_MAX,
        );
    }
    if let Some(total) = nrdc.total_timeout.get() {
        one_of(diags, &total_path.attr("time_unit"), &total.time_unit, SECONDS_ONLY);
        between(
            diags,
            &total_path.attr("duration"),
            &total.duration,
            TOTAL_TIMEOUT_MIN,
            TOTAL_TIMEOUT_MAX,
        );
    }

    let device = nrdc.device_timeout.get().and_then(|d| d.duration.copied());
    let total = nrdc.total_timeout.get().and_then(|t| t.duration.copied());
    if let (Some(device), Some(total)) = (device, total) {
        if total < device + TIMEOUT_GAP {
            diags.add_error_at(
                &total_path.attr("duration"),
                "Invalid Attribute Value",
                format!(
                    "The total_timeout.duration ({}) must exceed device_timeout.duration ({}) by at least {} seconds.",
                    total, device, TIMEOUT_GAP
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = "a1b2c3d4-0000-4000-8000-000000000001";

    fn base(policy_type: &str) -> DevicePolicyConfig {
        DevicePolicyConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            policy_type: Value::Present(policy_type.into()),
            name: Value::Present("p1".into()),
            sms: offline(true),
            voice: offline(false),
            email: offline(true),
            mobile: Value::Present(MobileConfig {
                enabled: Value::Present(true),
                ..Default::default()
            }),
            totp: Value::Present(TotpConfig {
                enabled: Value::Present(true),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn offline(enabled: bool) -> Value<OfflineDeviceConfig> {
        Value::Present(OfflineDeviceConfig {
            enabled: Value::Present(enabled),
            ..Default::default()
        })
    }

    /// Error count at attribute paths ending with `suffix`.
    fn errors_at(diags: &Diagnostics, suffix: &str) -> usize {
        diags
            .errors()
            .filter(|d| d.path.as_ref().is_some_and(|p| p.to_string().ends_with(suffix)))
            .count()
    }

    fn pingid_app() -> MobileApplicationConfig {
        MobileApplicationConfig {
            new_request_duration_configuration: Value::Present(NewRequestDurationConfig {
                device_timeout: Value::Present(TimePeriodConfig::new(25, "SECONDS")),
                total_timeout: Value::Present(TimePeriodConfig::new(40, "SECONDS")),
            }),
            ip_pairing_configuration: Value::Present(IpPairingConfig {
                any_ip_address: Value::Present(true),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn with_app(mut config: DevicePolicyConfig, app: MobileApplicationConfig) -> DevicePolicyConfig {
        if let Some(mobile) = config.mobile.get_mut() {
            mobile.applications = Value::Present([(APP.to_string(), app)].into_iter().collect());
        }
        config
    }

    fn enabled_device(enabled: bool) -> Value<PingIdDeviceConfig> {
        Value::Present(PingIdDeviceConfig {
            enabled: Value::Present(enabled),
            ..Default::default()
        })
    }

    fn pingid() -> DevicePolicyConfig {
        let mut config = with_app(base("pingid"), pingid_app());
        config.desktop = enabled_device(true);
        config.yubikey = enabled_device(true);
        config
    }

    #[test]
    fn test_valid_policies_pass() {
        let mut mfa = base("pingone_mfa");
        mfa.apply_defaults();
        assert!(!validate(&mfa).has_error(), "{}", validate(&mfa));

        let mut pid = pingid();
        pid.apply_defaults();
        assert!(!validate(&pid).has_error(), "{}", validate(&pid));
    }

    #[test]
    fn test_pingone_mfa_rejects_enabled_pingid_factors() {
        for field in ["desktop", "yubikey", "oath_token"] {
            let mut config = base("pingone_mfa");
            match field {
                "desktop" => config.desktop = enabled_device(true),
                "yubikey" => config.yubikey = enabled_device(true),
                _ => config.oath_token = enabled_device(true),
            }
            let diags = validate(&config);
            assert!(diags.mentions("Invalid argument combination"), "{field}");
        }
    }

    #[test]
    fn test_pingone_mfa_allows_disabled_pingid_factors() {
        let mut config = base("pingone_mfa");
        config.desktop = enabled_device(false);
        config.oath_token = enabled_device(false);
        assert!(!validate(&config).has_error());
    }

    #[test]
    fn test_pingid_requires_mobile_and_devices() {
        let mut config = base("pingid");
        config.mobile.get_mut().unwrap().enabled = Value::Present(false);
        let diags = validate(&config);
        assert!(diags.mentions("Attribute mobile.enabled must be true when attribute policy_type value is \"pingid\""));
        assert!(diags.mentions("The argument desktop is required because policy_type is configured as: \"pingid\"."));
        assert!(diags.mentions("The argument yubikey is required"));
    }

    #[test]
    fn test_pingid_application_gates() {
        let mut app = MobileApplicationConfig {
            auto_enrollment: Value::Present(EnabledConfig::new(true)),
            ..Default::default()
        };
        app.integrity_detection = Value::Present("permissive".into());
        let mut config = with_app(base("pingid"), app);
        config.desktop = enabled_device(true);
        config.yubikey = enabled_device(true);

        let diags = validate(&config);
        assert!(diags.mentions("new_request_duration_configuration is required"));
        assert!(diags.mentions("ip_pairing_configuration is required"));
        assert_eq!(
            diags
                .errors()
                .filter(|d| d.summary == "Invalid argument combination")
                .count(),
            2
        );
    }

    #[test]
    fn test_pingone_mfa_application_rejects_pingid_fields() {
        let app = MobileApplicationConfig {
            biometrics_enabled: Value::Present(false),
            ..Default::default()
        };
        let diags = validate(&with_app(base("pingone_mfa"), app));
        assert!(diags.mentions("Invalid argument combination"));
    }

    #[test]
    fn test_ip_pairing_requires_cidr() {
        let mut app = pingid_app();
        app.ip_pairing_configuration = Value::Present(IpPairingConfig {
            any_ip_address: Value::Present(false),
            only_these_ip_addresses: Value::Present(vec!["192.168.1.1".into()]),
        });
        let mut config = pingid();
        config.mobile.get_mut().unwrap().applications =
            Value::Present([(APP.to_string(), app)].into_iter().collect());
        let diags = validate(&config);
        assert!(diags.mentions("Expected value to be in CIDR notation"));
    }

    #[test]
    fn test_ip_pairing_requires_list_when_any_is_false() {
        let mut app = pingid_app();
        app.ip_pairing_configuration = Value::Present(IpPairingConfig {
            any_ip_address: Value::Present(false),
            only_these_ip_addresses: Value::Absent,
        });
        let mut config = pingid();
        config.mobile.get_mut().unwrap().applications =
            Value::Present([(APP.to_string(), app)].into_iter().collect());
        assert!(validate(&config).mentions("is configured as: false"));
    }

    #[test]
    fn test_remember_me_ranges() {
        for (duration, unit, ok) in [
            (129_600, "MINUTES", true),
            (129_601, "MINUTES", false),
            (2_160, "HOURS", true),
            (2_161, "HOURS", false),
            (90, "DAYS", true),
            (91, "DAYS", false),
        ] {
            let mut config = base("pingone_mfa");
            config.remember_me = Value::Present(RememberMeConfig {
                web: Value::Present(RememberMeWebConfig {
                    enabled: Value::Present(true),
                    life_time: Value::Present(TimePeriodConfig::new(duration, unit)),
                }),
            });
            assert_eq!(!validate(&config).has_error(), ok, "{duration} {unit}");
        }
    }

    #[test]
    fn test_count_ranges() {
        for (count, ok) in [(1, true), (50, true), (0, false), (51, false)] {
            let app = MobileApplicationConfig {
                push_limit: Value::Present(PushLimitConfig {
                    count: Value::Present(count),
                    ..Default::default()
                }),
                ..Default::default()
            };
            let config = with_app(base("pingone_mfa"), app);
            assert_eq!(!validate(&config).has_error(), ok, "push limit {count}");
        }

        for (count, ok) in [(1, true), (7, true), (0, false), (8, false)] {
            let mut config = base("pingone_mfa");
            config.mobile.get_mut().unwrap().otp = Value::Present(FailureOtpConfig {
                failure: Value::Present(OtpFailureConfig {
                    count: Value::Present(count),
                    cool_down: Value::Present(TimePeriodConfig::new(2, "MINUTES")),
                }),
            });
            assert_eq!(!validate(&config).has_error(), ok, "otp failure {count}");
        }
    }

    #[test]
    fn test_push_timeout_must_be_seconds() {
        let app = MobileApplicationConfig {
            push_timeout: Value::Present(TimePeriodConfig::new(2, "MINUTES")),
            ..Default::default()
        };
        let diags = validate(&with_app(base("pingone_mfa"), app));
        assert!(diags.mentions("value must be one of: [\"SECONDS\"]"));
    }

    #[test]
    fn test_total_timeout_gap() {
        let mut app = pingid_app();
        app.new_request_duration_configuration = Value::Present(NewRequestDurationConfig {
            device_timeout: Value::Present(TimePeriodConfig::new(30, "SECONDS")),
            total_timeout: Value::Present(TimePeriodConfig::new(40, "SECONDS")),
        });
        let mut config = pingid();
        config.mobile.get_mut().unwrap().applications =
            Value::Present([(APP.to_string(), app)].into_iter().collect());
        let diags = validate(&config);
        let error = diags.errors().next().unwrap();
        assert!(error
            .path
            .as_ref()
            .unwrap()
            .to_string()
            .ends_with("total_timeout.duration"));
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        let mut config = base("pingone_mfa");
        config.new_device_notification = Value::Present("SOMETIMES".into());
        config.authentication = Value::Present(AuthenticationConfig {
            device_selection: Value::Present("RANDOM".into()),
        });
        let diags = validate(&config);
        assert_eq!(diags.errors().count(), 2);
    }

    #[test]
    fn test_factor_blocks_are_required() {
        for name in ["sms", "voice", "email", "mobile", "totp"] {
            let mut config = base("pingone_mfa");
            match name {
                "sms" => config.sms = Value::Absent,
                "voice" => config.voice = Value::Absent,
                "email" => config.email = Value::Absent,
                "mobile" => config.mobile = Value::Absent,
                _ => config.totp = Value::Absent,
            }
            let diags = validate(&config);
            assert_eq!(errors_at(&diags, name), 1, "{name}: {diags}");
            assert!(diags.mentions(&format!("Must set a configuration value for the {name} attribute")));
        }

        let bare = DevicePolicyConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            name: Value::Present("p1".into()),
            ..Default::default()
        };
        assert_eq!(validate(&bare).errors().count(), 5);
    }

    #[test]
    fn test_unknown_factor_block_is_accepted() {
        let mut config = base("pingone_mfa");
        config.voice = Value::Unknown;
        config.totp = Value::Unknown;
        assert!(!validate(&config).has_error());
    }

    #[test]
    fn test_factor_enabled_is_required() {
        let mut config = base("pingone_mfa");
        config.sms = Value::Present(OfflineDeviceConfig {
            pairing_disabled: Value::Present(true),
            ..Default::default()
        });
        config.fido2 = Value::Present(Fido2FactorConfig {
            pairing_disabled: Value::Present(true),
            ..Default::default()
        });
        config.oath_token = Value::Present(PingIdDeviceConfig::default());
        let config = with_app(
            config,
            MobileApplicationConfig {
                push: Value::Present(PushConfig {
                    number_matching: Value::Present(EnabledConfig::default()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        let diags = validate(&config);
        for suffix in [
            "sms.enabled",
            "fido2.enabled",
            "oath_token.enabled",
            "push.enabled",
            "number_matching.enabled",
        ] {
            assert_eq!(errors_at(&diags, suffix), 1, "{suffix}: {diags}");
        }
        assert_eq!(diags.errors().count(), 5);
    }

    #[test]
    fn test_otp_length_range() {
        for (length, ok) in [(5, false), (6, true), (10, true), (11, false)] {
            let mut config = base("pingone_mfa");
            config.sms = Value::Present(OfflineDeviceConfig {
                enabled: Value::Present(true),
                otp: Value::Present(OfflineOtpConfig {
                    otp_length: Value::Present(length),
                    ..Default::default()
                }),
                ..Default::default()
            });
            let diags = validate(&config);
            assert_eq!(errors_at(&diags, "sms.otp.otp_length") == 0, ok, "otp length {length}");
            assert_eq!(!diags.has_error(), ok);
        }
    }

    fn with_request_durations(device: i32, total: i32) -> DevicePolicyConfig {
        let mut app = pingid_app();
        app.new_request_duration_configuration = Value::Present(NewRequestDurationConfig {
            device_timeout: Value::Present(TimePeriodConfig::new(device, "SECONDS")),
            total_timeout: Value::Present(TimePeriodConfig::new(total, "SECONDS")),
        });
        let mut config = pingid();
        config.mobile.get_mut().unwrap().applications =
            Value::Present([(APP.to_string(), app)].into_iter().collect());
        config
    }

    #[test]
    fn test_device_timeout_range() {
        for (device, ok) in [(14, false), (15, true), (75, true), (76, false)] {
            let diags = validate(&with_request_durations(device, 90));
            assert_eq!(
                errors_at(&diags, "device_timeout.duration") == 0,
                ok,
                "device timeout {device}"
            );
        }
    }

    #[test]
    fn test_total_timeout_range() {
        for (total, ok) in [(29, false), (30, true), (90, true), (91, false)] {
            let diags = validate(&with_request_durations(15, total));
            assert_eq!(!diags.has_error(), ok, "total timeout {total}: {diags}");
        }
        let diags = validate(&with_request_durations(15, 91));
        assert!(diags.mentions("value must be between 30 and 90, got: 91"));
    }

    #[test]
    fn test_pairing_key_lifetime_ranges() {
        for (duration, unit, ok) in [
            (0, "MINUTES", false),
            (1, "MINUTES", true),
            (2_880, "MINUTES", true),
            (2_881, "MINUTES", false),
            (1, "HOURS", true),
            (48, "HOURS", true),
            (49, "HOURS", false),
        ] {
            let app = MobileApplicationConfig {
                pairing_key_lifetime: Value::Present(TimePeriodConfig::new(duration, unit)),
                ..Default::default()
            };
            let config = with_app(base("pingone_mfa"), app);
            assert_eq!(!validate(&config).has_error(), ok, "{duration} {unit}");
        }
    }

    fn with_desktop_failure(count: i32, cool_down: TimePeriodConfig) -> DevicePolicyConfig {
        let mut config = pingid();
        config.desktop = Value::Present(PingIdDeviceConfig {
            enabled: Value::Present(true),
            otp: Value::Present(FailureOtpConfig {
                failure: Value::Present(OtpFailureConfig {
                    count: Value::Present(count),
                    cool_down: Value::Present(cool_down),
                }),
            }),
            ..Default::default()
        });
        config
    }

    #[test]
    fn test_pingid_cool_down_ranges() {
        for (duration, unit, ok) in [
            (0, "SECONDS", false),
            (1, "SECONDS", true),
            (1_800, "SECONDS", true),
            (1_801, "SECONDS", false),
            (1, "MINUTES", true),
            (30, "MINUTES", true),
            (31, "MINUTES", false),
        ] {
            let config = with_desktop_failure(3, TimePeriodConfig::new(duration, unit));
            let diags = validate(&config);
            assert_eq!(
                errors_at(&diags, "desktop.otp.failure.cool_down.duration") == 0,
                ok,
                "{duration} {unit}"
            );
        }
    }

    #[test]
    fn test_desktop_otp_failure_count_range() {
        for (count, ok) in [(0, false), (1, true), (7, true), (8, false)] {
            let config = with_desktop_failure(count, TimePeriodConfig::new(2, "MINUTES"));
            let diags = validate(&config);
            assert_eq!(
                errors_at(&diags, "desktop.otp.failure.count") == 0,
                ok,
                "desktop failure count {count}"
            );
        }
    }
}
