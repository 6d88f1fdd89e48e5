//! Plan-time defaults for device policies.
//!
//! Optional-and-computed attributes the user left out are materialized
//! here, before validation and expansion. Defaults for nested records only
//! apply when the enclosing record is present.

use super::device_policy::*;
use crate::value::Value;

pub const DEVICE_SELECTION_DEFAULT: &str = "DEFAULT_TO_FIRST";
pub const NEW_DEVICE_NOTIFICATION_DEFAULT: &str = "NONE";

pub const OFFLINE_OTP_LIFETIME_DEFAULT: i32 = 30;
pub const OFFLINE_OTP_FAILURE_COUNT_DEFAULT: i32 = 3;
pub const OFFLINE_OTP_COOL_DOWN_DEFAULT: i32 = 0;
pub const OFFLINE_OTP_LENGTH_DEFAULT: i32 = 6;

pub const MOBILE_OTP_FAILURE_COUNT_DEFAULT: i32 = 3;
pub const MOBILE_OTP_COOL_DOWN_DEFAULT: i32 = 2;
pub const TOTP_OTP_FAILURE_COUNT_DEFAULT: i32 = 3;
pub const TOTP_OTP_COOL_DOWN_DEFAULT: i32 = 2;
pub const PINGID_OTP_FAILURE_COUNT_DEFAULT: i32 = 3;
pub const PINGID_OTP_COOL_DOWN_DEFAULT: i32 = 2;

pub const PUSH_LIMIT_COUNT_DEFAULT: i32 = 5;
pub const PUSH_LIMIT_LOCK_DURATION_DEFAULT: i32 = 30;
pub const PUSH_LIMIT_TIME_PERIOD_DEFAULT: i32 = 10;

pub const DEVICE_TIMEOUT_DEFAULT: i32 = 25;
pub const TOTAL_TIMEOUT_DEFAULT: i32 = 40;

pub const REMEMBER_ME_LIFE_TIME_DEFAULT: i32 = 30;

const MINUTES: &str = "MINUTES";
const SECONDS: &str = "SECONDS";
const PING_ID_APP_CONFIG: &str = "PING_ID_APP_CONFIG";

fn failure(count: i32, cool_down_minutes: i32) -> OtpFailureConfig {
    OtpFailureConfig {
        count: Value::Present(count),
        cool_down: Value::Present(TimePeriodConfig::new(cool_down_minutes, MINUTES)),
    }
}

fn failure_otp(count: i32, cool_down_minutes: i32) -> FailureOtpConfig {
    FailureOtpConfig {
        failure: Value::Present(failure(count, cool_down_minutes)),
    }
}

impl DevicePolicyConfig {
    /// Materialize documented defaults into every absent
    /// optional-and-computed attribute.
    pub fn apply_defaults(&mut self) {
        let policy_type = self.policy_type();

        self.authentication
            .or_default_with(AuthenticationConfig::default);
        if let Some(auth) = self.authentication.get_mut() {
            auth.device_selection
                .or_default_with(|| DEVICE_SELECTION_DEFAULT.to_string());
        }

        self.new_device_notification
            .or_default_with(|| NEW_DEVICE_NOTIFICATION_DEFAULT.to_string());
        self.ignore_user_lock.or_default_with(|| false);

        self.remember_me.or_default_with(|| RememberMeConfig {
            web: Value::Present(RememberMeWebConfig {
                enabled: Value::Present(false),
                life_time: Value::Present(TimePeriodConfig::new(
                    REMEMBER_ME_LIFE_TIME_DEFAULT,
                    MINUTES,
                )),
            }),
        });

        for block in [&mut self.sms, &mut self.voice, &mut self.email] {
            if let Some(device) = block.get_mut() {
                device.apply_defaults();
            }
        }

        if let Some(mobile) = self.mobile.get_mut() {
            mobile.apply_defaults(policy_type);
        }

        if let Some(totp) = self.totp.get_mut() {
            totp.pairing_disabled.or_default_with(|| false);
            totp.otp.or_default_with(|| {
                failure_otp(TOTP_OTP_FAILURE_COUNT_DEFAULT, TOTP_OTP_COOL_DOWN_DEFAULT)
            });
        }

        self.fido2.or_default_with(|| Fido2FactorConfig {
            enabled: Value::Present(false),
            fido2_policy_id: Value::Present(String::new()),
            ..Default::default()
        });
        if let Some(fido2) = self.fido2.get_mut() {
            fido2.pairing_disabled.or_default_with(|| false);
        }

        for block in [&mut self.desktop, &mut self.yubikey] {
            if let Some(device) = block.get_mut() {
                device.apply_defaults();
            }
        }

        self.oath_token.or_default_with(|| PingIdDeviceConfig {
            enabled: Value::Present(false),
            prompt_for_nickname_on_pairing: Value::Present(false),
            ..Default::default()
        });
        if let Some(oath) = self.oath_token.get_mut() {
            oath.apply_defaults();
        }
    }
}

impl OfflineDeviceConfig {
    fn apply_defaults(&mut self) {
        self.pairing_disabled.or_default_with(|| false);
        self.otp.or_default_with(|| OfflineOtpConfig {
            lifetime: Value::Present(TimePeriodConfig::new(
                OFFLINE_OTP_LIFETIME_DEFAULT,
                MINUTES,
            )),
            failure: Value::Present(failure(
                OFFLINE_OTP_FAILURE_COUNT_DEFAULT,
                OFFLINE_OTP_COOL_DOWN_DEFAULT,
            )),
            otp_length: Value::Present(OFFLINE_OTP_LENGTH_DEFAULT),
        });
        if let Some(otp) = self.otp.get_mut() {
            otp.otp_length.or_default_with(|| OFFLINE_OTP_LENGTH_DEFAULT);
        }
    }
}

impl MobileConfig {
    fn apply_defaults(&mut self, policy_type: Option<PolicyType>) {
        self.otp.or_default_with(|| {
            failure_otp(MOBILE_OTP_FAILURE_COUNT_DEFAULT, MOBILE_OTP_COOL_DOWN_DEFAULT)
        });
        if let Some(failure) = self.otp.get_mut().and_then(|o| o.failure.get_mut()) {
            failure
                .count
                .or_default_with(|| MOBILE_OTP_FAILURE_COUNT_DEFAULT);
        }

        if let Some(apps) = self.applications.get_mut() {
            for app in apps.values_mut() {
                app.apply_defaults(policy_type);
            }
        }
    }
}

impl MobileApplicationConfig {
    fn apply_defaults(&mut self, policy_type: Option<PolicyType>) {
        self.pairing_disabled.or_default_with(|| false);

        self.push_limit.or_default_with(PushLimitConfig::default);
        if let Some(limit) = self.push_limit.get_mut() {
            limit.count.or_default_with(|| PUSH_LIMIT_COUNT_DEFAULT);
            limit.lock_duration.or_default_with(|| {
                TimePeriodConfig::new(PUSH_LIMIT_LOCK_DURATION_DEFAULT, MINUTES)
            });
            limit.time_period.or_default_with(|| {
                TimePeriodConfig::new(PUSH_LIMIT_TIME_PERIOD_DEFAULT, MINUTES)
            });
        }

        if let Some(push) = self.push.get_mut() {
            push.number_matching
                .or_default_with(|| EnabledConfig::new(false));
        }

        if let Some(timeout) = self.push_timeout.get_mut() {
            timeout.time_unit.or_default_with(|| SECONDS.to_string());
        }

        if policy_type == Some(PolicyType::Pingid) {
            self.app_type
                .or_default_with(|| PING_ID_APP_CONFIG.to_string());
            self.biometrics_enabled.or_default_with(|| false);

            if let Some(nrdc) = self.new_request_duration_configuration.get_mut() {
                nrdc.device_timeout.or_default_with(TimePeriodConfig::default);
                nrdc.total_timeout.or_default_with(TimePeriodConfig::default);
                for (period, duration) in [
                    (&mut nrdc.device_timeout, DEVICE_TIMEOUT_DEFAULT),
                    (&mut nrdc.total_timeout, TOTAL_TIMEOUT_DEFAULT),
                ] {
                    if let Some(period) = period.get_mut() {
                        period.duration.or_default_with(|| duration);
                        period.time_unit.or_default_with(|| SECONDS.to_string());
                    }
                }
            }

            if let Some(ip) = self.ip_pairing_configuration.get_mut() {
                ip.any_ip_address.or_default_with(|| true);
            }
        }
    }
}

impl PingIdDeviceConfig {
    fn apply_defaults(&mut self) {
        self.pairing_disabled.or_default_with(|| false);
        self.otp.or_default_with(|| {
            failure_otp(PINGID_OTP_FAILURE_COUNT_DEFAULT, PINGID_OTP_COOL_DOWN_DEFAULT)
        });
    }
}
