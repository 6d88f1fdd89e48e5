//! Closed enumerations of the PingOne MFA API.

use thiserror::Error;

/// A string did not match any member of a closed enumeration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {type_name} value \"{value}\"")]
pub struct UnknownVariant {
    pub type_name: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn allowed_values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        type_name: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// How the user's devices are offered during authentication.
    DeviceSelection {
        DefaultToFirst => "DEFAULT_TO_FIRST",
        PromptToSelect => "PROMPT_TO_SELECT",
        AlwaysDisplayDevices => "ALWAYS_DISPLAY_DEVICES",
    }
);

string_enum!(
    NewDeviceNotification {
        None => "NONE",
        EmailThenSms => "EMAIL_THEN_SMS",
        SmsThenEmail => "SMS_THEN_EMAIL",
    }
);

string_enum!(
    TimeUnit {
        Seconds => "SECONDS",
        Minutes => "MINUTES",
        Hours => "HOURS",
        Days => "DAYS",
    }
);

string_enum!(
    ExtraVerification {
        Permissive => "permissive",
        Restrictive => "restrictive",
    }
);

string_enum!(
    IntegrityDetection {
        Permissive => "permissive",
        Restrictive => "restrictive",
    }
);

string_enum!(
    /// Per-application type marker sent for PingID policies.
    MobileApplicationType {
        PingIdAppConfig => "PING_ID_APP_CONFIG",
    }
);

string_enum!(
    AttestationRequirements {
        Direct => "DIRECT",
        None => "NONE",
    }
);

string_enum!(
    AuthenticatorAttachment {
        Platform => "PLATFORM",
        CrossPlatform => "CROSS_PLATFORM",
        Both => "BOTH",
    }
);

string_enum!(
    DiscoverableCredentials {
        Discouraged => "DISCOURAGED",
        Preferred => "PREFERRED",
        Required => "REQUIRED",
    }
);

string_enum!(
    MdsAuthenticatorsOption {
        None => "NONE",
        Global => "GLOBAL",
        Certified => "CERTIFIED",
        AuditOnly => "AUDIT_ONLY",
        Specific => "SPECIFIC",
    }
);

string_enum!(
    UserVerificationOption {
        Discouraged => "DISCOURAGED",
        Preferred => "PREFERRED",
        Required => "REQUIRED",
    }
);

string_enum!(
    PushCredentialType {
        FcmHttpV1 => "FCM_HTTP_V1",
        Apns => "APNS",
        Hms => "HMS",
    }
);

string_enum!(
    PairingKeyFormat {
        Numeric => "NUMERIC",
        Alphanumeric => "ALPHANUMERIC",
    }
);

impl TimeUnit {
    /// Seconds in one unit.
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }
}
