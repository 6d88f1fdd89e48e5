use super::rules::*;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::model::PushCredentialConfig;
use secrecy::ExposeSecret;

pub fn validate(config: &PushCredentialConfig) -> Diagnostics {
    let mut diags = Diagnostics::new();

    resource_id(&mut diags, &AttributePath::root("environment_id"), &config.environment_id);
    resource_id(&mut diags, &AttributePath::root("application_id"), &config.application_id);

    let blocks = config.configured_blocks();
    match blocks.len() {
        1 => {}
        0 => diags.add_error(
            "Missing Attribute Configuration",
            "Exactly one of these attributes must be configured: [fcm,apns,hms]",
        ),
        _ => diags.add_error(
            "Invalid Attribute Combination",
            format!(
                "Exactly one of these attributes must be configured: [fcm,apns,hms], got: [{}]",
                blocks.join(",")
            ),
        ),
    }

    if let Some(credentials) = config
        .fcm
        .get()
        .and_then(|fcm| fcm.google_service_account_credentials.get())
    {
        if let Err(e) = serde_json::from_str::<serde_json::Value>(credentials.expose_secret()) {
            diags.add_error_at(
                &AttributePath::root("fcm").attr("google_service_account_credentials"),
                "Invalid JSON String Value",
                format!("A string value was provided that is not valid JSON: {}", e),
            );
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApnsCredentialConfig, FcmCredentialConfig, HmsCredentialConfig};
    use crate::value::Value;
    use secrecy::SecretString;

    fn secret(s: &str) -> Value<SecretString> {
        Value::Present(SecretString::new(s.to_string().into_boxed_str()))
    }

    fn base() -> PushCredentialConfig {
        PushCredentialConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            application_id: Value::Present("a1b2c3d4-0000-4000-8000-000000000001".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exactly_one_block() {
        assert!(validate(&base()).mentions("Exactly one of these attributes"));

        let mut config = base();
        config.hms = Value::Present(HmsCredentialConfig {
            client_id: Value::Present("id".into()),
            client_secret: secret("s"),
        });
        assert!(validate(&config).is_empty());

        config.apns = Value::Present(ApnsCredentialConfig::default());
        assert!(validate(&config).mentions("got: [apns,hms]"));
    }

    #[test]
    fn test_fcm_credentials_must_be_json() {
        let mut config = base();
        config.fcm = Value::Present(FcmCredentialConfig {
            google_service_account_credentials: secret("{\"type\": \"service_account\"}"),
        });
        assert!(validate(&config).is_empty());

        config.fcm = Value::Present(FcmCredentialConfig {
            google_service_account_credentials: secret("not json"),
        });
        assert!(validate(&config).mentions("Invalid JSON String Value"));
    }
}
