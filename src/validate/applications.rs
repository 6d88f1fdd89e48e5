//! Mobile application gates that need the Application resource.

use crate::appref::ApplicationLookup;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::error::Result;
use crate::model::{DevicePolicyConfig, MobileApplicationConfig, PolicyType};
use crate::validate::rules::is_resource_id;
use crate::wire::Application;
use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const SHAPE_HINT: &str = "To configure a mobile application in PingOne, the application must be an OIDC application of type `Native`, with a package or bundle set.";

/// Check every configured mobile application against the live
/// Application resource. Lookup failures propagate; gate failures
/// accumulate as diagnostics. Keys that are not resource ids are left to
/// the attribute validator.
pub async fn validate(
    config: &DevicePolicyConfig,
    environment_id: &str,
    lookup: &dyn ApplicationLookup,
    cancel: &CancellationToken,
) -> Result<Diagnostics> {
    let mut diags = Diagnostics::new();
    let policy_type = config.policy_type();

    let checked: Vec<(&String, &MobileApplicationConfig)> = config
        .mobile_applications()
        .filter(|(id, _)| is_resource_id(id))
        .collect();
    let applications = try_join_all(checked.iter().map(|(id, _)| {
        debug!("Checking mobile application {}", id);
        lookup.application(environment_id, id, cancel)
    }))
    .await?;

    for ((id, app_config), application) in checked.into_iter().zip(applications) {
        let path = AttributePath::root("mobile").attr("applications").key(id);
        let Some(application) = check_shape(application.as_ref(), id, &path, &mut diags) else {
            continue;
        };
        check_integrity_detection(application, app_config, id, &path, policy_type, &mut diags);
    }

    Ok(diags)
}

fn check_shape<'a>(
    application: Option<&'a Application>,
    id: &str,
    path: &AttributePath,
    diags: &mut Diagnostics,
) -> Option<&'a Application> {
    let Some(application) = application else {
        diags.add_error_at(
            path,
            "Application not found",
            format!(
                "An application ID, {}, configured as the map key in the `mobile.applications` set does not exist",
                id
            ),
        );
        return None;
    };

    if !application.is_oidc() {
        diags.add_error_at(
            path,
            "Invalid application type",
            format!(
                "An application ID, {}, configured as the map key in `mobile.applications` is not of type OIDC.  {}",
                id, SHAPE_HINT
            ),
        );
        return None;
    }

    if !application.is_native_app() {
        diags.add_error_at(
            path,
            "Invalid application type",
            format!(
                "An application ID, {}, configured as the map key in `mobile.applications` is an OIDC application but not of type `Native`.  {}",
                id, SHAPE_HINT
            ),
        );
        return None;
    }

    if !application.has_mobile_config() {
        diags.add_error_at(
            path,
            "Missing application configuration",
            format!(
                "An application ID, {}, configured as the map key in `mobile.applications` does not contain mobile application configuration.  {}",
                id, SHAPE_HINT
            ),
        );
        return None;
    }

    Some(application)
}

/// Integrity detection needs the application's own detection enabled.
fn check_integrity_detection(
    application: &Application,
    app_config: &MobileApplicationConfig,
    id: &str,
    path: &AttributePath,
    policy_type: Option<PolicyType>,
    diags: &mut Diagnostics,
) {
    let enabled_on_app = application.integrity_detection_enabled();
    let path = path.attr("integrity_detection");

    if app_config.integrity_detection.is_present() && !enabled_on_app {
        diags.add_error_at(
            &path,
            "Mobile application integrity detection setting has no effect",
            format!(
                "An application ID, {}, configured as the map key in `mobile.applications` has integrity detection disabled. Setting the `mobile.application.integrity_detection` parameter has no effect.",
                id
            ),
        );
    }

    if app_config.integrity_detection.is_absent()
        && enabled_on_app
        && policy_type != Some(PolicyType::Pingid)
    {
        diags.add_error_at(
            &path,
            "Invalid mobile application integrity detection setting",
            format!(
                "An application ID, {}, configured as the map key in `mobile.applications` has integrity detection enabled. This policy must specify the level of integrity detection in the `mobile.application.integrity_detection` parameter.",
                id
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appref::testing::StaticLookup;
    use crate::model::MobileConfig;
    use crate::value::Value;
    use crate::wire::application::{
        ApplicationIntegrityDetection, ApplicationMobile, PROTOCOL_OPENID_CONNECT, TYPE_NATIVE_APP,
    };

    const APP: &str = "a1b2c3d4-0000-4000-8000-000000000001";

    fn native_app(integrity: bool) -> Application {
        Application {
            id: APP.into(),
            name: Some("Mobile".into()),
            protocol: Some(PROTOCOL_OPENID_CONNECT.into()),
            app_type: Some(TYPE_NATIVE_APP.into()),
            mobile: Some(ApplicationMobile {
                bundle_id: Some("com.example.app".into()),
                integrity_detection: Some(ApplicationIntegrityDetection {
                    mode: Some(if integrity { "ENABLED" } else { "DISABLED" }.into()),
                }),
                ..Default::default()
            }),
        }
    }

    fn policy(integrity_detection: Option<&str>) -> DevicePolicyConfig {
        let app = MobileApplicationConfig {
            integrity_detection: integrity_detection.map(str::to_string).into(),
            ..Default::default()
        };
        DevicePolicyConfig {
            policy_type: Value::Present("pingone_mfa".into()),
            mobile: Value::Present(MobileConfig {
                enabled: Value::Present(true),
                applications: Value::Present([(APP.to_string(), app)].into_iter().collect()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    async fn run(config: &DevicePolicyConfig, apps: Vec<Application>) -> Diagnostics {
        let lookup = StaticLookup::with(apps);
        validate(config, "env", &lookup, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_matching_integrity_detection_passes() {
        assert!(run(&policy(Some("permissive")), vec![native_app(true)]).await.is_empty());
        assert!(run(&policy(None), vec![native_app(false)]).await.is_empty());
    }

    #[tokio::test]
    async fn test_integrity_detection_mismatch_both_ways() {
        let diags = run(&policy(Some("restrictive")), vec![native_app(false)]).await;
        assert!(diags.mentions("Mobile application integrity detection setting has no effect"));

        let diags = run(&policy(None), vec![native_app(true)]).await;
        assert!(diags.mentions("Invalid mobile application integrity detection setting"));
    }

    #[tokio::test]
    async fn test_application_shape_errors() {
        let diags = run(&policy(None), vec![]).await;
        assert!(diags.mentions("Application not found"));

        let mut saml = native_app(false);
        saml.protocol = Some("SAML".into());
        assert!(run(&policy(None), vec![saml]).await.mentions("is not of type OIDC"));

        let mut web = native_app(false);
        web.app_type = Some("WEB_APP".into());
        assert!(run(&policy(None), vec![web]).await.mentions("not of type `Native`"));

        let mut bare = native_app(false);
        bare.mobile = Some(ApplicationMobile::default());
        assert!(run(&policy(None), vec![bare])
            .await
            .mentions("Missing application configuration"));
    }
}
