use super::rules::*;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::model::DevicePolicyMigrationConfig;

pub fn validate(config: &DevicePolicyMigrationConfig) -> Diagnostics {
    let mut diags = Diagnostics::new();

    let environment_path = AttributePath::root("environment_id");
    required_attribute(&mut diags, &environment_path, &config.environment_id);
    resource_id(&mut diags, &environment_path, &config.environment_id);

    let migrate_path = AttributePath::root("migrate_data");
    required_attribute(&mut diags, &migrate_path, &config.migrate_data);

    let mut seen = Vec::new();
    for (i, entry) in config.migrate_data.get().into_iter().flatten().enumerate() {
        let path = migrate_path.index(i);
        let policy_path = path.attr("device_authentication_policy_id");
        required_attribute(&mut diags, &policy_path, &entry.device_authentication_policy_id);
        resource_id(&mut diags, &policy_path, &entry.device_authentication_policy_id);
        resource_id(&mut diags, &path.attr("fido2_policy_id"), &entry.fido2_policy_id);

        if seen.contains(&entry) {
            diags.add_error_at(
                &path,
                "Duplicate Set Element",
                format!("This attribute contains duplicate values of: {}", path),
            );
        } else {
            seen.push(entry);
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MigrateDataConfig;
    use crate::value::Value;

    const POLICY: &str = "5a1b2c3d-0000-4000-8000-00000000beef";
    const FIDO2: &str = "f1d02000-0000-4000-8000-000000000002";

    fn entry(policy: &str, fido2: Option<&str>) -> MigrateDataConfig {
        MigrateDataConfig {
            device_authentication_policy_id: Value::Present(policy.into()),
            fido2_policy_id: fido2.map(str::to_string).into(),
        }
    }

    fn config(entries: Vec<MigrateDataConfig>) -> DevicePolicyMigrationConfig {
        DevicePolicyMigrationConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            migrate_data: Value::Present(entries),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_migration_passes() {
        let diags = validate(&config(vec![entry(POLICY, Some(FIDO2))]));
        assert!(diags.is_empty(), "{diags}");
    }

    #[test]
    fn test_migrate_data_is_required() {
        let mut missing = config(vec![]);
        missing.migrate_data = Value::Absent;
        assert!(validate(&missing).mentions("for the migrate_data attribute"));

        let mut unknown = config(vec![]);
        unknown.migrate_data = Value::Unknown;
        assert!(!validate(&unknown).has_error());
    }

    #[test]
    fn test_entry_ids_must_be_resource_ids() {
        let diags = validate(&config(vec![entry("not-an-id", Some("also-bad"))]));
        assert_eq!(diags.errors().count(), 2);
        assert!(diags.mentions("must be a valid PingOne resource ID"));

        let diags = validate(&config(vec![MigrateDataConfig::default()]));
        assert!(diags.mentions("device_authentication_policy_id"));
    }

    #[test]
    fn test_duplicate_entries_are_rejected() {
        let diags = validate(&config(vec![entry(POLICY, None), entry(POLICY, None)]));
        assert!(diags.mentions("Duplicate Set Element"));
        assert!(!validate(&config(vec![entry(POLICY, None), entry(POLICY, Some(FIDO2))])).has_error());
    }
}
