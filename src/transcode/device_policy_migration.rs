//! FIDO2 migration `expand` / `to_state`.

use super::*;
use crate::model::DevicePolicyMigrationConfig;
use crate::wire::{DevicePolicyMigrateData, DevicePolicyMigration};
use uuid::Uuid;

pub fn expand(config: &DevicePolicyMigrationConfig) -> Result<DevicePolicyMigration> {
    let root = AttributePath::root("migrate_data");
    let migrate_data = config
        .migrate_data
        .get()
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, entry)| -> Result<DevicePolicyMigrateData> {
            let path = root.index(i).attr("device_authentication_policy_id");
            Ok(DevicePolicyMigrateData {
                device_authentication_policy_id: required(&entry.device_authentication_policy_id, &path)?
                    .clone(),
                fido2_policy_id: optional(&entry.fido2_policy_id),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DevicePolicyMigration { migrate_data })
}

/// The planned configuration, with a random id when none is known yet.
pub fn to_state(plan: &DevicePolicyMigrationConfig) -> DevicePolicyMigrationConfig {
    let mut state = plan.clone();
    if !state.id.is_present() {
        state.id = Value::Present(Uuid::new_v4().to_string());
    }
    state
}
