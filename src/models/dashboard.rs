use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_packages: u64,
    pub active_packages: u64,
    pub enquiries_by_status: BTreeMap<String, u64>,
    pub callbacks_by_status: BTreeMap<String, u64>,
}
