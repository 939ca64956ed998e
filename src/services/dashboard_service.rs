use crate::database::DbPool;
use crate::entities::{
    CallbackStatus, EnquiryStatus, callback_request_entity as callbacks,
    enquiry_entity as enquiries, package_entity as packages, user_entity as users,
};
use crate::error::AppResult;
use crate::models::DashboardStats;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct DashboardService {
    pool: DbPool,
}

impl DashboardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_stats(&self) -> AppResult<DashboardStats> {
        let total_users = users::Entity::find().count(self.pool.as_ref()).await?;
        let total_packages = packages::Entity::find().count(self.pool.as_ref()).await?;
        let active_packages = packages::Entity::find()
            .filter(packages::Column::IsActive.eq(true))
            .count(self.pool.as_ref())
            .await?;

        let enquiry_rows: Vec<(EnquiryStatus, i64)> = enquiries::Entity::find()
            .select_only()
            .column(enquiries::Column::Status)
            .column_as(Expr::col(enquiries::Column::Id).count(), "count")
            .group_by(enquiries::Column::Status)
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;

        let callback_rows: Vec<(CallbackStatus, i64)> = callbacks::Entity::find()
            .select_only()
            .column(callbacks::Column::Status)
            .column_as(Expr::col(callbacks::Column::Id).count(), "count")
            .group_by(callbacks::Column::Status)
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;

        Ok(DashboardStats {
            total_users,
            total_packages,
            active_packages,
            enquiries_by_status: status_counts(enquiry_rows),
            callbacks_by_status: status_counts(callback_rows),
        })
    }
}

/// Keys by the wire name so the dashboard reads e.g. `"no-answer": 3`.
fn status_counts<S: ToString>(rows: Vec<(S, i64)>) -> BTreeMap<String, u64> {
    rows.into_iter()
        .map(|(status, count)| (status.to_string(), count.max(0) as u64))
        .collect()
}
