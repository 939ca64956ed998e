use crate::database::DbPool;
use crate::entities::{CallbackStatus, callback_request_entity as callbacks};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::resolve_staff;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct CallbackService {
    pool: DbPool,
}

impl CallbackService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Public submission. Starts `pending` with no `called_at`.
    pub async fn create_callback(
        &self,
        request: CreateCallbackRequest,
        client: ClientInfo,
    ) -> AppResult<CallbackResponse> {
        let callback = request.validate()?;

        let now = Utc::now();
        let model = callbacks::ActiveModel {
            name: Set(callback.name),
            phone: Set(callback.phone),
            preferred_time: Set(callback.preferred_time),
            message: Set(callback.message),
            destination: Set(callback.destination),
            status: Set(CallbackStatus::Pending),
            called_at: Set(None),
            remark: Set(None),
            assigned_to: Set(None),
            source: Set(callback.source),
            ip_address: Set(client.ip_address),
            user_agent: Set(client.user_agent),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("New callback request {} via {:?}", model.id, model.source);
        Ok(CallbackResponse::from(model))
    }

    pub async fn list_callbacks(
        &self,
        query: CallbackQuery,
    ) -> AppResult<PaginatedResponse<CallbackResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut select = callbacks::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(callbacks::Column::Status.eq(status));
        }
        if let Some(source) = query.source {
            select = select.filter(callbacks::Column::Source.eq(source));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let models = select
            .order_by_desc(callbacks::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;
        let items = models.into_iter().map(CallbackResponse::from).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn update_callback(
        &self,
        actor_id: i64,
        id: i64,
        request: UpdateCallbackRequest,
    ) -> AppResult<CallbackResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        // Row lock so concurrent status changes stamp `called_at` once
        let txn = self.pool.begin().await?;
        let callback = callbacks::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Callback request not found".to_string()))?;

        let now = Utc::now();
        let previous_status = callback.status;
        let previous_called_at = callback.called_at;
        let mut model = callback.into_active_model();

        if let Some(status) = request.status {
            model.status = Set(status);
            model.called_at = Set(next_called_at(
                previous_status,
                status,
                previous_called_at,
                now,
            ));
        }
        if let Some(remark) = &request.remark {
            model.remark = Set(optional_text("Remark", Some(remark), 5_000)?);
        }
        if let Some(assignee_id) = request.assigned_to {
            resolve_staff(&txn, assignee_id).await?;
            model.assigned_to = Set(Some(assignee_id));
        } else if request.unassign {
            model.assigned_to = Set(None);
        }
        model.updated_at = Set(now);

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        if updated.status != previous_status {
            log::info!(
                "Callback {id} status {previous_status} -> {} by {actor_id}",
                updated.status
            );
        }
        Ok(CallbackResponse::from(updated))
    }
}
