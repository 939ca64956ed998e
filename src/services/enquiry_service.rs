use crate::database::DbPool;
use crate::entities::{
    EnquiryStatus, enquiry_entity as enquiries, package_entity as packages, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::resolve_staff;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct EnquiryService {
    pool: DbPool,
}

impl EnquiryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_enquiry(&self, id: i64) -> AppResult<enquiries::Model> {
        enquiries::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Enquiry not found".to_string()))
    }

    /// Public submission; always starts as `pending`.
    pub async fn create_enquiry(
        &self,
        request: CreateEnquiryRequest,
    ) -> AppResult<EnquiryResponse> {
        let enquiry = request.validate()?;

        if let Some(package_id) = enquiry.package_id {
            let found = packages::Entity::find_by_id(package_id)
                .one(self.pool.as_ref())
                .await?;
            if found.is_none() {
                return Err(AppError::NotFound(format!("Package {package_id} not found")));
            }
        }

        let now = Utc::now();
        let model = enquiries::ActiveModel {
            name: Set(enquiry.name),
            email: Set(enquiry.email),
            phone: Set(enquiry.phone),
            no_of_guests: Set(enquiry.no_of_guests),
            check_in_date: Set(enquiry.check_in_date),
            check_out_date: Set(enquiry.check_out_date),
            package_id: Set(enquiry.package_id),
            message: Set(enquiry.message),
            status: Set(EnquiryStatus::Pending),
            remark: Set(None),
            assigned_to: Set(None),
            source: Set(enquiry.source),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!(
            "New enquiry {} via {:?} for package {:?}",
            model.id,
            model.source,
            model.package_id
        );
        Ok(EnquiryResponse::from(model))
    }

    pub async fn list_enquiries(
        &self,
        query: EnquiryQuery,
    ) -> AppResult<PaginatedResponse<EnquiryResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut select = enquiries::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(enquiries::Column::Status.eq(status));
        }
        if let Some(source) = query.source {
            select = select.filter(enquiries::Column::Source.eq(source));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let models = select
            .order_by_desc(enquiries::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;
        let items = models.into_iter().map(EnquiryResponse::from).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Enquiry plus its package and assignee, each looked up independently.
    pub async fn get_enquiry(&self, id: i64) -> AppResult<EnquiryDetail> {
        let enquiry = self.find_enquiry(id).await?;

        let package = match enquiry.package_id {
            Some(package_id) => packages::Entity::find_by_id(package_id)
                .one(self.pool.as_ref())
                .await?
                .map(PackageSummary::from),
            None => None,
        };
        let assignee = match enquiry.assigned_to {
            Some(user_id) => users::Entity::find_by_id(user_id)
                .one(self.pool.as_ref())
                .await?
                .map(StaffSummary::from),
            None => None,
        };

        Ok(EnquiryDetail {
            enquiry: EnquiryResponse::from(enquiry),
            package,
            assignee,
        })
    }

    /// Any status may follow any other; the admin decides.
    pub async fn update_enquiry(
        &self,
        actor_id: i64,
        id: i64,
        request: UpdateEnquiryRequest,
    ) -> AppResult<EnquiryResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let enquiry = self.find_enquiry(id).await?;
        let previous_status = enquiry.status;
        let mut model = enquiry.into_active_model();

        if let Some(status) = request.status {
            model.status = Set(status);
        }
        if let Some(remark) = &request.remark {
            model.remark = Set(optional_text("Remark", Some(remark), 5_000)?);
        }
        if let Some(assignee_id) = request.assigned_to {
            resolve_staff(self.pool.as_ref(), assignee_id).await?;
            model.assigned_to = Set(Some(assignee_id));
        } else if request.unassign {
            model.assigned_to = Set(None);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(self.pool.as_ref()).await?;

        if updated.status != previous_status {
            log::info!(
                "Enquiry {id} status {previous_status} -> {} by {actor_id}",
                updated.status
            );
        }
        Ok(EnquiryResponse::from(updated))
    }
}
