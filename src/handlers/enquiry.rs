use crate::error::AppResult;
use crate::models::*;
use crate::services::EnquiryService;
use actix_web::{HttpResponse, web};

#[utoipa::path(
    post,
    path = "/api/v1/enquiries",
    tag = "enquiries",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Enquiry received", body = EnquiryResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Referenced package does not exist"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn create_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    request: web::Json<CreateEnquiryRequest>,
) -> AppResult<HttpResponse> {
    let enquiry = enquiry_service.create_enquiry(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        enquiry,
        "Thank you! Our team will get in touch shortly.",
    )))
}

pub fn enquiry_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/enquiries", web::post().to(create_enquiry));
}
