use crate::error::AppResult;
use crate::middlewares::{TrustProxy, client_ip};
use crate::models::*;
use crate::services::CallbackService;
use actix_web::http::header::USER_AGENT;
use actix_web::{HttpRequest, HttpResponse, web};

fn client_info(req: &HttpRequest) -> ClientInfo {
    let trust_proxy = req.app_data::<TrustProxy>().is_some_and(|t| t.0);
    ClientInfo {
        ip_address: client_ip(req, trust_proxy),
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.chars().take(512).collect()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/callbacks",
    tag = "callbacks",
    request_body = CreateCallbackRequest,
    responses(
        (status = 201, description = "Callback request received", body = CallbackResponse),
        (status = 400, description = "Invalid input"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn create_callback(
    callback_service: web::Data<CallbackService>,
    req: HttpRequest,
    request: web::Json<CreateCallbackRequest>,
) -> AppResult<HttpResponse> {
    let callback = callback_service
        .create_callback(request.into_inner(), client_info(&req))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        callback,
        "We will call you back soon.",
    )))
}

pub fn callback_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/callbacks", web::post().to(create_callback));
}
