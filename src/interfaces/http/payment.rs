use crate::application::orchestrator::{
    EnrollmentService, EnrollmentStatus, FailedCourse, PaymentCallback,
};
use crate::domain::course::CourseId;
use crate::domain::user::UserId;
use crate::error::EnrollmentError;
use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(capture_payment)
        .service(verify_payment)
        .service(success_email);
}

fn authenticated_user(req: &HttpRequest) -> Result<UserId, EnrollmentError> {
    req.headers()
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| {
            EnrollmentError::Validation("missing or invalid x-user-id header".to_string())
        })
}

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub courses: Vec<CourseId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub success: bool,
    pub message: String,
    pub data: OrderData,
}

/// Sizes the requested courses and creates an external order.
#[post("/payment/order")]
async fn capture_payment(
    service: web::Data<EnrollmentService>,
    req: HttpRequest,
    body: web::Json<CaptureRequest>,
) -> Result<HttpResponse, EnrollmentError> {
    let user_id = authenticated_user(&req)?;
    let order = service.initiate_order(user_id, &body.courses).await?;

    Ok(HttpResponse::Ok().json(CaptureResponse {
        success: true,
        message: "Order created".to_string(),
        data: OrderData {
            order_id: order.order_ref,
            amount: order.amount,
            currency: order.currency,
        },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub courses: Vec<CourseId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub message: String,
    pub status: EnrollmentStatus,
    pub enrolled: Vec<CourseId>,
    pub already_enrolled: Vec<CourseId>,
    pub failed: Vec<FailedCourse>,
}

/// Verifies the payment callback and runs the enrollment fan-out.
///
/// Partial success is still a 200: the body enumerates per-course outcomes
/// so the client can retry only what failed.
#[post("/payment/confirm")]
async fn verify_payment(
    service: web::Data<EnrollmentService>,
    req: HttpRequest,
    body: web::Json<ConfirmRequest>,
) -> Result<HttpResponse, EnrollmentError> {
    let user_id = authenticated_user(&req)?;
    let callback = PaymentCallback {
        order_ref: body.order_id.clone(),
        payment_ref: body.payment_id.clone(),
        signature: body.signature.clone(),
        course_ids: body.courses.clone(),
    };
    let report = service.confirm_payment(user_id, &callback).await?;

    let status = report.status();
    let message = match status {
        EnrollmentStatus::Enrolled => "Payment verified".to_string(),
        EnrollmentStatus::PartiallyEnrolled => {
            "Payment verified; some enrollments failed".to_string()
        }
    };
    Ok(HttpResponse::Ok().json(ConfirmResponse {
        success: status == EnrollmentStatus::Enrolled,
        message,
        status,
        enrolled: report.enrolled,
        already_enrolled: report.already_enrolled,
        failed: report.failed,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEmailRequest {
    pub order_id: String,
    pub payment_id: String,
    /// Amount paid, in minor currency units.
    pub amount: u64,
}

/// Sends the payment receipt email to the authenticated user.
#[post("/payment/success-email")]
async fn success_email(
    service: web::Data<EnrollmentService>,
    req: HttpRequest,
    body: web::Json<SuccessEmailRequest>,
) -> Result<HttpResponse, EnrollmentError> {
    let user_id = authenticated_user(&req)?;
    service
        .send_payment_success_email(user_id, &body.order_id, &body.payment_id, body.amount)
        .await?;

    Ok(HttpResponse::Ok().json(super::ApiMessage {
        success: true,
        message: "Email sent".to_string(),
    }))
}
