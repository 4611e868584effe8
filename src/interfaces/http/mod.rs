//! HTTP surface for the payment subsystem.
//!
//! Session issuance and role checks happen upstream; handlers trust the
//! `x-user-id` header installed by the auth layer.

pub mod payment;

use crate::application::orchestrator::EnrollmentService;
use crate::error::EnrollmentError;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, ResponseError, web};
use serde::Serialize;
use std::net::ToSocketAddrs;
use std::sync::Arc;

/// Envelope for error responses; success responses carry their own shapes.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ResponseError for EnrollmentError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::CourseNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyEnrolled(_) => StatusCode::CONFLICT,
            Self::Gateway(_) | Self::Timeout(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiMessage {
            success: false,
            message: self.to_string(),
        })
    }
}

/// Serves the payment routes until shutdown.
pub async fn run<A: ToSocketAddrs>(service: Arc<EnrollmentService>, addr: A) -> std::io::Result<()> {
    let data = web::Data::from(service);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(payment::configure)
    })
    .bind(addr)?
    .run()
    .await
}
