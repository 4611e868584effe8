use crate::domain::course::CourseId;
use crate::domain::user::UserId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnrollmentError>;

/// Error taxonomy for the purchase-to-enrollment pipeline.
///
/// Validation, not-found, conflict and signature errors are terminal and
/// produced before any mutation. Gateway and timeout errors are safe for the
/// client to retry because order creation leaves no local state. A partial
/// fan-out is not an error variant; it is reported per course through
/// [`crate::application::orchestrator::EnrollmentReport`].
#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("already enrolled in course {0}")]
    AlreadyEnrolled(CourseId),
    #[error("payment gateway error: {0}")]
    Gateway(String),
    #[error("invalid payment signature")]
    InvalidSignature,
    #[error("{0} timed out")]
    Timeout(String),
    #[error("storage error: {0}")]
    Store(String),
    #[error("notification error: {0}")]
    Notification(String),
}
