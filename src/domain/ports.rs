use crate::domain::course::{Course, CourseId};
use crate::domain::order::Order;
use crate::domain::progress::{CourseProgress, ProgressId};
use crate::domain::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of the conditional enrollment append on a course document.
///
/// The membership check and the append are one atomic write, so this enum is
/// also the idempotency guard: a concurrent or retried confirm observes
/// `AlreadyEnrolled` instead of producing a duplicate.
#[derive(Debug, PartialEq, Clone)]
pub enum EnrollmentWrite {
    /// The user was appended; carries the updated course.
    Enrolled(Course),
    /// The user was already present; nothing was written.
    AlreadyEnrolled(Course),
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn create(&self, course: Course) -> Result<()>;
    async fn get(&self, id: CourseId) -> Result<Option<Course>>;
    /// Appends `user_id` to the course's enrolled set iff not already
    /// present. Returns `Ok(None)` if the course does not exist.
    async fn enroll_student(
        &self,
        id: CourseId,
        user_id: UserId,
    ) -> Result<Option<EnrollmentWrite>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> Result<()>;
    async fn get(&self, id: UserId) -> Result<Option<User>>;
    /// Appends the (course, progress) pair to the user's parallel lists in a
    /// single write. Returns the updated user.
    async fn push_enrollment(
        &self,
        id: UserId,
        course_id: CourseId,
        progress_id: ProgressId,
    ) -> Result<User>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn create(&self, progress: CourseProgress) -> Result<()>;
    async fn get(&self, id: ProgressId) -> Result<Option<CourseProgress>>;
    async fn find_for(&self, user_id: UserId, course_id: CourseId)
    -> Result<Vec<CourseProgress>>;
}

/// The external payment provider, reduced to the two calls this subsystem
/// needs: create an order and verify a callback signature.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, amount: u64, currency: &str, receipt: &str) -> Result<Order>;
    /// Constant-time check of the callback signature for
    /// `(order_ref, payment_ref)`.
    fn verify_signature(&self, order_ref: &str, payment_ref: &str, signature: &str) -> bool;
}

/// Best-effort outbound email. Callers on the transactional path must not
/// let a send failure propagate.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

pub type CourseStoreRef = Arc<dyn CourseStore>;
pub type UserStoreRef = Arc<dyn UserStore>;
pub type ProgressStoreRef = Arc<dyn ProgressStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type NotifierRef = Arc<dyn Notifier>;
