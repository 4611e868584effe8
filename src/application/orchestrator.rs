use crate::application::mail;
use crate::config::PaymentConfig;
use crate::domain::course::{Course, CourseId};
use crate::domain::order::{self, Order};
use crate::domain::ports::{
    CourseStoreRef, EnrollmentWrite, NotifierRef, PaymentGatewayRef, ProgressStoreRef,
    UserStoreRef,
};
use crate::domain::progress::CourseProgress;
use crate::domain::user::{User, UserId};
use crate::error::{EnrollmentError, Result};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Callback data returned by the client after completing payment at the
/// provider's checkout.
#[derive(Debug, Clone)]
pub struct PaymentCallback {
    pub order_ref: String,
    pub payment_ref: String,
    pub signature: String,
    pub course_ids: Vec<CourseId>,
}

impl PaymentCallback {
    fn validate(&self) -> Result<()> {
        if self.order_ref.is_empty()
            || self.payment_ref.is_empty()
            || self.signature.is_empty()
            || self.course_ids.is_empty()
        {
            return Err(EnrollmentError::Validation(
                "payment details missing".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FailedCourse {
    pub course_id: CourseId,
    pub reason: String,
}

/// Terminal status of a confirmed checkout.
#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Enrolled,
    PartiallyEnrolled,
}

/// Per-course outcome collector for one fan-out call.
///
/// Partial success is first-class: a student who paid for three courses and
/// got two is told exactly which one failed and why, and can retry just that
/// one (the guard skips the rest).
#[derive(Debug, Serialize, PartialEq, Clone, Default)]
pub struct EnrollmentReport {
    /// Courses enrolled by this call, in request order.
    pub enrolled: Vec<CourseId>,
    /// Courses the user already held; skipped, not an error.
    pub already_enrolled: Vec<CourseId>,
    /// Courses that failed after the signature passed.
    pub failed: Vec<FailedCourse>,
}

impl EnrollmentReport {
    pub fn status(&self) -> EnrollmentStatus {
        if self.failed.is_empty() {
            EnrollmentStatus::Enrolled
        } else {
            EnrollmentStatus::PartiallyEnrolled
        }
    }
}

enum CourseOutcome {
    Enrolled,
    AlreadySatisfied,
    Failed(String),
}

/// The purchase-to-enrollment orchestrator.
///
/// One checkout attempt moves through `CREATED` (order exists at the
/// gateway, no local trace), `PENDING_VERIFICATION` (callback received),
/// then either `REJECTED` (signature mismatch, nothing written) or
/// `ENROLLING` (the fan-out, alive only for the duration of the call)
/// ending in `ENROLLED` or `PARTIALLY_ENROLLED`. Nothing between those
/// terminal states is persisted; retries are reconciled by the per-course
/// guard rather than a transaction.
pub struct EnrollmentService {
    courses: CourseStoreRef,
    users: UserStoreRef,
    progress: ProgressStoreRef,
    gateway: PaymentGatewayRef,
    notifier: NotifierRef,
    config: PaymentConfig,
}

impl EnrollmentService {
    pub fn new(
        courses: CourseStoreRef,
        users: UserStoreRef,
        progress: ProgressStoreRef,
        gateway: PaymentGatewayRef,
        notifier: NotifierRef,
        config: PaymentConfig,
    ) -> Self {
        Self {
            courses,
            users,
            progress,
            gateway,
            notifier,
            config,
        }
    }

    /// Sizes and creates an external order for `course_ids`.
    ///
    /// Read-only against the stores: every course is resolved and checked
    /// for an existing enrollment before the gateway is called, so an
    /// abandoned or failed checkout leaves no residue. A conflict on any
    /// course aborts the whole order.
    pub async fn initiate_order(&self, user_id: UserId, course_ids: &[CourseId]) -> Result<Order> {
        if course_ids.is_empty() {
            return Err(EnrollmentError::Validation(
                "no course ids provided".to_string(),
            ));
        }

        let mut prices = Vec::with_capacity(course_ids.len());
        for &course_id in course_ids {
            let course = self
                .bounded("course lookup", self.courses.get(course_id))
                .await?
                .ok_or(EnrollmentError::CourseNotFound(course_id))?;
            if course.is_enrolled(user_id) {
                return Err(EnrollmentError::AlreadyEnrolled(course_id));
            }
            prices.push(course.price);
        }

        let amount = order::total_minor_units(prices)?;
        let receipt = new_receipt();
        let order = self
            .bounded(
                "order creation",
                self.gateway.create_order(amount, &self.config.currency, &receipt),
            )
            .await?;

        tracing::info!(order_ref = %order.order_ref, amount, %user_id, "order created");
        Ok(order)
    }

    /// Verifies the payment callback and enrolls the user in each course.
    ///
    /// The signature gate runs before any mutation, so a mismatch is safe to
    /// retry. After the gate, courses are processed sequentially in request
    /// order; a failure aborts only that course. Already-held courses are
    /// reconciled and reported as already satisfied, which makes the whole
    /// call idempotent per course.
    pub async fn confirm_payment(
        &self,
        user_id: UserId,
        callback: &PaymentCallback,
    ) -> Result<EnrollmentReport> {
        callback.validate()?;

        if !self.gateway.verify_signature(
            &callback.order_ref,
            &callback.payment_ref,
            &callback.signature,
        ) {
            tracing::warn!(order_ref = %callback.order_ref, "payment signature rejected");
            return Err(EnrollmentError::InvalidSignature);
        }

        let user = self
            .bounded("user lookup", self.users.get(user_id))
            .await?
            .ok_or(EnrollmentError::UserNotFound(user_id))?;

        let mut report = EnrollmentReport::default();
        for &course_id in &callback.course_ids {
            match self.enroll_one(course_id, &user).await {
                CourseOutcome::Enrolled => report.enrolled.push(course_id),
                CourseOutcome::AlreadySatisfied => report.already_enrolled.push(course_id),
                CourseOutcome::Failed(reason) => {
                    tracing::warn!(%course_id, %reason, "course enrollment failed");
                    report.failed.push(FailedCourse { course_id, reason });
                }
            }
        }

        tracing::info!(
            order_ref = %callback.order_ref,
            enrolled = report.enrolled.len(),
            skipped = report.already_enrolled.len(),
            failed = report.failed.len(),
            "payment confirmed"
        );
        Ok(report)
    }

    /// Enrolls `user` into one course: course append, then progress record,
    /// then user back-references.
    ///
    /// The order is load-bearing. A user record pointing at a missing
    /// progress record cannot be repaired from the data, whereas a course
    /// listing a student with no user-side back-reference can be re-derived,
    /// so the user write goes last.
    async fn enroll_one(&self, course_id: CourseId, user: &User) -> CourseOutcome {
        let course = match self
            .bounded(
                "enrollment write",
                self.courses.enroll_student(course_id, user.id),
            )
            .await
        {
            Ok(Some(EnrollmentWrite::Enrolled(course))) => course,
            Ok(Some(EnrollmentWrite::AlreadyEnrolled(course))) => {
                return self.reconcile_existing(course, user).await;
            }
            Ok(None) => return CourseOutcome::Failed(format!("course not found: {course_id}")),
            Err(e) => return CourseOutcome::Failed(e.to_string()),
        };

        let progress = CourseProgress::new(course_id, user.id);
        if let Err(e) = self
            .bounded("progress creation", self.progress.create(progress.clone()))
            .await
        {
            return CourseOutcome::Failed(e.to_string());
        }

        match self
            .bounded(
                "user update",
                self.users.push_enrollment(user.id, course_id, progress.id),
            )
            .await
        {
            Ok(updated) => {
                self.dispatch_enrollment_email(&updated, &course);
                CourseOutcome::Enrolled
            }
            Err(e) => CourseOutcome::Failed(e.to_string()),
        }
    }

    /// Completes a previously started enrollment before reporting it as
    /// already satisfied.
    ///
    /// "User already in the enrolled set" only proves that step 1 of an
    /// earlier attempt landed; a store error or timeout may have cut that
    /// attempt off before the progress record or the user back-references
    /// were written. A retry must finish those steps, or a paid user is
    /// stranded without a progress record. Fully enrolled courses take the
    /// read-only path here and nothing is written.
    async fn reconcile_existing(&self, course: Course, user: &User) -> CourseOutcome {
        let existing = match self
            .bounded("progress lookup", self.progress.find_for(user.id, course.id))
            .await
        {
            Ok(records) => records,
            Err(e) => return CourseOutcome::Failed(e.to_string()),
        };

        let progress_id = match existing.first() {
            Some(progress) => progress.id,
            None => {
                let progress = CourseProgress::new(course.id, user.id);
                if let Err(e) = self
                    .bounded("progress creation", self.progress.create(progress.clone()))
                    .await
                {
                    return CourseOutcome::Failed(e.to_string());
                }
                progress.id
            }
        };

        // The caller's user snapshot predates this fan-out call; re-fetch
        // before deciding whether the back-references exist.
        let current = match self.bounded("user lookup", self.users.get(user.id)).await {
            Ok(Some(current)) => current,
            Ok(None) => return CourseOutcome::Failed(format!("user not found: {}", user.id)),
            Err(e) => return CourseOutcome::Failed(e.to_string()),
        };
        if current.courses.contains(&course.id) {
            return CourseOutcome::AlreadySatisfied;
        }

        match self
            .bounded(
                "user update",
                self.users.push_enrollment(user.id, course.id, progress_id),
            )
            .await
        {
            Ok(updated) => {
                self.dispatch_enrollment_email(&updated, &course);
                CourseOutcome::AlreadySatisfied
            }
            Err(e) => CourseOutcome::Failed(e.to_string()),
        }
    }

    /// Sends the payment receipt email. Unlike the fan-out notifications
    /// this is awaited: the caller asked for the email, so its failure is
    /// reported.
    pub async fn send_payment_success_email(
        &self,
        user_id: UserId,
        order_ref: &str,
        payment_ref: &str,
        amount_minor: u64,
    ) -> Result<()> {
        let user = self
            .bounded("user lookup", self.users.get(user_id))
            .await?
            .ok_or(EnrollmentError::UserNotFound(user_id))?;

        let amount = Decimal::from(amount_minor) / Decimal::ONE_HUNDRED;
        let (subject, body) = mail::payment_success(&user.first_name, amount, order_ref, payment_ref);
        self.notifier.send(&user.email, &subject, &body).await
    }

    /// Fire-and-forget enrollment email; never awaited by the fan-out, and
    /// failures are logged and swallowed.
    fn dispatch_enrollment_email(&self, user: &User, course: &Course) {
        let notifier = Arc::clone(&self.notifier);
        let to = user.email.clone();
        let (subject, body) = mail::course_enrollment(&course.name, &user.first_name);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&to, &subject, &body).await {
                tracing::warn!(error = %e, %to, "enrollment email failed");
            }
        });
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(EnrollmentError::Timeout(what.to_string())),
        }
    }
}

fn new_receipt() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let nonce: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("receipt_{millis}_{nonce}")
}
