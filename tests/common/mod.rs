#![allow(dead_code)]

use async_trait::async_trait;
use coursepay::application::orchestrator::{EnrollmentService, PaymentCallback};
use coursepay::config::PaymentConfig;
use coursepay::domain::course::{Course, CourseId};
use coursepay::domain::order::Order;
use coursepay::domain::ports::{
    CourseStore, Notifier, PaymentGateway, ProgressStore, UserStore,
};
use coursepay::domain::progress::{CourseProgress, ProgressId};
use coursepay::domain::user::{User, UserId};
use coursepay::error::{EnrollmentError, Result};
use coursepay::infrastructure::gateway::HmacGateway;
use coursepay::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryProgressStore, InMemoryUserStore,
};
use coursepay::infrastructure::notifier::RecordingNotifier;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SECRET: &str = "test-secret";

/// Gateway double that counts order creations, for asserting that
/// short-circuit paths never reach the provider.
pub struct CountingGateway {
    inner: HmacGateway,
    orders_created: AtomicUsize,
}

impl CountingGateway {
    pub fn new(secret: &str) -> Self {
        Self {
            inner: HmacGateway::new(secret),
            orders_created: AtomicUsize::new(0),
        }
    }

    pub fn orders_created(&self) -> usize {
        self.orders_created.load(Ordering::SeqCst)
    }

    pub fn sign(&self, order_ref: &str, payment_ref: &str) -> String {
        self.inner.sign(order_ref, payment_ref)
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn create_order(&self, amount: u64, currency: &str, receipt: &str) -> Result<Order> {
        self.orders_created.fetch_add(1, Ordering::SeqCst);
        self.inner.create_order(amount, currency, receipt).await
    }

    fn verify_signature(&self, order_ref: &str, payment_ref: &str, signature: &str) -> bool {
        self.inner.verify_signature(order_ref, payment_ref, signature)
    }
}

/// Progress store whose next `create` calls fail, simulating a transient
/// outage that cuts a fan-out off between the course append and the
/// progress write.
pub struct FlakyProgressStore {
    inner: InMemoryProgressStore,
    failures_left: AtomicUsize,
}

impl FlakyProgressStore {
    pub fn new(inner: InMemoryProgressStore, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl ProgressStore for FlakyProgressStore {
    async fn create(&self, progress: CourseProgress) -> Result<()> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(EnrollmentError::Store(
                "progress store unavailable".to_string(),
            ));
        }
        self.inner.create(progress).await
    }

    async fn get(&self, id: ProgressId) -> Result<Option<CourseProgress>> {
        self.inner.get(id).await
    }

    async fn find_for(&self, user_id: UserId, course_id: CourseId) -> Result<Vec<CourseProgress>> {
        self.inner.find_for(user_id, course_id).await
    }
}

/// User store whose next `push_enrollment` calls fail, simulating a
/// transient outage after the progress record was already written.
pub struct FlakyUserStore {
    inner: InMemoryUserStore,
    failures_left: AtomicUsize,
}

impl FlakyUserStore {
    pub fn new(inner: InMemoryUserStore, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl UserStore for FlakyUserStore {
    async fn create(&self, user: User) -> Result<()> {
        self.inner.create(user).await
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        self.inner.get(id).await
    }

    async fn push_enrollment(
        &self,
        id: UserId,
        course_id: CourseId,
        progress_id: ProgressId,
    ) -> Result<User> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(EnrollmentError::Store("user store unavailable".to_string()));
        }
        self.inner.push_enrollment(id, course_id, progress_id).await
    }
}

/// Notifier that always fails, to prove email errors never poison the
/// enrollment path.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<()> {
        Err(EnrollmentError::Notification("relay down".to_string()))
    }
}

pub struct TestHarness {
    pub courses: Arc<InMemoryCourseStore>,
    pub users: Arc<InMemoryUserStore>,
    pub progress: Arc<InMemoryProgressStore>,
    pub gateway: Arc<CountingGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: Arc<EnrollmentService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(RecordingNotifier::new()))
    }

    pub fn failing_notifier() -> Self {
        Self::with_notifier_impl(Arc::new(FailingNotifier))
    }

    fn with_notifier(notifier: Arc<RecordingNotifier>) -> Self {
        let courses = Arc::new(InMemoryCourseStore::new());
        let users = Arc::new(InMemoryUserStore::new());
        let progress = Arc::new(InMemoryProgressStore::new());
        // The config is the single source of the secret; the gateway gets
        // its copy from there, as in the binary.
        let config = PaymentConfig::new(SECRET, "INR");
        let gateway = Arc::new(CountingGateway::new(&config.gateway_secret));

        let service = Arc::new(EnrollmentService::new(
            courses.clone(),
            users.clone(),
            progress.clone(),
            gateway.clone(),
            notifier.clone(),
            config,
        ));

        Self {
            courses,
            users,
            progress,
            gateway,
            notifier,
            service,
        }
    }

    fn with_notifier_impl(notifier: Arc<dyn Notifier>) -> Self {
        let harness = Self::with_notifier(Arc::new(RecordingNotifier::new()));
        let service = Arc::new(EnrollmentService::new(
            harness.courses.clone(),
            harness.users.clone(),
            harness.progress.clone(),
            harness.gateway.clone(),
            notifier,
            PaymentConfig::new(SECRET, "INR"),
        ));
        Self { service, ..harness }
    }

    /// Harness whose progress store fails its next `failures` creates. The
    /// inner in-memory stores stay visible for assertions.
    pub fn flaky_progress(failures: usize) -> Self {
        let harness = Self::new();
        let flaky = Arc::new(FlakyProgressStore::new((*harness.progress).clone(), failures));
        let service = Arc::new(EnrollmentService::new(
            harness.courses.clone(),
            harness.users.clone(),
            flaky,
            harness.gateway.clone(),
            harness.notifier.clone(),
            PaymentConfig::new(SECRET, "INR"),
        ));
        Self { service, ..harness }
    }

    /// Harness whose user store fails its next `failures` enrollment pushes.
    pub fn flaky_user(failures: usize) -> Self {
        let harness = Self::new();
        let flaky = Arc::new(FlakyUserStore::new((*harness.users).clone(), failures));
        let service = Arc::new(EnrollmentService::new(
            harness.courses.clone(),
            flaky,
            harness.progress.clone(),
            harness.gateway.clone(),
            harness.notifier.clone(),
            PaymentConfig::new(SECRET, "INR"),
        ));
        Self { service, ..harness }
    }

    pub async fn seed_course(&self, name: &str, price: Decimal) -> Course {
        let course = Course::new(name, price).unwrap();
        self.courses.create(course.clone()).await.unwrap();
        course
    }

    pub async fn seed_user(&self, email: &str, first_name: &str) -> User {
        let user = User::new(email, first_name);
        self.users.create(user.clone()).await.unwrap();
        user
    }

    /// A callback for `(order_1, pay_1)` carrying a valid signature.
    pub fn signed_callback(&self, course_ids: Vec<CourseId>) -> PaymentCallback {
        PaymentCallback {
            order_ref: "order_1".to_string(),
            payment_ref: "pay_1".to_string(),
            signature: self.gateway.sign("order_1", "pay_1"),
            course_ids,
        }
    }

    /// Waits for spawned notification tasks to land.
    pub async fn settle_notifications(&self, expected: usize) -> Vec<(String, String)> {
        for _ in 0..100 {
            let sent = self.notifier.sent().await;
            if sent.len() >= expected {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        self.notifier.sent().await
    }
}
