use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{CourseStore, EnrollmentWrite, ProgressStore, UserStore};
use crate::domain::progress::{CourseProgress, ProgressId};
use crate::domain::user::{User, UserId};
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory course store.
///
/// Uses `Arc<RwLock<HashMap>>` for shared concurrent access. The conditional
/// enrollment append runs under the write lock, so the membership check and
/// the append cannot interleave with another writer.
#[derive(Default, Clone)]
pub struct InMemoryCourseStore {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a course. Used to exercise the course-vanished-mid-checkout
    /// path; catalogue management proper lives elsewhere.
    pub async fn remove(&self, id: CourseId) -> Option<Course> {
        self.courses.write().await.remove(&id)
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn create(&self, course: Course) -> Result<()> {
        self.courses.write().await.insert(course.id, course);
        Ok(())
    }

    async fn get(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn enroll_student(
        &self,
        id: CourseId,
        user_id: UserId,
    ) -> Result<Option<EnrollmentWrite>> {
        let mut courses = self.courses.write().await;
        let Some(course) = courses.get_mut(&id) else {
            return Ok(None);
        };
        if course.is_enrolled(user_id) {
            return Ok(Some(EnrollmentWrite::AlreadyEnrolled(course.clone())));
        }
        course.students_enrolled.push(user_id);
        Ok(Some(EnrollmentWrite::Enrolled(course.clone())))
    }
}

/// A thread-safe in-memory user store.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: User) -> Result<()> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn push_enrollment(
        &self,
        id: UserId,
        course_id: CourseId,
        progress_id: ProgressId,
    ) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or(EnrollmentError::UserNotFound(id))?;
        user.courses.push(course_id);
        user.course_progress.push(progress_id);
        Ok(user.clone())
    }
}

/// A thread-safe in-memory progress store.
#[derive(Default, Clone)]
pub struct InMemoryProgressStore {
    records: Arc<RwLock<HashMap<ProgressId, CourseProgress>>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn create(&self, progress: CourseProgress) -> Result<()> {
        self.records.write().await.insert(progress.id, progress);
        Ok(())
    }

    async fn get(&self, id: ProgressId) -> Result<Option<CourseProgress>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_for(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<CourseProgress>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|p| p.user_id == user_id && p.course_id == course_id)
            .cloned()
            .collect())
    }
}
