use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{CourseStore, EnrollmentWrite, ProgressStore, UserStore};
use crate::domain::progress::{CourseProgress, ProgressId};
use crate::domain::user::{User, UserId};
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for course documents.
pub const CF_COURSES: &str = "courses";
/// Column Family for user documents.
pub const CF_USERS: &str = "users";
/// Column Family for progress documents.
pub const CF_PROGRESS: &str = "progress";

/// A persistent document store backed by RocksDB.
///
/// Entities are stored as JSON documents in separate Column Families, keyed
/// by their UUID bytes. RocksDB serialises individual puts but offers no
/// read-modify-write primitive here, so the conditional appends
/// (`enroll_student`, `push_enrollment`) take a store-wide write mutex to
/// keep the check and the put in one critical section.
///
/// `Clone` shares the underlying `Arc<DB>` and the write mutex.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the three column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_COURSES, Options::default()),
            ColumnFamilyDescriptor::new(CF_USERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_PROGRESS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)
            .map_err(|e| EnrollmentError::Store(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn put_doc<T: serde::Serialize>(&self, cf_name: &str, key: Uuid, doc: &T) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| EnrollmentError::Store(format!("{cf_name} column family missing")))?;
        let value = serde_json::to_vec(doc)
            .map_err(|e| EnrollmentError::Store(format!("serialization error: {e}")))?;
        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| EnrollmentError::Store(e.to_string()))
    }

    fn get_doc<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: Uuid,
    ) -> Result<Option<T>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| EnrollmentError::Store(format!("{cf_name} column family missing")))?;
        let bytes = self
            .db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| EnrollmentError::Store(e.to_string()))?;
        match bytes {
            Some(bytes) => {
                let doc = serde_json::from_slice(&bytes)
                    .map_err(|e| EnrollmentError::Store(format!("deserialization error: {e}")))?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CourseStore for RocksDbStore {
    async fn create(&self, course: Course) -> Result<()> {
        self.put_doc(CF_COURSES, course.id, &course)
    }

    async fn get(&self, id: CourseId) -> Result<Option<Course>> {
        self.get_doc(CF_COURSES, id)
    }

    async fn enroll_student(
        &self,
        id: CourseId,
        user_id: UserId,
    ) -> Result<Option<EnrollmentWrite>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut course) = self.get_doc::<Course>(CF_COURSES, id)? else {
            return Ok(None);
        };
        if course.is_enrolled(user_id) {
            return Ok(Some(EnrollmentWrite::AlreadyEnrolled(course)));
        }
        course.students_enrolled.push(user_id);
        self.put_doc(CF_COURSES, id, &course)?;
        Ok(Some(EnrollmentWrite::Enrolled(course)))
    }
}

#[async_trait]
impl UserStore for RocksDbStore {
    async fn create(&self, user: User) -> Result<()> {
        self.put_doc(CF_USERS, user.id, &user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        self.get_doc(CF_USERS, id)
    }

    async fn push_enrollment(
        &self,
        id: UserId,
        course_id: CourseId,
        progress_id: ProgressId,
    ) -> Result<User> {
        let _guard = self.write_lock.lock().await;
        let mut user = self
            .get_doc::<User>(CF_USERS, id)?
            .ok_or(EnrollmentError::UserNotFound(id))?;
        user.courses.push(course_id);
        user.course_progress.push(progress_id);
        self.put_doc(CF_USERS, id, &user)?;
        Ok(user)
    }
}

#[async_trait]
impl ProgressStore for RocksDbStore {
    async fn create(&self, progress: CourseProgress) -> Result<()> {
        self.put_doc(CF_PROGRESS, progress.id, &progress)
    }

    async fn get(&self, id: ProgressId) -> Result<Option<CourseProgress>> {
        self.get_doc(CF_PROGRESS, id)
    }

    async fn find_for(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<CourseProgress>> {
        let cf = self
            .db
            .cf_handle(CF_PROGRESS)
            .ok_or_else(|| EnrollmentError::Store("progress column family missing".to_string()))?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| EnrollmentError::Store(e.to_string()))?;
            let progress: CourseProgress = serde_json::from_slice(&value)
                .map_err(|e| EnrollmentError::Store(format!("deserialization error: {e}")))?;
            if progress.user_id == user_id && progress.course_id == course_id {
                records.push(progress);
            }
        }
        Ok(records)
    }
}
