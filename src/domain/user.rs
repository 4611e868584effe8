use crate::domain::course::CourseId;
use crate::domain::progress::ProgressId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// A platform account as seen by the payment pipeline.
///
/// `courses` and `course_progress` are parallel lists: every enrolled course
/// has exactly one progress record for this user. Both entries are appended
/// in the same store write to keep them in sync.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub courses: Vec<CourseId>,
    pub course_progress: Vec<ProgressId>,
}

impl User {
    pub fn new(email: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            first_name: first_name.into(),
            courses: Vec::new(),
            course_progress: Vec::new(),
        }
    }
}
