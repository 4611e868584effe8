use crate::domain::course::CourseId;
use crate::domain::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProgressId = Uuid;

/// Per-(user, course) tracker of completed content units.
///
/// Created exactly once when the user is enrolled, with an empty completed
/// set; the content-consumption subsystem appends to `completed_videos`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CourseProgress {
    pub id: ProgressId,
    pub course_id: CourseId,
    pub user_id: UserId,
    pub completed_videos: Vec<Uuid>,
}

impl CourseProgress {
    pub fn new(course_id: CourseId, user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id,
            user_id,
            completed_videos: Vec::new(),
        }
    }
}
