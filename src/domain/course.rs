use crate::domain::user::UserId;
use crate::error::{EnrollmentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CourseId = Uuid;

/// A purchasable course.
///
/// Only the fields the payment pipeline touches are modelled here; content
/// (sections, reviews, thumbnails) lives with the authoring subsystem.
/// `students_enrolled` holds each user id at most once; the stores enforce
/// this by making the membership check and the append a single write.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Price in major currency units (e.g. rupees).
    pub price: Decimal,
    pub students_enrolled: Vec<UserId>,
}

impl Course {
    /// Creates a course with no enrolled students.
    ///
    /// Rejects negative prices; free courses (price zero) are allowed.
    pub fn new(name: impl Into<String>, price: Decimal) -> Result<Self> {
        if price < Decimal::ZERO {
            return Err(EnrollmentError::Validation(
                "course price must be non-negative".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            students_enrolled: Vec::new(),
        })
    }

    pub fn is_enrolled(&self, user_id: UserId) -> bool {
        self.students_enrolled.contains(&user_id)
    }
}
