use chrono::NaiveDate;
use dsm_db::models::{
    CandidateStatus, CourseChanges, CourseFilter, ExamChanges, ExamFilter, ExamStatus,
    LessonType, LicenseCategory, NewCourse, NewExam, NewExamResult,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{
        require_changes, trim, trim_optional, validate_amount, validate_optional_text,
        validate_positive, validate_range, validate_text, validate_time,
    },
};

const TITLE_MAX: usize = 150;
const DESCRIPTION_MAX: usize = 2000;
const LOCATION_MAX: usize = 200;
const EXAMINER_MAX: usize = 100;
const NOTES_MAX: usize = 1000;
const MAX_CANDIDATES: i64 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub license_category: Option<LicenseCategory>,
    pub lesson_type: Option<LessonType>,
}

impl CourseQuery {
    pub const fn filter(&self) -> CourseFilter {
        CourseFilter {
            license_category: self.license_category,
            lesson_type: self.lesson_type,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExamQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub course_id: Option<Uuid>,
    pub exam_type: Option<LessonType>,
    pub status: Option<ExamStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ExamQuery {
    pub fn filter(&self) -> Result<ExamFilter, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::Validation("from must not be after to".to_string()));
            }
        }

        Ok(ExamFilter {
            course_id: self.course_id,
            exam_type: self.exam_type,
            status: self.status,
            from: self.from,
            to: self.to,
        })
    }
}

fn validate_price(price: Option<f64>) -> Result<(), ApiError> {
    price.map_or(Ok(()), |price| validate_amount("price", price))
}

fn validate_max_candidates(max: Option<i32>) -> Result<(), ApiError> {
    max.map_or(Ok(()), |max| {
        validate_range("max_candidates", i64::from(max), 1, MAX_CANDIDATES)
    })
}

impl ValidatePayload for NewCourse {
    fn normalize(&mut self) {
        trim(&mut self.title);
        trim_optional(&mut self.description);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_text("title", &self.title, TITLE_MAX)?;
        validate_optional_text("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        validate_positive("duration_hours", self.duration_hours)?;
        validate_price(self.price)
    }
}

impl ValidatePayload for CourseChanges {
    fn normalize(&mut self) {
        if let Some(title) = &mut self.title {
            trim(title);
        }
        trim_optional(&mut self.description);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.title.is_some()
                || self.description.is_some()
                || self.license_category.is_some()
                || self.lesson_type.is_some()
                || self.duration_hours.is_some()
                || self.price.is_some(),
        )?;

        if let Some(title) = &self.title {
            validate_text("title", title, TITLE_MAX)?;
        }
        validate_optional_text("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        if let Some(hours) = self.duration_hours {
            validate_positive("duration_hours", hours)?;
        }
        validate_price(self.price)
    }
}

impl ValidatePayload for NewExam {
    fn normalize(&mut self) {
        trim(&mut self.time);
        trim(&mut self.location);
        trim_optional(&mut self.examiner);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_time("time", &self.time)?;
        validate_text("location", &self.location, LOCATION_MAX)?;
        validate_optional_text("examiner", self.examiner.as_deref(), EXAMINER_MAX)?;
        validate_max_candidates(self.max_candidates)
    }
}

impl ValidatePayload for ExamChanges {
    fn normalize(&mut self) {
        if let Some(time) = &mut self.time {
            trim(time);
        }
        if let Some(location) = &mut self.location {
            trim(location);
        }
        trim_optional(&mut self.examiner);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.course_id.is_some()
                || self.exam_type.is_some()
                || self.date.is_some()
                || self.time.is_some()
                || self.location.is_some()
                || self.examiner.is_some()
                || self.max_candidates.is_some()
                || self.status.is_some(),
        )?;

        if let Some(time) = &self.time {
            validate_time("time", time)?;
        }
        if let Some(location) = &self.location {
            validate_text("location", location, LOCATION_MAX)?;
        }
        validate_optional_text("examiner", self.examiner.as_deref(), EXAMINER_MAX)?;
        validate_max_candidates(self.max_candidates)
    }
}

impl ValidatePayload for NewExamResult {
    fn normalize(&mut self) {
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        if let Some(score) = self.score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(ApiError::Validation(
                    "score must be between 0 and 100".to_string(),
                ));
            }
        }
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

/// Phase a candidate moves to after passing an exam, if any.
///
/// Passing theory moves registered/theory candidates to practical; passing
/// the practical exam grants the license. Failures never change the phase.
pub fn status_after_pass(
    exam_type: LessonType,
    passed: bool,
    current: CandidateStatus,
) -> Option<CandidateStatus> {
    if !passed {
        return None;
    }

    match (exam_type, current) {
        (LessonType::Theory, CandidateStatus::Registered | CandidateStatus::Theory) => {
            Some(CandidateStatus::Practical)
        }
        (LessonType::Practical, CandidateStatus::Licensed | CandidateStatus::Dropped) => None,
        (LessonType::Practical, _) => Some(CandidateStatus::Licensed),
        (LessonType::Theory, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_time_must_be_hh_mm() {
        let exam: NewExam = serde_json::from_value(serde_json::json!({
            "course_id": Uuid::new_v4(),
            "exam_type": "theory",
            "date": "2026-11-02",
            "time": "9h30",
            "location": "Centre d'examen"
        }))
        .unwrap();
        assert!(exam.validate().is_err());

        let exam = NewExam {
            time: "09:30".to_string(),
            ..exam
        };
        assert!(exam.validate().is_ok());
    }

    #[test]
    fn test_unknown_exam_type_rejected() {
        let result: Result<NewExam, _> = serde_json::from_value(serde_json::json!({
            "course_id": Uuid::new_v4(),
            "exam_type": "oral",
            "date": "2026-11-02",
            "time": "09:30",
            "location": "Centre"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_score_range() {
        let mut result = NewExamResult {
            candidate_id: Uuid::new_v4(),
            score: Some(101.0),
            passed: true,
            notes: None,
        };
        assert!(result.validate().is_err());

        result.score = Some(35.0);
        assert!(result.validate().is_ok());

        result.score = None;
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_course_requires_positive_duration() {
        let course: NewCourse = serde_json::from_value(serde_json::json!({
            "title": "Code de la route",
            "license_category": "B",
            "lesson_type": "theory",
            "duration_hours": 0
        }))
        .unwrap();
        assert_eq!(
            course.validate().unwrap_err().public_message(),
            "duration_hours must be greater than 0"
        );
    }

    #[test]
    fn test_empty_exam_update_rejected() {
        assert!(ExamChanges::default().validate().is_err());
    }

    #[test]
    fn test_status_after_pass() {
        use CandidateStatus as S;

        assert_eq!(
            status_after_pass(LessonType::Theory, true, S::Registered),
            Some(S::Practical)
        );
        assert_eq!(
            status_after_pass(LessonType::Theory, true, S::Theory),
            Some(S::Practical)
        );
        assert_eq!(status_after_pass(LessonType::Theory, true, S::Practical), None);
        assert_eq!(
            status_after_pass(LessonType::Practical, true, S::Practical),
            Some(S::Licensed)
        );
        assert_eq!(status_after_pass(LessonType::Practical, true, S::Licensed), None);
        assert_eq!(status_after_pass(LessonType::Practical, false, S::Practical), None);
        assert_eq!(status_after_pass(LessonType::Theory, false, S::Registered), None);
    }

    #[test]
    fn test_exam_query_range() {
        let query = ExamQuery {
            from: NaiveDate::from_ymd_opt(2026, 5, 1),
            to: NaiveDate::from_ymd_opt(2026, 4, 1),
            ..Default::default()
        };
        assert!(query.filter().is_err());
    }
}
