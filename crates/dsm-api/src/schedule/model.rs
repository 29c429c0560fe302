use chrono::NaiveDate;
use dsm_db::models::{NewSession, SessionChanges, SessionFilter, SessionStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{require_changes, trim_optional, validate_optional_text, validate_range, validate_time},
};

const NOTES_MAX: usize = 1000;
const MIN_DURATION: i64 = 15;
const MAX_DURATION: i64 = 480;

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub instructor_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub status: Option<SessionStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SessionQuery {
    pub fn filter(&self) -> Result<SessionFilter, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::Validation("from must not be after to".to_string()));
            }
        }

        Ok(SessionFilter {
            instructor_id: self.instructor_id,
            candidate_id: self.candidate_id,
            vehicle_id: self.vehicle_id,
            status: self.status,
            from: self.from,
            to: self.to,
        })
    }
}

/// Body of the complete and cancel actions
#[derive(Debug, Default, Deserialize)]
pub struct CloseSessionRequest {
    pub notes: Option<String>,
    /// Cancel only: record the candidate as absent instead of cancelled
    #[serde(default)]
    pub no_show: bool,
}

impl ValidatePayload for CloseSessionRequest {
    fn normalize(&mut self) {
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

/// Hours credited to the candidate for a completed session
pub fn session_hours(duration_minutes: i32) -> f64 {
    f64::from(duration_minutes) / 60.0
}

fn validate_duration(duration_minutes: i32) -> Result<(), ApiError> {
    validate_range(
        "duration_minutes",
        i64::from(duration_minutes),
        MIN_DURATION,
        MAX_DURATION,
    )
}

impl ValidatePayload for NewSession {
    fn normalize(&mut self) {
        self.time = self.time.trim().to_string();
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_time("time", &self.time)?;
        if let Some(duration) = self.duration_minutes {
            validate_duration(duration)?;
        }
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for SessionChanges {
    fn normalize(&mut self) {
        if let Some(time) = &mut self.time {
            *time = time.trim().to_string();
        }
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.instructor_id.is_some()
                || self.candidate_id.is_some()
                || self.vehicle_id.is_some()
                || self.date.is_some()
                || self.time.is_some()
                || self.duration_minutes.is_some()
                || self.lesson_type.is_some()
                || self.status.is_some()
                || self.notes.is_some(),
        )?;

        if let Some(time) = &self.time {
            validate_time("time", time)?;
        }
        if let Some(duration) = self.duration_minutes {
            validate_duration(duration)?;
        }
        // Completion credits training hours, so it has its own endpoint
        if self.status == Some(SessionStatus::Completed) {
            return Err(ApiError::Validation(
                "Use PUT /schedule/{id}/complete to complete a session".to_string(),
            ));
        }
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}
