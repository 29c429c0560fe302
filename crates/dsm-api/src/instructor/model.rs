use dsm_db::models::{
    AvailabilityWindow, InstructorChanges, InstructorFilter, LicenseCategory, NewInstructor,
    Vehicle,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{
        normalize_email, normalize_phone, require_changes, trim, trim_optional, validate_email,
        validate_phone, validate_text, validate_time_window,
    },
};

const NAME_MAX: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct InstructorQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub specialization: Option<LicenseCategory>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl InstructorQuery {
    pub fn filter(&self) -> InstructorFilter {
        let mut search = self.search.clone();
        trim_optional(&mut search);
        InstructorFilter {
            specialization: self.specialization,
            is_active: self.is_active,
            search,
        }
    }
}

/// Body of `PUT /instructors/{id}/assign-vehicle`; `null` unassigns
#[derive(Debug, Deserialize)]
pub struct AssignVehicleRequest {
    pub vehicle_id: Option<Uuid>,
}

impl ValidatePayload for AssignVehicleRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

fn validate_availability(windows: &[AvailabilityWindow]) -> Result<(), ApiError> {
    for window in windows {
        validate_time_window(&window.start_time, &window.end_time)?;
    }

    for (i, a) in windows.iter().enumerate() {
        let overlapping = windows[i + 1..].iter().any(|b| {
            a.day == b.day && a.start_time < b.end_time && b.start_time < a.end_time
        });
        if overlapping {
            return Err(ApiError::Validation(
                "availability windows must not overlap".to_string(),
            ));
        }
    }

    Ok(())
}

/// A vehicle can only be assigned to an instructor teaching its category
pub fn ensure_vehicle_matches(
    specialization: LicenseCategory,
    vehicle: &Vehicle,
) -> Result<(), ApiError> {
    if vehicle.category != specialization {
        return Err(ApiError::Validation(format!(
            "Vehicle category {:?} does not match instructor specialization {:?}",
            vehicle.category, specialization
        )));
    }
    Ok(())
}

impl ValidatePayload for NewInstructor {
    fn normalize(&mut self) {
        trim(&mut self.name);
        normalize_email(&mut self.email);
        normalize_phone(&mut self.phone);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_text("name", &self.name, NAME_MAX)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_availability(&self.availability)
    }
}

impl ValidatePayload for InstructorChanges {
    fn normalize(&mut self) {
        if let Some(name) = &mut self.name {
            trim(name);
        }
        if let Some(email) = &mut self.email {
            normalize_email(email);
        }
        if let Some(phone) = &mut self.phone {
            normalize_phone(phone);
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.name.is_some()
                || self.email.is_some()
                || self.phone.is_some()
                || self.specialization.is_some()
                || self.availability.is_some()
                || self.is_active.is_some()
                || self.hire_date.is_some(),
        )?;

        if let Some(name) = &self.name {
            validate_text("name", name, NAME_MAX)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        if let Some(availability) = &self.availability {
            validate_availability(availability)?;
        }
        Ok(())
    }
}
