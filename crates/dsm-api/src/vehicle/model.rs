use chrono::{Datelike, Utc};
use dsm_db::models::{
    LicenseCategory, NewMaintenanceRecord, NewVehicle, VehicleChanges, VehicleFilter,
    VehicleStatus,
};
use serde::Deserialize;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{
        normalize_plate, require_changes, trim, trim_optional, validate_amount, validate_plate,
        validate_range, validate_text,
    },
};

const MIN_YEAR: i64 = 1950;

#[derive(Debug, Default, Deserialize)]
pub struct VehicleQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<VehicleStatus>,
    pub category: Option<LicenseCategory>,
    pub search: Option<String>,
}

impl VehicleQuery {
    pub fn filter(&self) -> VehicleFilter {
        let mut search = self.search.clone();
        trim_optional(&mut search);
        VehicleFilter {
            status: self.status,
            category: self.category,
            search,
        }
    }
}

fn validate_year(year: i32) -> Result<(), ApiError> {
    let max_year = i64::from(Utc::now().year()) + 1;
    validate_range("year", i64::from(year), MIN_YEAR, max_year)
}

fn validate_mileage(mileage: i32) -> Result<(), ApiError> {
    if mileage < 0 {
        return Err(ApiError::Validation(
            "mileage must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

impl ValidatePayload for NewVehicle {
    fn normalize(&mut self) {
        trim(&mut self.brand);
        trim(&mut self.model);
        normalize_plate(&mut self.plate_number);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_text("brand", &self.brand, 50)?;
        validate_text("model", &self.model, 50)?;
        validate_plate(&self.plate_number)?;
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(mileage) = self.mileage {
            validate_mileage(mileage)?;
        }
        Ok(())
    }
}

impl ValidatePayload for VehicleChanges {
    fn normalize(&mut self) {
        if let Some(brand) = &mut self.brand {
            trim(brand);
        }
        if let Some(model) = &mut self.model {
            trim(model);
        }
        if let Some(plate) = &mut self.plate_number {
            normalize_plate(plate);
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.category.is_some()
                || self.brand.is_some()
                || self.model.is_some()
                || self.plate_number.is_some()
                || self.year.is_some()
                || self.mileage.is_some()
                || self.status.is_some(),
        )?;

        if let Some(brand) = &self.brand {
            validate_text("brand", brand, 50)?;
        }
        if let Some(model) = &self.model {
            validate_text("model", model, 50)?;
        }
        if let Some(plate) = &self.plate_number {
            validate_plate(plate)?;
        }
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(mileage) = self.mileage {
            validate_mileage(mileage)?;
        }
        Ok(())
    }
}

impl ValidatePayload for NewMaintenanceRecord {
    fn normalize(&mut self) {
        trim(&mut self.description);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_text("description", &self.description, 500)?;
        validate_amount("cost", self.cost)?;
        if let Some(mileage) = self.mileage {
            validate_mileage(mileage)?;
        }
        if self.performed_on > Utc::now().date_naive() {
            return Err(ApiError::Validation(
                "performed_on cannot be in the future".to_string(),
            ));
        }
        Ok(())
    }
}
