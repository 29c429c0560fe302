use dsm_db::models::{
    EnrollmentChanges, EnrollmentFilter, EnrollmentStatus, LicenseCategory, MarkPaid,
    NewEnrollment, NewPayment, NewPaymentPlan, PaymentChanges, PaymentFilter, PaymentPlanChanges,
    PaymentPlanFilter, PaymentStatus,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{
        require_changes, trim, trim_optional, validate_amount, validate_optional_text,
        validate_range, validate_text,
    },
};

const NOTES_MAX: usize = 1000;
const REFERENCE_MAX: usize = 100;
const MAX_INSTALLMENTS: i64 = 36;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub candidate_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

impl PaymentQuery {
    pub const fn filter(&self) -> PaymentFilter {
        PaymentFilter {
            candidate_id: self.candidate_id,
            enrollment_id: self.enrollment_id,
            status: self.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub license_category: Option<LicenseCategory>,
    pub is_active: Option<bool>,
}

impl PlanQuery {
    pub const fn filter(&self) -> PaymentPlanFilter {
        PaymentPlanFilter {
            license_category: self.license_category,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrollmentQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub candidate_id: Option<Uuid>,
    pub status: Option<EnrollmentStatus>,
}

impl EnrollmentQuery {
    pub const fn filter(&self) -> EnrollmentFilter {
        EnrollmentFilter {
            candidate_id: self.candidate_id,
            status: self.status,
        }
    }
}

fn validate_installments(installments: i32) -> Result<(), ApiError> {
    validate_range("installments", i64::from(installments), 1, MAX_INSTALLMENTS)
}

impl ValidatePayload for NewPaymentPlan {
    fn normalize(&mut self) {
        trim(&mut self.name);
        trim_optional(&mut self.description);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_text("name", &self.name, 100)?;
        validate_amount("total_amount", self.total_amount)?;
        validate_installments(self.installments)?;
        validate_optional_text("description", self.description.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for PaymentPlanChanges {
    fn normalize(&mut self) {
        if let Some(name) = &mut self.name {
            trim(name);
        }
        trim_optional(&mut self.description);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.name.is_some()
                || self.license_category.is_some()
                || self.total_amount.is_some()
                || self.installments.is_some()
                || self.description.is_some()
                || self.is_active.is_some(),
        )?;

        if let Some(name) = &self.name {
            validate_text("name", name, 100)?;
        }
        if let Some(total) = self.total_amount {
            validate_amount("total_amount", total)?;
        }
        if let Some(installments) = self.installments {
            validate_installments(installments)?;
        }
        validate_optional_text("description", self.description.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for NewEnrollment {
    fn normalize(&mut self) {
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for EnrollmentChanges {
    fn normalize(&mut self) {
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(self.status.is_some() || self.notes.is_some())?;
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for NewPayment {
    fn normalize(&mut self) {
        trim_optional(&mut self.reference);
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_amount("amount", self.amount)?;
        if let Some(number) = self.installment_number {
            validate_range("installment_number", i64::from(number), 1, MAX_INSTALLMENTS)?;
        }
        validate_optional_text("reference", self.reference.as_deref(), REFERENCE_MAX)?;
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for PaymentChanges {
    fn normalize(&mut self) {
        trim_optional(&mut self.reference);
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.amount.is_some()
                || self.due_date.is_some()
                || self.status.is_some()
                || self.method.is_some()
                || self.reference.is_some()
                || self.notes.is_some(),
        )?;

        if let Some(amount) = self.amount {
            validate_amount("amount", amount)?;
        }
        if self.status == Some(PaymentStatus::Paid) {
            return Err(ApiError::Validation(
                "Use PUT /payments/{id}/mark-paid to settle a payment".to_string(),
            ));
        }
        validate_optional_text("reference", self.reference.as_deref(), REFERENCE_MAX)?;
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)
    }
}

impl ValidatePayload for MarkPaid {
    fn normalize(&mut self) {
        trim_optional(&mut self.reference);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_optional_text("reference", self.reference.as_deref(), REFERENCE_MAX)
    }
}

/// Reject payments that can no longer be settled
pub fn ensure_payable(status: PaymentStatus) -> Result<(), ApiError> {
    match status {
        PaymentStatus::Pending | PaymentStatus::Overdue => Ok(()),
        PaymentStatus::Paid => Err(ApiError::Validation(
            "Payment has already been paid".to_string(),
        )),
        PaymentStatus::Cancelled => Err(ApiError::Validation(
            "Cancelled payments cannot be marked as paid".to_string(),
        )),
    }
}

/// Paid and cancelled payments keep their status; open ones may move
/// between pending, overdue and cancelled
pub fn ensure_status_change(current: PaymentStatus, requested: PaymentStatus) -> Result<(), ApiError> {
    match current {
        PaymentStatus::Pending | PaymentStatus::Overdue => Ok(()),
        PaymentStatus::Paid | PaymentStatus::Cancelled if requested == current => Ok(()),
        PaymentStatus::Paid => Err(ApiError::Validation(
            "Paid payments cannot change status".to_string(),
        )),
        PaymentStatus::Cancelled => Err(ApiError::Validation(
            "Cancelled payments cannot change status".to_string(),
        )),
    }
}
