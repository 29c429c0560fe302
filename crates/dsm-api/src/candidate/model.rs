use dsm_db::models::{
    CandidateChanges, CandidateDocuments, CandidateFilter, CandidateProgress, CandidateStatus,
    LicenseCategory, NewCandidate, ProgressChanges,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{
        normalize_email, normalize_phone, require_changes, trim, trim_optional, validate_amount,
        validate_email, validate_national_id, validate_optional_text, validate_past_date,
        validate_phone, validate_text,
    },
};

const NAME_MAX: usize = 100;
const ADDRESS_MAX: usize = 255;
const DOCUMENT_MAX: usize = 255;

#[derive(Debug, Default, Deserialize)]
pub struct CandidateQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<CandidateStatus>,
    pub license_category: Option<LicenseCategory>,
    pub search: Option<String>,
}

impl CandidateQuery {
    pub fn filter(&self) -> CandidateFilter {
        let mut search = self.search.clone();
        trim_optional(&mut search);
        CandidateFilter {
            status: self.status,
            license_category: self.license_category,
            search,
        }
    }
}

/// Progress counters together with the phase they belong to
#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub candidate_id: Uuid,
    pub status: CandidateStatus,
    #[serde(flatten)]
    pub progress: CandidateProgress,
}

fn normalize_documents(documents: &mut CandidateDocuments) {
    trim(&mut documents.id_card);
    trim(&mut documents.medical_certificate);
    trim(&mut documents.photo);
}

fn validate_documents(documents: &CandidateDocuments) -> Result<(), ApiError> {
    validate_text("documents.id_card", &documents.id_card, DOCUMENT_MAX)?;
    validate_text(
        "documents.medical_certificate",
        &documents.medical_certificate,
        DOCUMENT_MAX,
    )?;
    validate_text("documents.photo", &documents.photo, DOCUMENT_MAX)
}

impl ValidatePayload for NewCandidate {
    fn normalize(&mut self) {
        trim(&mut self.name);
        normalize_email(&mut self.email);
        normalize_phone(&mut self.phone);
        trim_optional(&mut self.national_id);
        trim_optional(&mut self.address);
        normalize_documents(&mut self.documents);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_text("name", &self.name, NAME_MAX)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        if let Some(national_id) = &self.national_id {
            validate_national_id(national_id)?;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            validate_past_date("date_of_birth", date_of_birth)?;
        }
        validate_optional_text("address", self.address.as_deref(), ADDRESS_MAX)?;
        validate_documents(&self.documents)
    }
}

impl ValidatePayload for CandidateChanges {
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
        trim_optional(&mut self.national_id);
        trim_optional(&mut self.address);
        if let Some(documents) = &mut self.documents {
            normalize_documents(documents);
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.name.is_some()
                || self.email.is_some()
                || self.phone.is_some()
                || self.national_id.is_some()
                || self.date_of_birth.is_some()
                || self.address.is_some()
                || self.license_category.is_some()
                || self.status.is_some()
                || self.documents.is_some(),
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
        if let Some(national_id) = &self.national_id {
            validate_national_id(national_id)?;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            validate_past_date("date_of_birth", date_of_birth)?;
        }
        validate_optional_text("address", self.address.as_deref(), ADDRESS_MAX)?;
        if let Some(documents) = &self.documents {
            validate_documents(documents)?;
        }
        Ok(())
    }
}

impl ValidatePayload for ProgressChanges {
    fn validate(&self) -> Result<(), ApiError> {
        require_changes(
            self.theory_hours.is_some() || self.practical_hours.is_some() || self.status.is_some(),
        )?;

        if let Some(hours) = self.theory_hours {
            validate_amount("theory_hours", hours)?;
        }
        if let Some(hours) = self.practical_hours {
            validate_amount("practical_hours", hours)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_candidate() -> NewCandidate {
        serde_json::from_value(serde_json::json!({
            "name": "  Jane Doe ",
            "email": "Jane.Doe@Example.com",
            "phone": "06 12 34 56 78",
            "license_category": "B",
            "documents": {
                "id_card": "uploads/id.pdf",
                "medical_certificate": "uploads/medical.pdf",
                "photo": "uploads/photo.jpg"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_new_candidate_normalized_and_valid() {
        let mut candidate = new_candidate();
        candidate.normalize();
        assert_eq!(candidate.name, "Jane Doe");
        assert_eq!(candidate.email, "jane.doe@example.com");
        assert_eq!(candidate.phone, "0612345678");
        assert!(candidate.validate().is_ok());
    }

    #[test]
    fn test_new_candidate_requires_documents() {
        let result: Result<NewCandidate, _> = serde_json::from_value(serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "0612345678",
            "license_category": "B"
        }));
        assert!(result.is_err());

        let mut candidate = new_candidate();
        candidate.documents.photo = "   ".to_string();
        candidate.normalize();
        assert_eq!(
            candidate.validate().unwrap_err().public_message(),
            "documents.photo is required"
        );
    }

    #[test]
    fn test_unknown_license_category_rejected() {
        let result: Result<NewCandidate, _> = serde_json::from_value(serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "0612345678",
            "license_category": "Z",
            "documents": {"id_card": "a", "medical_certificate": "b", "photo": "c"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_update_with_name_only() {
        let mut changes: CandidateChanges =
            serde_json::from_value(serde_json::json!({ "name": "X" })).unwrap();
        changes.normalize();
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn test_partial_update_validates_present_fields() {
        let changes: CandidateChanges =
            serde_json::from_value(serde_json::json!({ "phone": "12" })).unwrap();
        assert!(changes.validate().is_err());

        let changes = CandidateChanges::default();
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_progress_changes() {
        let changes = ProgressChanges {
            theory_hours: Some(-1.0),
            ..Default::default()
        };
        assert!(changes.validate().is_err());

        let changes = ProgressChanges {
            practical_hours: Some(12.5),
            ..Default::default()
        };
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn test_query_filter_trims_search() {
        let query = CandidateQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(query.filter().search.is_none());
    }
}
