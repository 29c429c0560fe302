use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

// ============================================================================
// Enumerations (mirrors the Postgres ENUM types)
// ============================================================================

/// Driving license category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "license_category")]
pub enum LicenseCategory {
    A,
    B,
    C,
    D,
    E,
}

/// License phase a candidate is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "candidate_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Registered,
    Theory,
    Practical,
    Licensed,
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
    OutOfService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Check,
}

/// Kind of lesson, also used as the exam type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lesson_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    Theory,
    Practical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exam_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

/// Day of the week used by instructor availability windows (stored in JSONB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

// ============================================================================
// Paging
// ============================================================================

/// Limit/offset pair handed to list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

// ============================================================================
// Admins
// ============================================================================

/// Admin principal, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin row including the password hash, used for login and password changes
#[derive(Debug, Clone, FromRow)]
pub struct AdminCredentials {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

// ============================================================================
// Candidates
// ============================================================================

/// Required file references collected at registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CandidateDocuments {
    pub id_card: String,
    pub medical_certificate: String,
    pub photo: String,
}

/// Training hours completed, by lesson type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateProgress {
    pub theory_hours: f64,
    pub practical_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub license_category: LicenseCategory,
    pub status: CandidateStatus,
    #[sqlx(flatten)]
    pub documents: CandidateDocuments,
    #[sqlx(flatten)]
    pub progress: CandidateProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub license_category: LicenseCategory,
    pub status: Option<CandidateStatus>,
    pub documents: CandidateDocuments,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub license_category: Option<LicenseCategory>,
    pub status: Option<CandidateStatus>,
    pub documents: Option<CandidateDocuments>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressChanges {
    pub theory_hours: Option<f64>,
    pub practical_hours: Option<f64>,
    pub status: Option<CandidateStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub status: Option<CandidateStatus>,
    pub license_category: Option<LicenseCategory>,
    pub search: Option<String>,
}

// ============================================================================
// Instructors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instructor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: LicenseCategory,
    pub vehicle_id: Option<Uuid>,
    pub availability: Json<Vec<AvailabilityWindow>>,
    pub is_active: bool,
    pub hire_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInstructor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: LicenseCategory,
    pub vehicle_id: Option<Uuid>,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    pub is_active: Option<bool>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstructorChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<LicenseCategory>,
    pub availability: Option<Vec<AvailabilityWindow>>,
    pub is_active: Option<bool>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct InstructorFilter {
    pub specialization: Option<LicenseCategory>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// ============================================================================
// Vehicles
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub category: LicenseCategory,
    pub brand: String,
    pub model: String,
    pub plate_number: String,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub performed_on: NaiveDate,
    pub description: String,
    pub cost: f64,
    pub mileage: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Vehicle together with its maintenance history
#[derive(Debug, Clone, Serialize)]
pub struct VehicleDetails {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub maintenance_history: Vec<MaintenanceRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub category: LicenseCategory,
    pub brand: String,
    pub model: String,
    pub plate_number: String,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleChanges {
    pub category: Option<LicenseCategory>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub plate_number: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMaintenanceRecord {
    pub performed_on: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub cost: f64,
    pub mileage: Option<i32>,
    /// Optional status to move the vehicle to once the record is stored
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub status: Option<VehicleStatus>,
    pub category: Option<LicenseCategory>,
    pub search: Option<String>,
}

// ============================================================================
// Payment plans, enrollments and payments
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentPlan {
    pub id: Uuid,
    pub name: String,
    pub license_category: LicenseCategory,
    pub total_amount: f64,
    pub installments: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentPlan {
    pub name: String,
    pub license_category: LicenseCategory,
    pub total_amount: f64,
    pub installments: i32,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentPlanChanges {
    pub name: Option<String>,
    pub license_category: Option<LicenseCategory>,
    pub total_amount: Option<f64>,
    pub installments: Option<i32>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentPlanFilter {
    pub license_category: Option<LicenseCategory>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub payment_plan_id: Uuid,
    pub license_category: LicenseCategory,
    pub status: EnrollmentStatus,
    pub enrolled_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment returned together with the installments generated for it
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentWithPayments {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEnrollment {
    pub candidate_id: Uuid,
    pub payment_plan_id: Uuid,
    /// Defaults to the plan's category
    pub license_category: Option<LicenseCategory>,
    /// Defaults to today
    pub enrolled_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentChanges {
    pub status: Option<EnrollmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter {
    pub candidate_id: Option<Uuid>,
    pub status: Option<EnrollmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub payment_plan_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
    pub amount: f64,
    pub installment_number: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub candidate_id: Uuid,
    pub payment_plan_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
    pub amount: f64,
    pub installment_number: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentChanges {
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkPaid {
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub candidate_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

// ============================================================================
// Courses, exams and results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub license_category: LicenseCategory,
    pub lesson_type: LessonType,
    pub duration_hours: f64,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub license_category: LicenseCategory,
    pub lesson_type: LessonType,
    pub duration_hours: f64,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub license_category: Option<LicenseCategory>,
    pub lesson_type: Option<LessonType>,
    pub duration_hours: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub license_category: Option<LicenseCategory>,
    pub lesson_type: Option<LessonType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exam {
    pub id: Uuid,
    pub course_id: Uuid,
    pub exam_type: LessonType,
    #[sqlx(rename = "exam_date")]
    pub date: NaiveDate,
    #[sqlx(rename = "exam_time")]
    pub time: String,
    pub location: String,
    pub examiner: Option<String>,
    pub max_candidates: Option<i32>,
    pub status: ExamStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExam {
    pub course_id: Uuid,
    pub exam_type: LessonType,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub examiner: Option<String>,
    pub max_candidates: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamChanges {
    pub course_id: Option<Uuid>,
    pub exam_type: Option<LessonType>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub examiner: Option<String>,
    pub max_candidates: Option<i32>,
    pub status: Option<ExamStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ExamFilter {
    pub course_id: Option<Uuid>,
    pub exam_type: Option<LessonType>,
    pub status: Option<ExamStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExamResult {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub candidate_id: Uuid,
    pub score: Option<f64>,
    pub passed: bool,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExamResult {
    pub candidate_id: Uuid,
    pub score: Option<f64>,
    pub passed: bool,
    pub notes: Option<String>,
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub candidate_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    #[sqlx(rename = "session_date")]
    pub date: NaiveDate,
    #[sqlx(rename = "start_time")]
    pub time: String,
    pub duration_minutes: i32,
    pub lesson_type: LessonType,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSession {
    pub instructor_id: Uuid,
    pub candidate_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: Option<i32>,
    pub lesson_type: LessonType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionChanges {
    pub instructor_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub lesson_type: Option<LessonType>,
    pub status: Option<SessionStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub instructor_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub status: Option<SessionStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DashboardStats {
    pub total_candidates: i64,
    pub active_candidates: i64,
    pub active_instructors: i64,
    pub available_vehicles: i64,
    pub sessions_today: i64,
    pub upcoming_sessions: i64,
    pub total_revenue: f64,
    pub outstanding_amount: f64,
    pub exam_results: i64,
    pub exams_passed: i64,
}

/// Scheduled session joined with the display names the dashboard needs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionOverview {
    pub id: Uuid,
    #[sqlx(rename = "session_date")]
    pub date: NaiveDate,
    #[sqlx(rename = "start_time")]
    pub time: String,
    pub duration_minutes: i32,
    pub lesson_type: LessonType,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub vehicle_plate: Option<String>,
}
