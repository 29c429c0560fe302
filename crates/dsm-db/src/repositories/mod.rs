// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` and a `&mut Transaction` for multi-row writes.

pub mod admin;
pub mod candidate;
pub mod dashboard;
pub mod enrollment;
pub mod exam;
pub mod instructor;
pub mod payment;
pub mod session;
pub mod vehicle;
