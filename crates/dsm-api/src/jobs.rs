//! Background jobs for periodic maintenance tasks.

use std::time::Duration;

use chrono::Utc;
use dsm_db::repositories::payment;
use sqlx::PgPool;
use tokio::time::interval;

use crate::metrics::record_overdue_payments;

/// Start all background jobs
///
/// Returns the join handles so the caller can abort them on shutdown
pub fn start_background_jobs(pool: PgPool) -> Vec<tokio::task::JoinHandle<()>> {
    vec![tokio::spawn(overdue_payments_job(pool))]
}

/// Flag pending installments whose due date has passed, once at startup and
/// then every 24 hours
async fn overdue_payments_job(pool: PgPool) {
    let mut interval = interval(Duration::from_secs(86400));

    loop {
        interval.tick().await;

        let today = Utc::now().date_naive();
        match payment::mark_overdue(&pool, today).await {
            Ok(updated) if updated > 0 => {
                record_overdue_payments(updated);
                tracing::info!("Marked {} pending payments as overdue", updated);
            }
            Ok(_) => {
                tracing::debug!("No pending payments past their due date");
            }
            Err(e) => {
                tracing::error!("Failed to mark overdue payments: {}", e);
            }
        }
    }
}
