use dsm_db::models::DashboardStats;
use serde::{Deserialize, Serialize};

pub const DEFAULT_UPCOMING: i64 = 5;
pub const MAX_UPCOMING: i64 = 50;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// Percentage of recorded exam results that passed
    pub pass_rate: f64,
}

impl From<DashboardStats> for DashboardSummary {
    fn from(stats: DashboardStats) -> Self {
        let pass_rate = pass_rate(stats.exams_passed, stats.exam_results);
        Self { stats, pass_rate }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

impl UpcomingQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_UPCOMING).clamp(1, MAX_UPCOMING)
    }
}

/// Pass percentage rounded to one decimal, 0 when nothing was recorded
pub fn pass_rate(passed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = passed as f64 * 100.0 / total as f64;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate() {
        assert_eq!(pass_rate(0, 0), 0.0);
        assert_eq!(pass_rate(1, 2), 50.0);
        assert_eq!(pass_rate(2, 3), 66.7);
        assert_eq!(pass_rate(3, 3), 100.0);
    }

    #[test]
    fn test_upcoming_limit() {
        assert_eq!(UpcomingQuery::default().limit(), DEFAULT_UPCOMING);
        assert_eq!(UpcomingQuery { limit: Some(500) }.limit(), MAX_UPCOMING);
        assert_eq!(UpcomingQuery { limit: Some(0) }.limit(), 1);
    }

    #[test]
    fn test_summary_flattens_stats() {
        let stats = DashboardStats {
            total_candidates: 12,
            active_candidates: 9,
            active_instructors: 3,
            available_vehicles: 2,
            sessions_today: 4,
            upcoming_sessions: 11,
            total_revenue: 5400.0,
            outstanding_amount: 1200.5,
            exam_results: 4,
            exams_passed: 3,
        };
        let body = serde_json::to_value(DashboardSummary::from(stats)).unwrap();
        assert_eq!(body["total_candidates"], 12);
        assert_eq!(body["pass_rate"], 75.0);
    }
}
