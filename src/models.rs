use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ingested waiter/order/location event for a single day.
///
/// Feedback fields use the absence convention: a value of zero (or below)
/// means "not recorded" and must not be treated as a real score.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftRecord {
    pub location: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub waiter: String,
    pub waiter_email: String,
    pub hours_worked: f64,
    pub order_id: String,
    pub order_revenue: f64,
    pub avg_service_feedback: f64,
    pub min_service_feedback: i32,
    pub avg_cuisine_feedback: f64,
    pub min_cuisine_feedback: i32,
}

/// Per-waiter performance row covering the current period and its comparison
/// period. One row per (name, email) pair observed in either period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterSummary {
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub waiter_name: String,
    pub waiter_email: String,
    pub current_hours: f64,
    pub previous_hours: f64,
    pub delta_hours: f64,
    pub current_avg_service_feedback: f64,
    pub previous_avg_service_feedback: f64,
    pub delta_avg_service_feedback: f64,
    pub min_service_feedback: i32,
}

/// Per-location sales row. Only locations with at least one current-period
/// record are summarized; comparison-only locations are dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub location_id: String,
    pub location_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub current_orders_count: usize,
    pub previous_orders_count: usize,
    pub delta_orders_percent: f64,
    pub current_avg_cuisine_feedback: f64,
    pub previous_avg_cuisine_feedback: f64,
    pub delta_avg_cuisine_percent: f64,
    pub current_min_cuisine_feedback: i32,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    pub delta_revenue_percent: f64,
}
