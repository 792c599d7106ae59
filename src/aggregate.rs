use std::collections::{HashMap, HashSet};

use anyhow::bail;
use chrono::{Duration, NaiveDate, Utc};

use crate::models::{LocationSummary, ShiftRecord, WaiterSummary};

/// Signed fractional change from `previous` to `current`.
///
/// A zero baseline is reported as a full positive swing (+100%) when the
/// current value is positive, and as no change otherwise. Deltas are not
/// clamped; they may exceed 1.0 in magnitude when the baseline is non-zero.
pub fn delta(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous
    }
}

/// The immediately preceding range with the same inclusive length as
/// `[start, end]`.
pub fn comparison_period(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let range_days = (end - start).num_days();
    let previous_end = start - Duration::days(1);
    let previous_start = previous_end - Duration::days(range_days);
    (previous_start, previous_end)
}

/// Request-boundary validation. The aggregation itself never inspects dates;
/// callers reject bad ranges before fetching anything.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> anyhow::Result<()> {
    if start == end {
        bail!("start date and end date cannot be the same day");
    }
    if start > end {
        bail!("start date must be before end date");
    }
    if end > Utc::now().date_naive() {
        bail!("end date cannot be in the future");
    }
    Ok(())
}

/// Runs both aggregation passes over the same two record collections and
/// returns one summary row per waiter and per active location.
///
/// Pure and total: empty inputs yield empty outputs, and output ordering is
/// unspecified.
pub fn aggregate(
    current: &[ShiftRecord],
    previous: &[ShiftRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> (Vec<WaiterSummary>, Vec<LocationSummary>) {
    let waiters = summarize_waiters(current, previous, start, end);
    let locations = summarize_locations(current, previous, start, end);
    (waiters, locations)
}

/// Running state for one (waiter name, waiter email) pair. Feedback counters
/// only move for positive values; the minimum stays `None` until a positive
/// current-period value is seen.
struct WaiterAccumulator {
    location: String,
    current_hours: f64,
    previous_hours: f64,
    current_feedback_sum: f64,
    previous_feedback_sum: f64,
    current_feedback_count: u32,
    previous_feedback_count: u32,
    min_service_feedback: Option<i32>,
}

impl WaiterAccumulator {
    fn new(record: &ShiftRecord) -> Self {
        Self {
            location: record.location.clone(),
            current_hours: 0.0,
            previous_hours: 0.0,
            current_feedback_sum: 0.0,
            previous_feedback_sum: 0.0,
            current_feedback_count: 0,
            previous_feedback_count: 0,
            min_service_feedback: None,
        }
    }

    fn fold_current(&mut self, record: &ShiftRecord) {
        self.current_hours += record.hours_worked;
        if record.avg_service_feedback > 0.0 {
            self.current_feedback_sum += record.avg_service_feedback;
            self.current_feedback_count += 1;
        }
        if record.min_service_feedback > 0 {
            self.min_service_feedback = Some(match self.min_service_feedback {
                Some(current) => current.min(record.min_service_feedback),
                None => record.min_service_feedback,
            });
        }
    }

    fn fold_previous(&mut self, record: &ShiftRecord) {
        self.previous_hours += record.hours_worked;
        if record.avg_service_feedback > 0.0 {
            self.previous_feedback_sum += record.avg_service_feedback;
            self.previous_feedback_count += 1;
        }
    }

    fn finish(
        self,
        waiter_name: String,
        waiter_email: String,
        start: NaiveDate,
        end: NaiveDate,
    ) -> WaiterSummary {
        let current_avg = mean(self.current_feedback_sum, self.current_feedback_count);
        let previous_avg = mean(self.previous_feedback_sum, self.previous_feedback_count);
        WaiterSummary {
            location: self.location,
            start_date: start,
            end_date: end,
            waiter_name,
            waiter_email,
            current_hours: self.current_hours,
            previous_hours: self.previous_hours,
            delta_hours: delta(self.current_hours, self.previous_hours),
            current_avg_service_feedback: current_avg,
            previous_avg_service_feedback: previous_avg,
            delta_avg_service_feedback: delta(current_avg, previous_avg),
            min_service_feedback: self.min_service_feedback.unwrap_or(0),
        }
    }
}

fn mean(sum: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn summarize_waiters(
    current: &[ShiftRecord],
    previous: &[ShiftRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<WaiterSummary> {
    // The pair is the grouping key; two waiters can share a name.
    let mut accumulators: HashMap<(String, String), WaiterAccumulator> = HashMap::new();

    for record in current {
        accumulators
            .entry((record.waiter.clone(), record.waiter_email.clone()))
            .or_insert_with(|| WaiterAccumulator::new(record))
            .fold_current(record);
    }
    for record in previous {
        accumulators
            .entry((record.waiter.clone(), record.waiter_email.clone()))
            .or_insert_with(|| WaiterAccumulator::new(record))
            .fold_previous(record);
    }

    accumulators
        .into_iter()
        .map(|((name, email), acc)| acc.finish(name, email, start, end))
        .collect()
}

/// Totals for one location over one period.
struct PeriodSales {
    orders_count: usize,
    revenue: f64,
    avg_cuisine_feedback: f64,
}

fn period_sales(records: &[&ShiftRecord]) -> PeriodSales {
    // Orders are deduplicated by id; revenue is a plain sum over records.
    let distinct_orders: HashSet<&str> =
        records.iter().map(|r| r.order_id.as_str()).collect();
    let revenue: f64 = records.iter().map(|r| r.order_revenue).sum();

    let mut feedback_sum = 0.0;
    let mut feedback_count = 0u32;
    for record in records {
        if record.avg_cuisine_feedback > 0.0 {
            feedback_sum += record.avg_cuisine_feedback;
            feedback_count += 1;
        }
    }

    PeriodSales {
        orders_count: distinct_orders.len(),
        revenue,
        avg_cuisine_feedback: mean(feedback_sum, feedback_count),
    }
}

fn group_by_location(records: &[ShiftRecord]) -> HashMap<&str, Vec<&ShiftRecord>> {
    let mut groups: HashMap<&str, Vec<&ShiftRecord>> = HashMap::new();
    for record in records {
        groups.entry(record.location_id.as_str()).or_default().push(record);
    }
    groups
}

fn summarize_locations(
    current: &[ShiftRecord],
    previous: &[ShiftRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<LocationSummary> {
    let current_by_location = group_by_location(current);
    let previous_by_location = group_by_location(previous);

    // Locations with no current-period activity are dropped, even when the
    // comparison period has records for them.
    let mut summaries = Vec::with_capacity(current_by_location.len());
    for (location_id, current_records) in current_by_location {
        let previous_records = previous_by_location
            .get(location_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let current_sales = period_sales(&current_records);
        let previous_sales = period_sales(previous_records);

        let min_cuisine = current_records
            .iter()
            .map(|r| r.min_cuisine_feedback)
            .filter(|&v| v > 0)
            .min();

        summaries.push(LocationSummary {
            location_id: location_id.to_string(),
            location_name: current_records[0].location.clone(),
            start_date: start,
            end_date: end,
            current_orders_count: current_sales.orders_count,
            previous_orders_count: previous_sales.orders_count,
            delta_orders_percent: delta(
                current_sales.orders_count as f64,
                previous_sales.orders_count as f64,
            ),
            current_avg_cuisine_feedback: current_sales.avg_cuisine_feedback,
            previous_avg_cuisine_feedback: previous_sales.avg_cuisine_feedback,
            delta_avg_cuisine_percent: delta(
                current_sales.avg_cuisine_feedback,
                previous_sales.avg_cuisine_feedback,
            ),
            current_min_cuisine_feedback: min_cuisine.unwrap_or(0),
            current_revenue: current_sales.revenue,
            previous_revenue: previous_sales.revenue,
            delta_revenue_percent: delta(current_sales.revenue, previous_sales.revenue),
        });
    }

    summaries
}
