use std::fmt::Write;

use chrono::NaiveDate;
use serde_json::json;

use crate::models::{LocationSummary, WaiterSummary};

/// Renders a delta as a signed percentage, e.g. `+12.3%` or `-4.0%`.
pub fn format_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.1}%", value * 100.0)
    } else {
        format!("{:.1}%", value * 100.0)
    }
}

/// CSV payload for the waiter performance view. Column set and order are
/// fixed for interoperability with existing consumers.
pub fn waiter_csv(summaries: &[WaiterSummary]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Location",
        "Start Date",
        "End Date",
        "Waiter Name",
        "Waiter Email",
        "Current Hours",
        "Previous Hours",
        "Delta Hours",
        "Current Avg Service Feedback",
        "Previous Avg Service Feedback",
        "Delta Avg Service Feedback",
        "Min Service Feedback",
    ])?;

    for summary in summaries {
        writer.write_record([
            summary.location.clone(),
            summary.start_date.to_string(),
            summary.end_date.to_string(),
            summary.waiter_name.clone(),
            summary.waiter_email.clone(),
            format!("{:.2}", summary.current_hours),
            format!("{:.2}", summary.previous_hours),
            format_percent(summary.delta_hours),
            format!("{:.2}", summary.current_avg_service_feedback),
            format!("{:.2}", summary.previous_avg_service_feedback),
            format_percent(summary.delta_avg_service_feedback),
            summary.min_service_feedback.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to finish waiter csv: {err}"))
}

/// CSV payload for the location sales view.
pub fn location_csv(summaries: &[LocationSummary]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Location Id",
        "Location Name",
        "Start Date",
        "End Date",
        "Current Orders Count",
        "Previous Orders Count",
        "Delta Orders",
        "Current Avg Cuisine Feedback",
        "Previous Avg Cuisine Feedback",
        "Delta Avg Cuisine Feedback",
        "Current Min Cuisine Feedback",
        "Current Revenue",
        "Previous Revenue",
        "Delta Revenue",
    ])?;

    for summary in summaries {
        writer.write_record([
            summary.location_id.clone(),
            summary.location_name.clone(),
            summary.start_date.to_string(),
            summary.end_date.to_string(),
            summary.current_orders_count.to_string(),
            summary.previous_orders_count.to_string(),
            format_percent(summary.delta_orders_percent),
            format!("{:.2}", summary.current_avg_cuisine_feedback),
            format!("{:.2}", summary.previous_avg_cuisine_feedback),
            format_percent(summary.delta_avg_cuisine_percent),
            summary.current_min_cuisine_feedback.to_string(),
            format!("{:.2}", summary.current_revenue),
            format!("{:.2}", summary.previous_revenue),
            format_percent(summary.delta_revenue_percent),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to finish location csv: {err}"))
}

/// JSON payload: a `{ sales, performance }` object when both views are
/// requested, a bare array for a single view.
pub fn render_json(
    waiters: Option<&[WaiterSummary]>,
    locations: Option<&[LocationSummary]>,
) -> anyhow::Result<String> {
    let value = match (waiters, locations) {
        (Some(waiters), Some(locations)) => json!({
            "sales": locations,
            "performance": waiters,
        }),
        (Some(waiters), None) => json!(waiters),
        (None, Some(locations)) => json!(locations),
        (None, None) => json!({}),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn build_report(
    location_filter: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
    waiters: Option<&[WaiterSummary]>,
    locations: Option<&[LocationSummary]>,
) -> String {
    let mut output = String::new();
    let scope = location_filter.unwrap_or("all locations");

    let _ = writeln!(output, "# Shift Sales Report");
    let _ = writeln!(
        output,
        "Period {} to {} for {}, compared to the preceding range of equal length.",
        start, end, scope
    );

    if let Some(locations) = locations {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Location Sales");

        if locations.is_empty() {
            let _ = writeln!(output, "No location activity in this period.");
        } else {
            let mut by_revenue = locations.to_vec();
            by_revenue.sort_by(|a, b| {
                b.current_revenue
                    .partial_cmp(&a.current_revenue)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for summary in by_revenue.iter() {
                let _ = writeln!(
                    output,
                    "- {} ({}): {} orders ({}), revenue {:.2} ({}), avg cuisine feedback {:.2} ({})",
                    summary.location_name,
                    summary.location_id,
                    summary.current_orders_count,
                    format_percent(summary.delta_orders_percent),
                    summary.current_revenue,
                    format_percent(summary.delta_revenue_percent),
                    summary.current_avg_cuisine_feedback,
                    format_percent(summary.delta_avg_cuisine_percent),
                );
            }
        }
    }

    if let Some(waiters) = waiters {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Waiter Performance");

        if waiters.is_empty() {
            let _ = writeln!(output, "No waiter activity in this period.");
        } else {
            let mut by_hours = waiters.to_vec();
            by_hours.sort_by(|a, b| {
                b.current_hours
                    .partial_cmp(&a.current_hours)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            for summary in by_hours.iter() {
                let _ = writeln!(
                    output,
                    "- {} ({}, {}): {:.1}h ({}), avg service feedback {:.2} ({}), min {}",
                    summary.waiter_name,
                    summary.waiter_email,
                    summary.location,
                    summary.current_hours,
                    format_percent(summary.delta_hours),
                    summary.current_avg_service_feedback,
                    format_percent(summary.delta_avg_service_feedback),
                    summary.min_service_feedback,
                );
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_waiter() -> WaiterSummary {
        WaiterSummary {
            location: "Harbor Grill".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 16).unwrap(),
            waiter_name: "Alice Moreau".to_string(),
            waiter_email: "alice.moreau@harborgrill.com".to_string(),
            current_hours: 13.5,
            previous_hours: 12.0,
            delta_hours: 0.125,
            current_avg_service_feedback: 4.6,
            previous_avg_service_feedback: 4.0,
            delta_avg_service_feedback: 0.15,
            min_service_feedback: 4,
        }
    }

    fn sample_location() -> LocationSummary {
        LocationSummary {
            location_id: "harbor-01".to_string(),
            location_name: "Harbor Grill".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 16).unwrap(),
            current_orders_count: 3,
            previous_orders_count: 2,
            delta_orders_percent: 0.5,
            current_avg_cuisine_feedback: 4.0,
            previous_avg_cuisine_feedback: 4.0,
            delta_avg_cuisine_percent: 0.0,
            current_min_cuisine_feedback: 2,
            current_revenue: 476.40,
            previous_revenue: 421.65,
            delta_revenue_percent: 0.12986363,
        }
    }

    #[test]
    fn percent_formatting_is_signed() {
        assert_eq!(format_percent(1.0), "+100.0%");
        assert_eq!(format_percent(0.0), "+0.0%");
        assert_eq!(format_percent(-0.5), "-50.0%");
        assert_eq!(format_percent(2.125), "+212.5%");
    }

    #[test]
    fn waiter_csv_keeps_the_fixed_column_set() {
        let bytes = waiter_csv(&[sample_waiter()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Location,Start Date,End Date,Waiter Name,Waiter Email,\
             Current Hours,Previous Hours,Delta Hours,\
             Current Avg Service Feedback,Previous Avg Service Feedback,\
             Delta Avg Service Feedback,Min Service Feedback"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("Harbor Grill,2026-08-10,2026-08-16,Alice Moreau"));
        assert!(row.contains("+12.5%"));
        assert!(row.ends_with(",4"));
    }

    #[test]
    fn location_csv_keeps_the_fixed_column_set() {
        let bytes = location_csv(&[sample_location()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Location Id,Location Name,Start Date,End Date,\
             Current Orders Count,Previous Orders Count,Delta Orders,\
             Current Avg Cuisine Feedback,Previous Avg Cuisine Feedback,\
             Delta Avg Cuisine Feedback,Current Min Cuisine Feedback,\
             Current Revenue,Previous Revenue,Delta Revenue"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("harbor-01,Harbor Grill,2026-08-10,2026-08-16,3,2,+50.0%"));
        assert!(row.contains("476.40"));
    }

    #[test]
    fn json_wraps_both_views_in_one_object() {
        let waiters = [sample_waiter()];
        let locations = [sample_location()];
        let text = render_json(Some(&waiters), Some(&locations)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["sales"][0]["locationId"], "harbor-01");
        assert_eq!(value["performance"][0]["waiterEmail"], "alice.moreau@harborgrill.com");
    }

    #[test]
    fn json_single_view_is_a_bare_array() {
        let locations = [sample_location()];
        let text = render_json(None, Some(&locations)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["currentOrdersCount"], 3);
    }

    #[test]
    fn markdown_report_covers_requested_sections() {
        let waiters = [sample_waiter()];
        let locations = [sample_location()];
        let start = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 8, 16).unwrap();

        let full = build_report(None, start, end, Some(&waiters), Some(&locations));
        assert!(full.contains("# Shift Sales Report"));
        assert!(full.contains("## Location Sales"));
        assert!(full.contains("## Waiter Performance"));
        assert!(full.contains("Alice Moreau"));

        let sales_only = build_report(Some("harbor-01"), start, end, None, Some(&locations));
        assert!(sales_only.contains("for harbor-01"));
        assert!(!sales_only.contains("## Waiter Performance"));
    }

    #[test]
    fn markdown_report_handles_empty_windows() {
        let start = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 8, 16).unwrap();
        let report = build_report(None, start, end, Some(&[]), Some(&[]));
        assert!(report.contains("No location activity in this period."));
        assert!(report.contains("No waiter activity in this period."));
    }
}
