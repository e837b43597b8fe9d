//! Table formatting for CLI output

use crate::error::Result;
use autoeden_sdk::types::{Bid, MarketplaceStats, Notification, Vehicle, VehicleSearch};
use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;
use tabled::{settings::Style, Table, Tabled};

/// Format a timestamp in local time as YY-MM-DD HH:MM
fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|dt| dt.with_timezone(&Local).format("%y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

pub fn display_vehicles(vehicles: &[Vehicle]) -> Result<()> {
    #[derive(Tabled)]
    struct VehicleRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Vehicle")]
        vehicle: String,
        #[tabled(rename = "Mileage")]
        mileage: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Type")]
        listing_type: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Visible")]
        visible: String,
    }

    let rows = vehicles
        .iter()
        .map(|v| VehicleRow {
            id: v.id,
            vehicle: format!("{} {} {}", v.year, v.make, v.model),
            mileage: v
                .mileage
                .map(|m| format!("{m} km"))
                .unwrap_or_else(|| "-".to_string()),
            price: v
                .display_price()
                .map(|p| format!("${p}"))
                .unwrap_or_else(|| "-".to_string()),
            listing_type: v
                .listing_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: v.status.as_str().to_string(),
            visible: if v.is_visible { "✓" } else { "✗" }.to_string(),
        })
        .collect();

    print_table::<VehicleRow>(rows);
    Ok(())
}

pub fn display_bids(bids: &[Bid]) -> Result<()> {
    #[derive(Tabled)]
    struct BidRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Vehicle")]
        vehicle: u64,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Message")]
        message: String,
        #[tabled(rename = "Placed")]
        placed: String,
    }

    let rows = bids
        .iter()
        .map(|bid| BidRow {
            id: bid.id,
            vehicle: bid.vehicle,
            amount: format!("${}", bid.amount),
            status: format!("{:?}", bid.status).to_lowercase(),
            message: bid.message.clone(),
            placed: format_timestamp(bid.created_at),
        })
        .collect();

    print_table::<BidRow>(rows);
    Ok(())
}

pub fn display_notifications(notifications: &[Notification]) -> Result<()> {
    #[derive(Tabled)]
    struct NotificationRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "")]
        unread: &'static str,
        #[tabled(rename = "Message")]
        message: String,
        #[tabled(rename = "Received")]
        received: String,
    }

    let rows = notifications
        .iter()
        .map(|n| NotificationRow {
            id: n.id,
            unread: if n.is_read { "" } else { "●" },
            message: n.message.clone(),
            received: format_timestamp(n.created_at),
        })
        .collect();

    print_table::<NotificationRow>(rows);
    Ok(())
}

pub fn display_searches(searches: &[VehicleSearch]) -> Result<()> {
    #[derive(Tabled)]
    struct SearchRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Looking for")]
        target: String,
        #[tabled(rename = "Years")]
        years: String,
        #[tabled(rename = "Max price")]
        max_price: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Matches")]
        matches: u32,
    }

    let rows = searches
        .iter()
        .map(|s| SearchRow {
            id: s.id,
            target: format!("{} {}", s.make, s.model),
            years: format!("{}-{}", s.min_year, s.max_year),
            max_price: format!("${}", s.max_price),
            status: format!("{:?}", s.status).to_lowercase(),
            matches: s.match_count,
        })
        .collect();

    print_table::<SearchRow>(rows);
    Ok(())
}

pub fn display_stats(stats: &MarketplaceStats) -> Result<()> {
    #[derive(Tabled)]
    struct StatRow {
        #[tabled(rename = "Metric")]
        metric: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = stats
        .metrics
        .iter()
        .map(|(metric, value)| StatRow {
            metric: metric.replace('_', " "),
            value: match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
        .collect();

    print_table::<StatRow>(rows);
    Ok(())
}

pub fn display_config(config: &BTreeMap<&'static str, String>) -> Result<()> {
    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = config
        .iter()
        .map(|(key, value)| ConfigRow {
            key: *key,
            value: if value.is_empty() {
                "(default)".to_string()
            } else {
                value.clone()
            },
        })
        .collect();

    print_table::<ConfigRow>(rows);
    Ok(())
}
