//! Pure aggregation over bills and bookings. Everything here is a fold over
//! already-fetched rows; handlers do the I/O and pass slices in.

use crate::models::{Bill, Booking};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Dimensions the finance report can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    Client,
    Agent,
    Vehicle,
    Driver,
}

impl GroupDimension {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(GroupDimension::Client),
            "agent" => Some(GroupDimension::Agent),
            "vehicle" => Some(GroupDimension::Vehicle),
            "driver" => Some(GroupDimension::Driver),
            _ => None,
        }
    }

    /// Label used when the dimension cannot be resolved for a bill. A booking
    /// without a referring agent is legitimate direct business; the other
    /// dimensions only go unresolved on data gaps.
    fn fallback(&self) -> &'static str {
        match self {
            GroupDimension::Agent => "Direct Booking",
            _ => "N/A",
        }
    }

    fn label(
        &self,
        bill: &Bill,
        booking: Option<&Booking>,
        agent_names: &HashMap<Uuid, String>,
    ) -> String {
        let assignment = booking.and_then(|b| b.assignment.as_ref());
        let resolved = match self {
            GroupDimension::Client => {
                let name = bill.client_name.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            GroupDimension::Agent => assignment
                .and_then(|a| a.agent_id)
                .and_then(|id| agent_names.get(&id).cloned()),
            GroupDimension::Vehicle => assignment.map(|a| a.vehicle_number.clone()),
            GroupDimension::Driver => assignment.map(|a| a.driver_name.clone()),
        };
        resolved.unwrap_or_else(|| self.fallback().to_string())
    }
}

/// Tenant-wide money totals over every bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub total_revenue: f64,
    pub total_paid: f64,
    pub total_due: f64,
    pub bill_count: usize,
    pub paid_bills: usize,
    pub pending_bills: usize,
}

pub fn summarize(bills: &[Bill]) -> FinanceSummary {
    let mut summary = FinanceSummary {
        total_revenue: 0.0,
        total_paid: 0.0,
        total_due: 0.0,
        bill_count: bills.len(),
        paid_bills: 0,
        pending_bills: 0,
    };
    for bill in bills {
        summary.total_revenue += bill.breakdown.grand_total;
        summary.total_paid += bill.paid_amount();
        summary.total_due += bill.breakdown.balance_due;
        if bill.breakdown.balance_due > 0.0 {
            summary.pending_bills += 1;
        } else {
            summary.paid_bills += 1;
        }
    }
    summary
}

/// One row of the grouped finance report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub bill_count: usize,
    pub total: f64,
    pub paid: f64,
    pub due: f64,
    pub status: String,
}

/// Folds bills into per-group totals along the given dimension. Rows come
/// back sorted by key so the report is stable across runs.
pub fn group_bills(
    bills: &[Bill],
    bookings: &HashMap<Uuid, Booking>,
    agent_names: &HashMap<Uuid, String>,
    dimension: GroupDimension,
) -> Vec<GroupSummary> {
    #[derive(Default)]
    struct Acc {
        bill_count: usize,
        total: f64,
        paid: f64,
        due: f64,
    }

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for bill in bills {
        let key = dimension.label(bill, bookings.get(&bill.booking_id), agent_names);
        let acc = groups.entry(key).or_default();
        acc.bill_count += 1;
        acc.total += bill.breakdown.grand_total;
        acc.paid += bill.paid_amount();
        acc.due += bill.breakdown.balance_due;
    }

    groups
        .into_iter()
        .map(|(key, acc)| {
            let status = if acc.due <= 0.0 { "Settled" } else { "Outstanding" };
            GroupSummary {
                key,
                bill_count: acc.bill_count,
                total: acc.total,
                paid: acc.paid,
                due: acc.due,
                status: status.to_string(),
            }
        })
        .collect()
}

/// One point of the revenue chart: the client's first name and the billed
/// grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub label: String,
    pub amount: f64,
}

/// Chart points for the most recent `limit` bills, oldest first so the chart
/// reads left to right. Callers pass bills newest-first, as listed.
pub fn revenue_series(bills_newest_first: &[Bill], limit: usize) -> Vec<RevenuePoint> {
    bills_newest_first
        .iter()
        .take(limit)
        .rev()
        .map(|bill| RevenuePoint {
            label: bill
                .client_name
                .split_whitespace()
                .next()
                .unwrap_or("N/A")
                .to_string(),
            amount: bill.breakdown.grand_total,
        })
        .collect()
}

pub const CSV_HEADER: &str = "Bill ID,Client,Trip ID,Date,Total Amount,Paid,Due Amount,Status";

/// Renders all bills as a CSV download. Fields are joined raw with no quoting,
/// so a comma inside a client name shifts that row's columns.
pub fn export_csv(bills: &[Bill]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for bill in bills {
        let date = bill.bill_date.to_chrono().format("%Y-%m-%d");
        out.push_str(&format!(
            "{},{},{},{},{:.2},{:.2},{:.2},{}\n",
            bill.id,
            bill.client_name,
            bill.trip_id,
            date,
            bill.breakdown.grand_total,
            bill.paid_amount(),
            bill.breakdown.balance_due,
            bill.status
        ));
    }
    out
}
