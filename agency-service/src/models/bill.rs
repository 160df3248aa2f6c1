use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived purely from the remaining balance: a bill is `Paid` once nothing
/// is owed, `Due` otherwise. Never set independently of `balance_due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Due,
    Paid,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Due => "Due",
            BillStatus::Paid => "Paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Due" => Some(BillStatus::Due),
            "Paid" => Some(BillStatus::Paid),
            _ => None,
        }
    }

    /// An advance larger than the grand total leaves a negative balance and
    /// the bill starts out settled, so the check is `<= 0` rather than `== 0`.
    pub fn from_balance(balance_due: f64) -> Self {
        if balance_due <= 0.0 {
            BillStatus::Paid
        } else {
            BillStatus::Due
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the append-only payment ledger of a bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub amount: f64,
    /// Calendar day the payment was taken, `YYYY-MM-DD`.
    pub date: String,
    pub note: Option<String>,
    pub recorded_at: DateTime,
}

/// Everything the operator enters on the billing screen. Captured verbatim on
/// the bill so the totals can always be re-derived and audited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingInputs {
    pub opening_km: f64,
    pub closing_km: f64,
    pub rate_per_km: f64,
    pub extra_km: f64,
    pub extra_hours: f64,
    pub extra_hour_charge: f64,
    pub night_charge: f64,
    pub toll_parking: f64,
    pub driver_allowance: f64,
    pub advance: f64,
    pub gst_enabled: bool,
    pub gst_percent: f64,
}

/// Derived amounts for one bill. A pure function of [`BillingInputs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingBreakdown {
    pub total_km: f64,
    pub base_amount: f64,
    pub extra_km_amount: f64,
    pub extra_hours_amount: f64,
    pub sub_total: f64,
    pub gst_amount: f64,
    pub grand_total: f64,
    pub balance_due: f64,
}

impl BillingInputs {
    /// Turns odometer readings and charges into the billed totals.
    ///
    /// Odometer distance is clamped at zero so an out-of-order pair of
    /// readings can never produce a negative base amount; callers are
    /// expected to reject such input before it gets here. Extra hours are
    /// charged once, at `extra_hours * extra_hour_charge`.
    pub fn compute(&self) -> BillingBreakdown {
        let total_km = (self.closing_km - self.opening_km).max(0.0);
        let base_amount = total_km * self.rate_per_km;
        let extra_km_amount = self.extra_km * self.rate_per_km;
        let extra_hours_amount = self.extra_hours * self.extra_hour_charge;
        let sub_total = base_amount
            + extra_km_amount
            + extra_hours_amount
            + self.driver_allowance
            + self.toll_parking
            + self.night_charge;
        let gst_amount = if self.gst_enabled {
            sub_total * self.gst_percent / 100.0
        } else {
            0.0
        };
        let grand_total = sub_total + gst_amount;
        let balance_due = grand_total - self.advance;
        BillingBreakdown {
            total_km,
            base_amount,
            extra_km_amount,
            extra_hours_amount,
            sub_total,
            gst_amount,
            grand_total,
            balance_due,
        }
    }
}

/// A finalized bill for one completed booking. The charge inputs and the
/// derived breakdown are flattened into the document itself, so fields like
/// `balance_due` sit at the top level where the store can filter and update
/// them atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub agency_id: String,
    pub booking_id: Uuid,
    pub trip_id: String,
    pub client_name: String,
    #[serde(flatten)]
    pub inputs: BillingInputs,
    #[serde(flatten)]
    pub breakdown: BillingBreakdown,
    pub payments: Vec<Payment>,
    pub status: BillStatus,
    pub bill_date: DateTime,
}

impl Bill {
    /// Acceptance rule for an incoming payment: strictly positive and no
    /// larger than the remaining balance. Overpayment is rejected rather
    /// than credited.
    pub fn payment_acceptable(balance_due: f64, amount: f64) -> bool {
        amount > 0.0 && amount <= balance_due
    }

    /// Total collected so far, including the advance taken at billing time.
    pub fn paid_amount(&self) -> f64 {
        self.breakdown.grand_total - self.breakdown.balance_due
    }

    /// Appends a payment and rederives balance and status. This is the
    /// in-memory mirror of the conditional update the store runs server-side;
    /// the store version additionally guards against concurrent writers.
    pub fn apply_payment(&mut self, payment: Payment) {
        self.breakdown.balance_due -= payment.amount;
        self.status = BillStatus::from_balance(self.breakdown.balance_due);
        self.payments.push(payment);
    }
}
