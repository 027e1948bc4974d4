//! Billing ledger
//!
//! One running bill shared by the scale client (adds item prices) and the
//! display/RFID client (polls the total and pays). Nothing is persisted.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// A bill at or below this amount counts as empty
pub const MIN_PAYABLE: f64 = 0.01;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LedgerError {
    #[error("price {0} is not a finite amount")]
    InvalidPrice(f64),

    #[error("adding {price} to {total} overflows the bill")]
    Overflow { total: f64, price: f64 },
}

/// Accepted card payment. Logged, never stored.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub receipt_id: Uuid,
    pub rfid_tag: String,
    pub amount: f64,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    Accepted(PaymentEvent),
    NoBill,
}

/// Running bill total.
///
/// No idempotency: submitting the same price twice counts it twice.
#[derive(Debug, Default)]
pub struct BillLedger {
    total: Mutex<f64>,
}

impl BillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item price, returning the new total.
    /// The total is left unchanged when the result would not be finite.
    pub fn add(&self, price: f64) -> Result<f64, LedgerError> {
        if !price.is_finite() {
            return Err(LedgerError::InvalidPrice(price));
        }

        let mut total = self.total.lock();
        let new_total = *total + price;
        if !new_total.is_finite() {
            return Err(LedgerError::Overflow { total: *total, price });
        }

        *total = new_total;
        Ok(new_total)
    }

    pub fn get(&self) -> f64 {
        *self.total.lock()
    }

    /// Settle the bill if there is one. Check and reset happen under one lock.
    pub fn pay(&self, rfid_tag: &str) -> PaymentOutcome {
        let mut total = self.total.lock();
        if *total <= MIN_PAYABLE {
            return PaymentOutcome::NoBill;
        }

        let amount = std::mem::replace(&mut *total, 0.0);
        PaymentOutcome::Accepted(PaymentEvent {
            receipt_id: Uuid::new_v4(),
            rfid_tag: rfid_tag.to_string(),
            amount,
            paid_at: Utc::now(),
        })
    }
}
