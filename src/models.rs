//! Request/response bodies for the embedded clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Item priced by the scale client
#[derive(Debug, Deserialize, Default)]
pub struct SubmitPriceRequest {
    pub item: Option<String>,
    /// Grams
    pub weight: Option<f64>,
    /// Cost of this item only, not the running total
    pub price: Option<f64>,
}

impl SubmitPriceRequest {
    pub fn item(&self) -> &str {
        self.item.as_deref().unwrap_or("Unknown")
    }

    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }

    pub fn price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitPriceResponse {
    pub status: String,
    pub new_total_bill: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BillResponse {
    pub total_bill: f64,
}

/// Card tap from the RFID reader. Readers differ in how they encode the
/// UID, so any JSON value is taken as the tag.
#[derive(Debug, Deserialize, Default)]
pub struct PaymentRequest {
    pub rfid_tag: Option<Value>,
}

impl PaymentRequest {
    pub fn rfid_tag(&self) -> String {
        match &self.rfid_tag {
            None | Some(Value::Null) => "Unknown".to_string(),
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub status: String,
    pub message: String,
}

impl PaymentResponse {
    pub fn accepted() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: "Payment Accepted".to_string(),
        }
    }

    pub fn no_bill() -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: "No Bill".to_string(),
        }
    }
}
