//! Billing handlers

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::billing::PaymentOutcome;
use crate::models::{
    BillResponse, PaymentRequest, PaymentResponse, SubmitPriceRequest, SubmitPriceResponse,
    STATUS_SUCCESS,
};
use crate::{AppError, AppResult, AppState};

/// JSON object body whose rejections become billing errors.
///
/// Only a top-level object is accepted; serde would otherwise read a
/// positional array into the request struct.
pub struct BillingJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for BillingJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(fields) = Json::<Map<String, Value>>::from_request(req, state).await?;
        let body = serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::BillingRequest(e.to_string()))?;
        Ok(Self(body))
    }
}

/// Add one weighed item to the running bill
pub async fn submit_price(
    State(state): State<AppState>,
    BillingJson(req): BillingJson<SubmitPriceRequest>,
) -> AppResult<Json<SubmitPriceResponse>> {
    let new_total = state.ledger.add(req.price())?;

    tracing::info!(
        item = %req.item().to_uppercase(),
        weight_g = req.weight(),
        item_cost = format_args!("{:.2}", req.price()),
        total_bill = format_args!("{:.2}", new_total),
        "Billing update"
    );

    Ok(Json(SubmitPriceResponse {
        status: STATUS_SUCCESS.to_string(),
        new_total_bill: new_total,
    }))
}

/// Current total, polled by the display client
pub async fn get_bill(State(state): State<AppState>) -> Json<BillResponse> {
    Json(BillResponse {
        total_bill: state.ledger.get(),
    })
}

/// Settle the bill with an RFID card
pub async fn process_payment(
    State(state): State<AppState>,
    BillingJson(req): BillingJson<PaymentRequest>,
) -> AppResult<Json<PaymentResponse>> {
    let rfid_tag = req.rfid_tag();
    match state.ledger.pay(&rfid_tag) {
        PaymentOutcome::Accepted(event) => {
            tracing::info!(
                receipt_id = %event.receipt_id,
                card_id = %event.rfid_tag,
                amount_paid = format_args!("{:.2}", event.amount),
                paid_at = %event.paid_at.to_rfc3339(),
                "Payment successful, bill cleared"
            );
            Ok(Json(PaymentResponse::accepted()))
        }
        PaymentOutcome::NoBill => {
            tracing::info!(card_id = %rfid_tag, "Payment attempted with no open bill");
            Ok(Json(PaymentResponse::no_bill()))
        }
    }
}
