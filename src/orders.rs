use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::expiry::{ExpiryMode, ExpiryWindow};

/// Which side of the market the order is on.
///
/// Travels as a one-letter code: `B` for a buy order, `S` for a sell order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    #[serde(rename = "B")]
    Buy,
    #[serde(rename = "S")]
    Sell,
}

impl OrderType {
    pub fn code(&self) -> &'static str {
        match self {
            OrderType::Buy => "B",
            OrderType::Sell => "S",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "buy" => Ok(OrderType::Buy),
            "s" | "sell" => Ok(OrderType::Sell),
            _ => Err(format!("unknown order type: `{}`", s)),
        }
    }
}

/// Whether the order may be filled once or across several executions.
///
/// The orders API names these `pending` (single) and `processing` (multiple).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecuteStatus {
    #[serde(rename = "pending")]
    Single,
    #[serde(rename = "processing")]
    Multiple,
}

impl ExecuteStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ExecuteStatus::Single => "pending",
            ExecuteStatus::Multiple => "processing",
        }
    }
}

impl FromStr for ExecuteStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "pending" => Ok(ExecuteStatus::Single),
            "multiple" | "processing" => Ok(ExecuteStatus::Multiple),
            _ => Err(format!("unknown execute status: `{}`", s)),
        }
    }
}

/// The order form as the user left it.
///
/// Prices and quantity stay as typed; the orders API does its own parsing and
/// range checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub order_type: OrderType,
    pub price_min: String,
    pub price_max: String,
    pub quantity: String,
    pub execute_status: Option<ExecuteStatus>,
    pub expiry_mode: ExpiryMode,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
}

/// Who is placing orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Body of `POST {orders}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub buy_sell: OrderType,
    pub price_min: String,
    pub price_max: String,
    pub quantity: String,
    pub execute_from: String,
    pub execute_to: String,
    pub balance_quantity: String,
    pub execute_status: String,
    pub user_id: String,
}

/// A new order has nothing filled yet.
pub const OPENING_BALANCE: &str = "0";

/// Flattens a draft and its resolved window into the wire payload.
pub fn build_payload(draft: &OrderDraft, window: &ExpiryWindow, session: &Session) -> OrderPayload {
    OrderPayload {
        buy_sell: draft.order_type,
        price_min: draft.price_min.clone(),
        price_max: draft.price_max.clone(),
        quantity: draft.quantity.clone(),
        execute_from: window.execute_from_wire(),
        execute_to: window.execute_to_wire(),
        balance_quantity: OPENING_BALANCE.to_string(),
        execute_status: draft
            .execute_status
            .map(|s| s.code().to_string())
            .unwrap_or_default(),
        user_id: session.user_id.clone(),
    }
}

/// What the orders API answers with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<serde_json::Value>,
}

/// `code` value the orders API uses for an accepted order.
pub const SUCCESS_CODE: &str = "0000";

impl OrderResponse {
    pub fn is_success(&self) -> bool {
        self.code.as_deref() == Some(SUCCESS_CODE)
    }
}
