//! Payment types: invoices, pre-checkout confirmations and transactions.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// One line of an invoice price breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledPrice {
    /// Portion label shown to the payer.
    pub label: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
}

impl LabeledPrice {
    pub fn new(label: impl Into<String>, amount: i64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Basic information about an invoice attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Bot-defined payload echoed back in payment updates.
    #[serde(default)]
    pub start_parameter: Option<String>,
    #[serde(default)]
    pub currency: String,
    /// Total price in the smallest currency unit.
    #[serde(default)]
    pub total_amount: i64,
}

/// A payer's confirmation request, delivered right before a charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    /// Identifier passed back in `answerPreCheckoutQuery`.
    pub id: String,
    /// The paying user.
    pub from: User,
    #[serde(default)]
    pub currency: String,
    /// Total price in the smallest currency unit.
    #[serde(default)]
    pub total_amount: i64,
    /// Bot-defined payload from the originating invoice.
    #[serde(default)]
    pub invoice_payload: String,
}

/// A completed payment attached to a service message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessfulPayment {
    #[serde(default)]
    pub currency: String,
    /// Total price in the smallest currency unit.
    #[serde(default)]
    pub total_amount: i64,
    /// Bot-defined payload from the originating invoice.
    #[serde(default)]
    pub invoice_payload: String,
    #[serde(default)]
    pub telegram_payment_charge_id: Option<String>,
    #[serde(default)]
    pub provider_payment_charge_id: Option<String>,
}

/// A transaction record returned by `inquireTransaction`.
///
/// The endpoint uses camel-case wire names for two fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "userID")]
    pub user_id: i64,
    #[serde(default)]
    pub amount: i64,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_wire_names() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "id": "tx-1",
            "status": "done",
            "userID": 99,
            "amount": 5000,
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(tx.user_id, 99);
        assert_eq!(tx.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
    }
}
