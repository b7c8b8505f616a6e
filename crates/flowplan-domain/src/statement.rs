//! Card transactions settled against a statement cutoff, and the yearly events budget.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{KeyKind, ParseKeyError};

/// How a transaction was paid; only card charges land on the statement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    BankTransfer,
    Cash,
    DigitalWallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cash,
        PaymentMethod::DigitalWallet,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::DigitalWallet => "digital_wallet",
        }
    }

    /// Credit card charges accrue to the next statement; everything else is an immediate debit.
    pub fn is_credit(self) -> bool {
        matches!(self, PaymentMethod::CreditCard)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::DigitalWallet => "Digital Wallet",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseKeyError;

    /// Accepts keys, English labels and their Spanish counterparts.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_lowercase()
            .replace(['-', ' '], "_")
            .replace('é', "e");
        match normalized.as_str() {
            "credit_card" | "credit" | "tarjeta_de_credito" => Ok(PaymentMethod::CreditCard),
            "debit_card" | "debit" | "tarjeta_de_debito" => Ok(PaymentMethod::DebitCard),
            "bank_transfer" | "transfer" | "transferencia_bancaria" | "transferencia" => {
                Ok(PaymentMethod::BankTransfer)
            }
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "digital_wallet" | "wallet" | "billetera_digital" => Ok(PaymentMethod::DigitalWallet),
            _ => Err(ParseKeyError::new(KeyKind::PaymentMethod, value)),
        }
    }
}

/// One spending entry tracked against a card's statement cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub concept: String,
    pub amount: f64,
    pub method: PaymentMethod,
    /// Day of the month the statement closes.
    pub cutoff_day: u32,
    /// Balance reported at the cutoff, compared against the amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64, method: PaymentMethod, cutoff_day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            concept: String::new(),
            amount,
            method,
            cutoff_day,
            balance: None,
        }
    }

    pub fn with_concept(mut self, concept: impl Into<String>) -> Self {
        self.concept = concept.into();
        self
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = Some(balance);
        self
    }
}

/// A dated line of the yearly events budget (birthdays, holidays, renewals).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetEvent {
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    pub name: String,
    pub budget: f64,
}

impl BudgetEvent {
    pub fn new(month: u32, name: impl Into<String>, budget: f64) -> Self {
        Self {
            month,
            day: None,
            name: name.into(),
            budget,
        }
    }

    pub fn on_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }
}
