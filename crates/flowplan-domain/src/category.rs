//! The closed set of cash-flow categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::{KeyKind, ParseKeyError};

/// Section an item belongs to; decides its sign in the balance formula.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "ingresos")]
    Income,
    #[serde(alias = "tarjeta")]
    CreditCard,
    #[serde(alias = "gastos")]
    Expense,
    #[serde(alias = "cuenta")]
    DebitAccount,
    Cash,
}

impl Category {
    /// Every category, in balance-formula order.
    pub const ALL: [Category; 5] = [
        Category::Income,
        Category::CreditCard,
        Category::Expense,
        Category::DebitAccount,
        Category::Cash,
    ];

    /// `+1.0` for categories that add to the balance, `-1.0` for those that subtract.
    pub fn sign(self) -> f64 {
        match self {
            Category::Income | Category::DebitAccount | Category::Cash => 1.0,
            Category::CreditCard | Category::Expense => -1.0,
        }
    }

    pub fn is_inflow(self) -> bool {
        matches!(self, Category::Income)
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::CreditCard => "credit_card",
            Category::Expense => "expense",
            Category::DebitAccount => "debit_account",
            Category::Cash => "cash",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Income => "Income",
            Category::CreditCard => "Credit Card",
            Category::Expense => "Expenses",
            Category::DebitAccount => "Debit Account",
            Category::Cash => "Cash",
        };
        f.write_str(label)
    }
}

impl FromStr for Category {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "income" | "ingresos" => Ok(Category::Income),
            "credit_card" | "card" | "tarjeta" => Ok(Category::CreditCard),
            "expense" | "expenses" | "gastos" => Ok(Category::Expense),
            "debit_account" | "debit" | "cuenta" => Ok(Category::DebitAccount),
            "cash" => Ok(Category::Cash),
            _ => Err(ParseKeyError::new(KeyKind::Category, value)),
        }
    }
}
