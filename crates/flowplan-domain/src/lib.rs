//! flowplan-domain
//!
//! Pure planner models (Plan, Item, Category, Recurrence, Cadence, Column,
//! Transaction, BudgetEvent).
//! No I/O, no CLI, no storage. Only data types, core enums and calendar math.

pub mod calendar;
pub mod category;
pub mod column;
pub mod common;
pub mod item;
pub mod plan;
pub mod recurrence;
pub mod statement;

pub use category::*;
pub use column::*;
pub use common::*;
pub use item::*;
pub use plan::*;
pub use recurrence::*;
pub use statement::*;
