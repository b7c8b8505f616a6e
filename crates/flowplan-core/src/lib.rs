//! flowplan-core
//!
//! Projection engine and planning services for flowplan.
//! Depends on flowplan-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod activity;
pub mod aggregation;
pub mod error;
pub mod occurrence;
pub mod planner;
pub mod projection;
pub mod statement;
pub mod storage;
pub mod time;
pub mod timeline;

pub use activity::*;
pub use aggregation::*;
pub use error::CoreError;
pub use occurrence::*;
pub use planner::*;
pub use projection::*;
pub use statement::*;
pub use storage::*;
pub use time::*;
pub use timeline::*;
