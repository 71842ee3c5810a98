//! Pastoral-care scheduling and daily aggregation core.
//!
//! Tracks birthdays, grief follow-ups, accident/illness follow-ups, and
//! recurring financial-aid disbursements for church members across
//! campuses, and folds them into one per-campus daily dashboard: what is
//! due today, what is overdue within the write-off window, what is coming
//! up this week, and which members are drifting out of contact.
//!
//! This crate is the calculation core only. HTTP routing, authentication,
//! message delivery, exports, and the production datastore are external;
//! the datastore plugs in behind [`store::CareStore`] and the cache behind
//! [`cache::SnapshotCache`]. Wire everything once with
//! [`engine::CareEngine`] and hand that to your handlers.

pub mod cache;
pub mod config;
pub mod dates;
pub mod engagement;
pub mod engine;
pub mod error;
pub mod recurrence;
pub mod services;
pub mod store;
pub mod timeline;
pub mod types;

pub use cache::{MemorySnapshotCache, SnapshotCache};
pub use config::Config;
pub use engine::{CareEngine, NewAidSchedule};
pub use error::{CareError, CareResult};
pub use store::{CareStore, MemoryStore};
pub use types::DashboardSnapshot;
