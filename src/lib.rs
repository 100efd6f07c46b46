//! Time-ordered in-memory dive log with crash-safe JSON persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::log::DiveLog`]:
//! ```
//! use chrono::NaiveDateTime;
//! use divelog::{core::log::DiveLog, dive::Dive, types::DATE_TIME_LAYOUT};
//!
//! let at = |s: &str| NaiveDateTime::parse_from_str(s, DATE_TIME_LAYOUT).expect("time");
//!
//! let mut log = DiveLog::new();
//! log.insert(Dive::new(at("2023-04-03T10:30"))).expect("insert");
//! log.insert(Dive::new(at("2023-04-04T10:00"))).expect("insert");
//! log.insert(Dive::new(at("2023-04-03T13:05"))).expect("insert");
//!
//! let nums: Vec<_> = log.all().iter().map(|d| (d.id().to_string(), d.num())).collect();
//! assert_eq!(nums[1], ("20230403T1305".to_string(), Some(2)));
//! assert!(log.is_renumbered());
//! assert!(!log.is_renumbered());
//! ```
//!
//! Runtime usage with the JSON file store:
//! ```no_run
//! use divelog::{
//!     persist::json::StoreConfig,
//!     runtime::handle::{open, RuntimeConfig},
//!     validate::DiveForm,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cfg = RuntimeConfig {
//!     store: StoreConfig { data_dir: "data".into(), ..StoreConfig::default() },
//!     ..RuntimeConfig::default()
//! };
//! let handle = open(cfg).expect("load dive log");
//! let dive = DiveForm {
//!     date: "2024-02-01".to_string(),
//!     time_in: "09:15".to_string(),
//!     site: "Ada Ciganlija, Beograd".to_string(),
//!     duration_min: "45".to_string(),
//!     ..DiveForm::default()
//! }
//! .build()
//! .expect("valid form");
//! handle.insert(dive).expect("insert");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

#![deny(missing_docs)]

/// In-memory dive index, shared handle, and queries.
pub mod core;
/// In-memory dive model.
pub mod dive;
/// Compact human duration codec.
pub mod duration;
/// Persistence abstraction and JSON file implementation.
pub mod persist;
/// Serializable dive record.
pub mod record;
/// Persistence worker, events, and the owning log handle.
pub mod runtime;
/// Shared primitive types and constants.
pub mod types;
/// Client-facing input validators.
pub mod validate;
