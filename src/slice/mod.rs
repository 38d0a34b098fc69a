//! Time-sliced signed networks from coded statements.
//!
//! A moving midpoint advances one time unit at a time across the data range.
//! For each midpoint the builder selects statements (inside the window for
//! compact kernels, all of them for the Gaussian kernel), buckets them by
//! row value × column value × qualifier level, and asks the exporter for a
//! congruence and a conflict matrix:
//!
//! ```text
//! statements ──► midpoints ──► select ──► bucket ──► exporter ──► zero diagonal ──► (normalize)
//! ```
//!
//! Slices are independent and built in parallel under the `parallel`
//! feature.
//!
//! ## Usage
//!
//! ```rust
//! use cleave::slice::{
//!     DataType, DefaultExporter, SliceConfig, Statement, TimeSliceBuilder, TimeUnit,
//! };
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let statements = vec![
//!     Statement::new(1, day(1), "DNA Statement")
//!         .with_value("organization", "Greens")
//!         .with_value("concept", "wind power")
//!         .with_value("agreement", true),
//!     Statement::new(2, day(2), "DNA Statement")
//!         .with_value("organization", "Coal Lobby")
//!         .with_value("concept", "wind power")
//!         .with_value("agreement", false),
//! ];
//! let exporter = DefaultExporter::builder(statements)
//!     .with_data_type("agreement", DataType::Boolean)
//!     .build();
//!
//! let config = SliceConfig::new().with_window(TimeUnit::Days, 4);
//! let networks = TimeSliceBuilder::new(&exporter, config).build().unwrap();
//! assert_eq!(networks.len(), 2);
//! assert_eq!(networks.conflict[0].values()[[0, 1]], 1.0);
//! ```

mod builder;
mod config;
mod exporter;
mod statement;
mod time;

pub use builder::{SliceNetworks, TimeSliceBuilder};
pub use config::SliceConfig;
pub use exporter::{
    DefaultExporter, DefaultExporterBuilder, Duplicates, NetworkExporter, NetworkKind,
    StatementBucket,
};
pub use statement::{DataType, Statement, Value, VariableRef};
pub use time::{Kernel, TimeUnit};
