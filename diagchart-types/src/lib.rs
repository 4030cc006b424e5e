//! # diagchart-types
//!
//! Core types shared by the diagchart pipeline and anything that feeds it.
//! The crate only describes data; grouping, downsampling and rendering live
//! in `diagchart`.
//!
//! ## Design Goals
//!
//! - **Order preserving**: objects keep their key insertion order, so grouping
//!   by a nested map yields keys in the order the producer wrote them
//! - **Optional serialization**: enable the `serde` feature to read records
//!   straight from JSON
//! - **Ergonomic builders**: fluent API for constructing records in tests and
//!   embedding hosts
//!
//! ## Example
//!
//! ```rust
//! use diagchart_types::{GroupKey, Record, Tick, Value};
//!
//! let record = Record::builder()
//!     .field("t", 1_700_000_000_000i64)
//!     .object("attr", |a| a.field("ns", "shop.orders").field("durationMillis", 120))
//!     .build();
//!
//! assert_eq!(record.text("attr.ns"), Some("shop.orders"));
//! assert_eq!(record.number("attr.durationMillis"), Some(120.0));
//! assert_eq!(GroupKey::from("shop.orders").to_string(), "shop.orders");
//! assert_eq!(Tick::Millis(5), Tick::Millis(5));
//! assert!(matches!(record.get("missing"), None | Some(Value::Null)));
//! ```

mod key;
mod record;
mod series;
mod value;

pub use key::*;
pub use record::*;
pub use series::*;
pub use value::*;
