//! Types and traits for recording training metrics.
//!
//! [`Trainer`](crate::Trainer) emits one [`Record`] per finished episode to a
//! [`Recorder`]. Records hold plain numbers and strings, which is all a plotting
//! layer needs to draw learning curves.
//!
//! # Basic Usage
//!
//! ```rust
//! use tabrl_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("steps", RecordValue::Scalar(17.));
//! record.insert("return/0", RecordValue::Scalar(-17.));
//! record.insert("path/0", RecordValue::Array1(vec![0., 1., 2.]));
//! assert_eq!(record.get_scalar("steps").unwrap(), 17.);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
