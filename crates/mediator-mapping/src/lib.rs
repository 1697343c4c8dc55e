#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mediator-mapping
//!
//! Field mediation from old-schema records to new-schema records.
//!
//! Mediation is a pure function of the input record and the
//! [`MappingPolicy`]. It never fails and never validates: a record that
//! violates the new schema is produced as-is and rejected later, when it is
//! encoded.
//!
//! | Old field        | New field        | Rule                                  |
//! |------------------|------------------|---------------------------------------|
//! | `oldid`          | `newid`          | copied when present                   |
//! | `oldname`        | `newname`        | copied when present                   |
//! | `olddata`        | `newdata`        | emitted only when `oldvalue` is present |
//! | `oldtime`        | `newtime`        | copied only when `oldvalue` is present |
//! | `oldvalue`       | `newvalue`       | copied, adjusted by [`ValueCase`]     |

pub mod mediator;
pub mod policy;
pub mod transforms;

pub use mediator::Mediator;
pub use policy::{MappingPolicy, ValueCase};

use mediator_ir::{NewRecord, OldRecord};
use thiserror::Error;

/// Errors that can occur when configuring a mapping
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown value case policy '{0}' (expected 'pass-through' or 'lower-case')")]
    UnknownValueCase(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Mediate a record with the default policy
#[must_use]
pub fn mediate(old: &OldRecord) -> NewRecord {
    Mediator::default().mediate(old)
}
