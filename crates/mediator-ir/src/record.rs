//! Typed records for the two document shapes
//!
//! Every field is optional here. The old schema allows all of them to be
//! absent; the new schema requires `id` and `data.value`, but enforcing that
//! is the job of validation at encode time, so a record that would violate
//! the new schema can still be built and handed to the encoder.

use crate::timestamp::Timestamp;

/// Top-level record of the old schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OldRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub data: Option<OldDetail>,
}

/// Nested detail of the old schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OldDetail {
    pub time: Option<Timestamp>,
    pub value: Option<String>,
}

/// Top-level record of the new schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub data: Option<NewDetail>,
}

/// Nested detail of the new schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDetail {
    pub time: Option<Timestamp>,
    pub value: Option<String>,
}
