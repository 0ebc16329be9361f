//! Domain logic for the fuelmark labeling service.
//!
//! Pure types and functions shared by the DB and API layers: the label
//! result vocabulary and group status derivation, ingestion datetime
//! normalization, the operator-side labeling session state machine, and
//! the group navigation cursor. Nothing in this crate performs I/O.

pub mod cursor;
pub mod error;
pub mod labeling;
pub mod session;
pub mod timeparse;
pub mod types;
