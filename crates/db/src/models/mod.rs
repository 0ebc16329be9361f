//! Domain model structs and DTOs.
//!
//! `fuel_record` holds the persisted entity plus its insert/update DTOs
//! and the flat-level listing filter; `group` holds the derived review
//! group assembled by the grouping engine.

pub mod fuel_record;
pub mod group;
