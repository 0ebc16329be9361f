//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod fuel_record_repo;

pub use fuel_record_repo::FuelRecordRepo;
