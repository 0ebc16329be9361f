//! Primitive type aliases shared across the workspace.

/// Database primary keys are PostgreSQL BIGSERIAL values.
pub type DbId = i64;

/// Every timestamp handled by this system is UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
