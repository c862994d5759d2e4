//! Types shared with the maintenance trigger and status surfaces.

pub mod v1;
