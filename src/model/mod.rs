//! Runtime data model for tournament snapshots fetched from the dashboard API.

/// Tournament event snapshot types mirroring the remote resource's JSON.
pub mod event;
