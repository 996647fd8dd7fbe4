//! Pure transforms applied to raw store values before they reach entity reports.

pub mod merge;
