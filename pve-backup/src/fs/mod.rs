//! Filesystem helpers for archive building.

pub mod paths;
