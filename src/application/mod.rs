//! Application layer containing the fine resolution orchestration.
//!
//! This module defines the `ResolutionEngine`, the entry point for issuing
//! fines and resolving driver decisions against the store ports. Updates for
//! one driver are serialized with per-driver async locks.

pub mod engine;
pub mod locks;
