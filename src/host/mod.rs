//! Reconciler-facing layer: elements, prop diffing, and the host contract.

pub mod config;
pub mod element;
pub mod props;
pub mod reconcile;
