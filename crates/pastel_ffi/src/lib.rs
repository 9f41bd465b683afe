//! Flutter-facing bindings for the Pastel board core.

pub mod api;
