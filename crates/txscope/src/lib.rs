//! Top-level facade crate for txscope.
//!
//! Re-exports the metric registry and the gateway library so users can depend on a single crate.

pub mod core {
    pub use txscope_core::*;
}

pub mod gateway {
    pub use txscope_gateway::*;
}
