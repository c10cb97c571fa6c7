//! Adapters implementing the ports against concrete systems.

pub mod outbound;
