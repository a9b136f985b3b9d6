//! Protocol-level constants
//!
//! Default ports, scheme tokens, SRV service names and SASL mechanism names.
//! Framing and encoding of the binary protocol belong to the network engine.

pub mod constants;
