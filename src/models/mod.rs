//! Core value types for CIDR arithmetic.
//!
//! This module contains the data structures the operations are defined
//! over:
//! - [`Addr`] - fixed-width IPv4/IPv6 address
//! - [`Prefix`] - network base address with prefix length

mod addr;
mod prefix;

// Re-export public types
pub use addr::Addr;
pub use prefix::{Prefix, MAX_NEW_BITS};
