//! Pure CIDR prefix and address arithmetic.
//!
//! A small set of stateless functions for manipulating IPv4/IPv6 CIDR
//! prefixes and addresses, intended for embedding in a
//! configuration-language evaluator:
//! - [`cidr_host`] - the Nth host address within a prefix
//! - [`cidr_netmask`] - the netmask for a prefix length
//! - [`cidr_subnet`] - carve a subnet out of a larger prefix
//! - [`rdns_host`] - the reverse-DNS lookup name for an address
//!
//! Every operation parses its inputs fresh and returns an owned string,
//! so calls are independent and safe from any thread. Argument binding,
//! numeric coercion, and error surfacing belong to the embedding
//! evaluator, not to this crate.

mod error;
mod funcs;
pub mod models;

pub use error::CidrError;
pub use funcs::{cidr_host, cidr_netmask, cidr_subnet, rdns_host};
pub use models::{Addr, Prefix, MAX_NEW_BITS};
