//! Route synchronisation for the Kindling node network daemon
//!
//! Each node learns its peers' addresses and pod CIDRs and installs a host
//! route per CIDR via the peer. The kernel side sits behind [`RouteTable`].

#![deny(missing_docs)]

pub mod error;
pub mod routes;

pub use error::Error;
pub use routes::{is_global_unicast, sync_routes, MemoryRouteTable, Route, RouteTable};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
