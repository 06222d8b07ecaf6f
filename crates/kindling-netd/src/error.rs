//! Error types for route synchronisation

use thiserror::Error;

/// Route synchronisation error
#[derive(Debug, Error)]
pub enum Error {
    /// A pod CIDR handed to the daemon did not parse
    #[error("invalid pod CIDR {cidr:?}: {reason}")]
    InvalidPodCidr {
        /// The rejected value
        cidr: String,
        /// Parser message
        reason: String,
    },

    /// The routing table backend failed
    #[error("route table error: {message}")]
    RouteTable {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a route table error
    pub fn route_table(msg: impl Into<String>) -> Self {
        Self::RouteTable {
            message: msg.into(),
        }
    }
}
