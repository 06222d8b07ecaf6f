//! Error types for cluster configuration validation
//!
//! Each rule violation is one [`Error`] variant carrying the field path of the
//! offending value. A validation pass never stops at the first problem: it
//! collects failures in an [`ErrorList`] and returns them together as
//! [`Error::Aggregate`], so tooling can report every defect in one run.

use std::fmt;

use thiserror::Error;

/// Fieldless discriminant of [`Error`], for matching without destructuring
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A subnet entry is not valid network/prefix notation
    InvalidSubnet,
    /// A port lies outside 1-65535
    PortOutOfRange,
    /// The IP family is not ipv4, ipv6 or dual
    UnknownIpFamily,
    /// A node role is not control-plane or worker
    UnknownRole,
    /// No node carries the control-plane role
    MissingControlPlane,
    /// A subnet list has the wrong number of entries for the IP family
    SubnetCountMismatch,
    /// Subnet address families disagree with the IP family or each other
    SubnetFamilyMismatch,
    /// A node has no image
    EmptyImage,
    /// Several failures bundled together
    Aggregate,
    /// The configuration document could not be read or parsed
    Document,
}

/// Configuration error
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Subnet entry failed to parse as CIDR notation
    #[error("{field}: invalid subnet {value:?}: {reason}")]
    InvalidSubnet {
        /// Field path of the entry (e.g. "networking.podSubnet[0]")
        field: String,
        /// The rejected value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Port outside the valid 1-65535 range
    #[error("{field}: port {port} is out of range (1-65535)")]
    PortOutOfRange {
        /// Field path of the port
        field: String,
        /// The rejected value
        port: i32,
    },

    /// IP family is not one of the supported values
    #[error("{field}: unknown IP family {value:?} (expected ipv4, ipv6 or dual)")]
    UnknownIpFamily {
        /// Field path of the family
        field: String,
        /// The rejected value
        value: String,
    },

    /// Node role is not one of the supported values
    #[error("{field}: unknown role {value:?} (expected control-plane or worker)")]
    UnknownRole {
        /// Field path of the role
        field: String,
        /// The rejected value
        value: String,
    },

    /// No control-plane node in the cluster
    #[error("nodes: at least one control-plane node is required")]
    MissingControlPlane,

    /// Subnet list length does not fit the IP family
    #[error("{field}: {family} networking requires {expected} subnet(s), got {actual}")]
    SubnetCountMismatch {
        /// Field path of the list
        field: String,
        /// The declared IP family
        family: String,
        /// Entries required by the family
        expected: usize,
        /// Entries present
        actual: usize,
    },

    /// Subnet address family conflicts with the IP family or the paired list
    #[error("{field}: {message}")]
    SubnetFamilyMismatch {
        /// Field path of the list or entry
        field: String,
        /// Description of the conflict
        message: String,
    },

    /// Node image reference is empty
    #[error("{field}: image cannot be empty")]
    EmptyImage {
        /// Field path of the image
        field: String,
    },

    /// Zero or more failures from one validation pass
    #[error("{0}")]
    Aggregate(Aggregate),

    /// Document read or parse failure
    #[error("invalid configuration document: {message}")]
    Document {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create an invalid subnet error
    pub fn invalid_subnet(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSubnet {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a port range error
    pub fn port_out_of_range(field: impl Into<String>, port: i32) -> Self {
        Self::PortOutOfRange {
            field: field.into(),
            port,
        }
    }

    /// Create an unknown IP family error
    pub fn unknown_ip_family(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownIpFamily {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an unknown role error
    pub fn unknown_role(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownRole {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a subnet count error
    pub fn subnet_count_mismatch(
        field: impl Into<String>,
        family: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::SubnetCountMismatch {
            field: field.into(),
            family: family.into(),
            expected,
            actual,
        }
    }

    /// Create a subnet family error
    pub fn subnet_family_mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubnetFamilyMismatch {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an empty image error
    pub fn empty_image(field: impl Into<String>) -> Self {
        Self::EmptyImage {
            field: field.into(),
        }
    }

    /// Create a document error
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// The fieldless kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSubnet { .. } => ErrorKind::InvalidSubnet,
            Self::PortOutOfRange { .. } => ErrorKind::PortOutOfRange,
            Self::UnknownIpFamily { .. } => ErrorKind::UnknownIpFamily,
            Self::UnknownRole { .. } => ErrorKind::UnknownRole,
            Self::MissingControlPlane => ErrorKind::MissingControlPlane,
            Self::SubnetCountMismatch { .. } => ErrorKind::SubnetCountMismatch,
            Self::SubnetFamilyMismatch { .. } => ErrorKind::SubnetFamilyMismatch,
            Self::EmptyImage { .. } => ErrorKind::EmptyImage,
            Self::Aggregate(_) => ErrorKind::Aggregate,
            Self::Document { .. } => ErrorKind::Document,
        }
    }

    /// Field path of the offending value, if the error has one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidSubnet { field, .. }
            | Self::PortOutOfRange { field, .. }
            | Self::UnknownIpFamily { field, .. }
            | Self::UnknownRole { field, .. }
            | Self::SubnetCountMismatch { field, .. }
            | Self::SubnetFamilyMismatch { field, .. }
            | Self::EmptyImage { field } => Some(field),
            Self::MissingControlPlane | Self::Aggregate(_) | Self::Document { .. } => None,
        }
    }

    /// Unwrap to the ordered list of underlying failures
    ///
    /// An aggregate yields its members in detection order; any other error
    /// is treated as a one-element list.
    pub fn errors(&self) -> &[Error] {
        match self {
            Self::Aggregate(aggregate) => aggregate.errors(),
            other => std::slice::from_ref(other),
        }
    }

    /// Owned variant of [`Error::errors`]
    pub fn into_errors(self) -> Vec<Error> {
        match self {
            Self::Aggregate(aggregate) => aggregate.0,
            other => vec![other],
        }
    }

    /// Kinds of every underlying failure, in detection order
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors().iter().map(Error::kind).collect()
    }

    /// Re-root the field path under `prefix` (e.g. "nodes[1]")
    ///
    /// Applied to every member of an aggregate.
    pub fn with_field_prefix(self, prefix: &str) -> Self {
        let rooted = |field: String| format!("{}.{}", prefix, field);
        match self {
            Self::InvalidSubnet {
                field,
                value,
                reason,
            } => Self::InvalidSubnet {
                field: rooted(field),
                value,
                reason,
            },
            Self::PortOutOfRange { field, port } => Self::PortOutOfRange {
                field: rooted(field),
                port,
            },
            Self::UnknownIpFamily { field, value } => Self::UnknownIpFamily {
                field: rooted(field),
                value,
            },
            Self::UnknownRole { field, value } => Self::UnknownRole {
                field: rooted(field),
                value,
            },
            Self::SubnetCountMismatch {
                field,
                family,
                expected,
                actual,
            } => Self::SubnetCountMismatch {
                field: rooted(field),
                family,
                expected,
                actual,
            },
            Self::SubnetFamilyMismatch { field, message } => Self::SubnetFamilyMismatch {
                field: rooted(field),
                message,
            },
            Self::EmptyImage { field } => Self::EmptyImage {
                field: rooted(field),
            },
            Self::Aggregate(aggregate) => Self::Aggregate(Aggregate(
                aggregate
                    .0
                    .into_iter()
                    .map(|e| e.with_field_prefix(prefix))
                    .collect(),
            )),
            other @ (Self::MissingControlPlane | Self::Document { .. }) => other,
        }
    }
}

/// Ordered failures from a single validation pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregate(Vec<Error>);

impl Aggregate {
    /// Failures in detection order
    pub fn errors(&self) -> &[Error] {
        &self.0
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no errors"),
            [only] => write!(f, "{}", only),
            many => {
                write!(f, "{} errors: [", many.len())?;
                for (i, err) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Accumulates failures without short-circuiting
///
/// Rules push into the list as they run; only the top-level `validate`
/// calls [`ErrorList::finish`] to turn it into a result.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<Error>,
}

impl ErrorList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; aggregates are flattened so order is preserved
    pub fn push(&mut self, err: Error) {
        match err {
            Error::Aggregate(aggregate) => self.errors.extend(aggregate.0),
            other => self.errors.push(other),
        }
    }

    /// Record the error of a failed result, passing the value through otherwise
    pub fn absorb<T>(&mut self, result: crate::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err);
                None
            }
        }
    }

    /// True when no failure was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when empty, otherwise every failure as one aggregate
    pub fn finish(self) -> crate::Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(Aggregate(self.errors)))
        }
    }
}
