//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of a contract or handler parameter.
///
/// Stands in for host reflection types: the shape of every parameter is
/// declared once at registration time and never introspected per call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Bool,
    Integer,
    Number,
    String,
    /// Base64 or otherwise string-encoded binary payload
    Bytes,
    List(Box<TypeRef>),
    Map(Box<TypeRef>),
    /// Parameter that may be absent or null
    Optional(Box<TypeRef>),
    /// A named object model (e.g. `User`)
    Named(String),
    /// Generic object with no declared structure.
    ///
    /// A body parameter resolving to `Opaque` is decoded structurally,
    /// field by field, against the handler parameters.
    Opaque,
}

impl TypeRef {
    /// Shallow structural check of a wire value against this type.
    ///
    /// Only the outermost layer plus one level of container elements is
    /// inspected; named models accept any JSON object.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Optional(_), Value::Null) => true,
            (Self::Optional(inner), v) => inner.accepts(v),
            (Self::Opaque, _) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Number, Value::Number(_)) => true,
            (Self::String | Self::Bytes, Value::String(_)) => true,
            (Self::List(inner), Value::Array(items)) => items.iter().all(|i| inner.accepts(i)),
            (Self::Map(inner), Value::Object(fields)) => fields.values().all(|v| inner.accepts(v)),
            (Self::Named(_), Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Whether a missing value is acceptable for this type.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Opaque)
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::List(inner) => write!(f, "list<{}>", inner),
            Self::Map(inner) => write!(f, "map<{}>", inner),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
            Self::Named(name) => write!(f, "{}", name),
            Self::Opaque => write!(f, "object"),
        }
    }
}

/// Where a contract parameter lives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Entire request payload
    Body,
    Query,
    Path,
    Header,
    Form,
    Cookie,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Form => "formData",
            Self::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a metric. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Counter,
    Timer,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Timer => write!(f, "timer"),
        }
    }
}

/// Family of derived metric names.
///
/// Each family is a fixed template into which the operation name (or the
/// aggregate key) is substituted, so exporters can group by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    /// Invocations currently waiting in the queue
    CountInQueue,
    /// Time spent waiting in the queue
    LifeTimeInQueue,
    /// Time spent executing after leaving the queue
    ExecutionTime,
    /// Finished invocations
    TotalCount,
    /// Finished invocations that failed
    FailedCount,
}

impl MetricFamily {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::CountInQueue => "queue.count_in_queue",
            Self::LifeTimeInQueue => "queue.life_time_in_queue",
            Self::ExecutionTime => "execution.time",
            Self::TotalCount => "invocation.total",
            Self::FailedCount => "invocation.failed",
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Self::CountInQueue | Self::TotalCount | Self::FailedCount => MetricKind::Counter,
            Self::LifeTimeInQueue | Self::ExecutionTime => MetricKind::Timer,
        }
    }
}

/// Builds metric names for the known families.
///
/// # Examples
/// ```
/// use contract_invoke::domain::value_objects::{MetricFamily, MetricNames};
///
/// let names = MetricNames::default();
/// assert_eq!(
///     names.operation(MetricFamily::CountInQueue, "addUser"),
///     "invocation.addUser.queue.count_in_queue"
/// );
/// assert_eq!(
///     names.aggregate(MetricFamily::CountInQueue),
///     "invocation.instance.queue.count_in_queue"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    prefix: String,
    aggregate_key: String,
}

impl MetricNames {
    pub fn new(prefix: impl Into<String>, aggregate_key: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            aggregate_key: aggregate_key.into(),
        }
    }

    /// Metric name for one operation.
    pub fn operation(&self, family: MetricFamily, operation: &str) -> String {
        format!("{}.{}.{}", self.prefix, operation, family.suffix())
    }

    /// Metric name for the all-operations aggregate.
    pub fn aggregate(&self, family: MetricFamily) -> String {
        self.operation(family, &self.aggregate_key)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn aggregate_key(&self) -> &str {
        &self.aggregate_key
    }
}

impl Default for MetricNames {
    fn default() -> Self {
        Self::new("invocation", "instance")
    }
}
