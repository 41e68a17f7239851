use thiserror::Error;

use crate::types::FieldKind;

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("unknown sample \"{0}\"")]
    UnknownSample(String),

    #[error("unknown {kind} field \"{id}\"")]
    UnknownField { kind: FieldKind, id: String },

    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),

    #[error("field {0} is read-only")]
    ReadOnlyField(String),

    #[error("invalid value {value} for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("running version {running} does not satisfy minimum version {required}")]
    IncompatibleVersion { running: String, required: String },

    /// A field with this ID is already declared with a different Type or Number.
    #[error("a {kind} field {id} which is incompatible is already present in the header")]
    IncompatibleDeclaration { kind: FieldKind, id: String },

    #[error("malformed header declaration: {0}")]
    MalformedDeclaration(String),

    #[error("malformed version string \"{0}\"")]
    MalformedVersion(String),

    #[error("duplicate sample name \"{0}\" in header")]
    DuplicateSample(String),

    #[error("no record is currently bound")]
    NoRecordBound,

    #[error("record has {record} sample columns but the header declares {header}")]
    SampleCountMismatch { header: usize, record: usize },
}

impl BindError {
    pub(crate) fn invalid<F: ToString, V: ToString, R: ToString>(
        field: F,
        value: V,
        reason: R,
    ) -> Self {
        BindError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
