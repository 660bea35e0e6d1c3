//! Common error infrastructure for battle-core.
//!
//! Every failure the engine can report is a content-authoring or host data
//! integrity bug. Nothing here is retried: errors are surfaced to the
//! integrator as soon as they occur.
//!
//! # Taxonomy
//!
//! - **Evaluation**: a designer formula referenced an unknown binding, field
//!   or method, or produced an invalid operation
//! - **Parse**: a formula body is outside the supported grammar
//! - **MissingSource**: a class/actor/enemy/state/skill/item lookup failed
//! - **InvalidLiteral**: a numeric tag carries a non-numeric literal
//! - **InvalidConfig**: an engine configuration formula does not compile
//!
//! Unterminated code blocks are tolerated by the tag extractor, and
//! conflicting variance tags are settled by the configured ruling, so neither
//! appears here.

use crate::data::SourceRef;
use crate::formula::{EvalError, ParseError};

/// Severity level of an error, used for categorization and logging.
///
/// - **Validation**: Invalid designer input that should be fixed in the data
/// - **Internal**: Host data inconsistency (e.g. a dangling class id)
/// - **Fatal**: The engine cannot produce an answer for this query at all
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    ///
    /// Examples: `<piercing:abc>`
    Validation,

    /// Unexpected inconsistency in host-provided data.
    ///
    /// Examples: battler references a state id the database does not know
    Internal,

    /// Formula could not be compiled or evaluated.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates a host-side bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by who has to fix it, not by impact
pub trait RuleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the source whose data triggered the error, if known.
    fn source_ref(&self) -> Option<SourceRef> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors produced while resolving a query.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A formula tag failed while running against the query bindings.
    #[error("formula <{tag}> on {origin} failed: {error}")]
    Evaluation {
        origin: SourceRef,
        tag: String,
        error: EvalError,
    },

    /// A formula tag could not be parsed.
    #[error("formula <{tag}> on {origin} does not parse: {error}")]
    Parse {
        origin: SourceRef,
        tag: String,
        error: ParseError,
    },

    /// A database lookup failed.
    #[error("{0} not found in database")]
    MissingSource(SourceRef),

    /// A tag expected to hold a number holds something else.
    #[error("tag <{tag}:{value}> on {origin} is not a number")]
    InvalidLiteral {
        origin: SourceRef,
        tag: String,
        value: String,
    },

    /// Engine configuration is unusable.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

impl RuleError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        use EngineError::*;
        match self {
            Evaluation { .. } | Parse { .. } | InvalidConfig(_) => ErrorSeverity::Fatal,
            MissingSource(_) => ErrorSeverity::Internal,
            InvalidLiteral { .. } => ErrorSeverity::Validation,
        }
    }

    fn source_ref(&self) -> Option<SourceRef> {
        use EngineError::*;
        match self {
            Evaluation { origin, .. } | Parse { origin, .. } | InvalidLiteral { origin, .. } => {
                Some(*origin)
            }
            MissingSource(origin) => Some(*origin),
            InvalidConfig(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        use EngineError::*;
        match self {
            Evaluation { .. } => "ENGINE_EVALUATION_FAILED",
            Parse { .. } => "ENGINE_PARSE_FAILED",
            MissingSource(_) => "ENGINE_MISSING_SOURCE",
            InvalidLiteral { .. } => "ENGINE_INVALID_LITERAL",
            InvalidConfig(_) => "ENGINE_INVALID_CONFIG",
        }
    }
}

pub type Result<T> = core::result::Result<T, EngineError>;
