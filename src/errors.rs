//! Error handling for the fingerprint solver.
//!
//! Every fallible operation in the crate returns a [`FingerprintResult`].
//! Variants are split along the lines callers care about: malformed input,
//! a target that simply has no unique fingerprint, and defects in the
//! vocabulary or solver that should never reach a user.
//!
//! None of these errors are worth retrying. Every operation is a pure
//! function of the loaded corpus, so the same request against the same
//! snapshot fails the same way.

use thiserror::Error;
use std::fmt;

use crate::models::MethodId;

/// Main error type for fingerprint generation and resolution.
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// The extractor was handed a corpus member that is not a method.
    #[error("Unsupported member: {kind} '{id}' is not a method")]
    UnsupportedMember {
        /// Member kind ("field", "class")
        kind: &'static str,
        /// Identifier of the rejected member
        id: String,
    },

    /// A method record is missing data the extractor needs.
    #[error("Malformed method '{id}': {reason}")]
    MalformedMethod {
        /// Identifier of the method (may be empty)
        id: String,
        /// What is missing
        reason: String,
    },

    /// The corpus could not be indexed. No index is published.
    #[error("Index build error: {context}: {reason}")]
    IndexBuild {
        /// Where the build failed
        context: ErrorContext,
        /// Why it failed
        reason: String,
    },

    /// The requested method is not part of the loaded corpus.
    #[error("Unknown method: {0}")]
    UnknownMethod(MethodId),

    /// The target carries no feature that tells it apart from `twins`.
    ///
    /// This is a legitimate outcome, not a fault.
    #[error("No distinguishing feature set for {method}: identical to {} other method(s)", twins.len())]
    NoDistinguishingSet {
        /// The target method
        method: MethodId,
        /// Methods sharing every feature of the target
        twins: Vec<MethodId>,
    },

    /// A feature has no clause in the fingerprint DSL.
    #[error("Render error: {0}")]
    Render(String),

    /// The predicate evaluator rejected a source text.
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// No method in the corpus satisfies the predicate.
    #[error("No method matches the predicate")]
    MatchNotFound,

    /// More than one method satisfies the predicate.
    #[error("Predicate is ambiguous: {} methods match", matches.len())]
    AmbiguousMatch {
        /// Every matching method, in corpus order
        matches: Vec<MethodId>,
    },

    /// A generated fingerprint did not resolve back to its target.
    #[error("Round trip failed for {target}: {reason}")]
    RoundTrip {
        /// Method the fingerprint was generated for
        target: MethodId,
        /// What the resolver returned instead
        reason: String,
    },

    /// A request arrived before any corpus was loaded.
    #[error("No corpus loaded")]
    NoCorpusLoaded,

    /// The caller abandoned the request; any result was discarded.
    #[error("Request cancelled")]
    Cancelled,

    /// The background worker died before delivering a result.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Errors related to file I/O, such as a missing corpus file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FingerprintError {
    /// True when the target is structurally identical to another method.
    ///
    /// Callers show "no unique fingerprint possible" for this case instead
    /// of a failure.
    pub fn is_indistinguishable(&self) -> bool {
        matches!(self, FingerprintError::NoDistinguishingSet { .. })
    }

    /// True for errors that point at a bug in this crate rather than at the
    /// input.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            FingerprintError::Render(_) | FingerprintError::RoundTrip { .. } | FingerprintError::Worker(_)
        )
    }
}

/// Result type alias for the fingerprint solver.
pub type FingerprintResult<T> = Result<T, FingerprintError>;

/// Diagnostic produced by a predicate evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct EvalError {
    /// 1-based line of the offending token
    pub line: usize,
    /// 1-based column of the offending token
    pub column: usize,
    /// Human readable diagnostic
    pub message: String,
}

impl EvalError {
    /// Create a new diagnostic at the given position
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Context information for errors.
///
/// Names the corpus and the component that failed, so that an index build
/// error can be surfaced with the identity of the offending method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Corpus being processed, if known.
    pub corpus_id: Option<String>,

    /// Component where the error occurred (e.g., "feature_index").
    pub component: String,

    /// Operation being performed when the error occurred (e.g., "build").
    pub operation: String,

    /// Additional details, such as the offending method id.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context for a component and operation
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            corpus_id: None,
            component: component.to_string(),
            operation: operation.to_string(),
            details: None,
        }
    }

    /// Attach the corpus identity
    pub fn corpus(mut self, corpus_id: &str) -> Self {
        self.corpus_id = Some(corpus_id.to_string());
        self
    }

    /// Attach free-form details
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "In {} while {}", self.component, self.operation)?;
        if let Some(corpus_id) = &self.corpus_id {
            write!(f, " for corpus {}", corpus_id)?;
        }
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Extension trait for turning a failure into an index build error.
pub trait ErrorExt<T> {
    /// Wrap the error as [`FingerprintError::IndexBuild`] with `context`.
    ///
    /// Errors that already are index build errors pass through unchanged.
    fn with_context(self, context: ErrorContext) -> FingerprintResult<T>;
}

impl<T> ErrorExt<T> for FingerprintResult<T> {
    fn with_context(self, context: ErrorContext) -> FingerprintResult<T> {
        self.map_err(|e| match e {
            e @ FingerprintError::IndexBuild { .. } => e,
            other => FingerprintError::IndexBuild {
                context,
                reason: other.to_string(),
            },
        })
    }
}
