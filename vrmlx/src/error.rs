//! Error types used throughout the conversion pipeline
//!
//! Every stage has its own error enum.  Wrapping variants hold their cause as a
//! boxed [`source`](std::error::Error::source), so a failure deep inside the
//! scene tree can be reported as a chain with [`chain`], or reduced to its root
//! cause with [`innermost`].
use crate::parser::FieldKind;
use thiserror::Error;

/// Universal error type for `vrmlx`
#[derive(Error, Debug)]
pub enum Error {
    /// IO error; see inner code for details
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error; see inner code for details
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The document could not be parsed
    #[error("could not parse document")]
    ParseError(#[from] ParseError),

    /// The scene tree could not be traversed
    #[error("could not convert scene")]
    TraversalError(#[from] TraversalError),

    /// The thread pool could not be built
    #[error("could not build thread pool: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    /// The configuration is not usable
    #[error("invalid configuration: {0}")]
    BadConfig(String),
}

/// Errors produced by the grammar
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input is not valid UTF-8
    #[error("input is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// The grammar did not consume the entire input
    #[error("failed to parse VRML document:\n{0}")]
    Syntax(String),
}

/// Errors produced while validating a node against its descriptor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The header does not belong to the descriptor
    #[error("expected header <{expected}> (or a synonym), found <{found}>")]
    InvalidHeader {
        /// Canonical name of the descriptor
        expected: String,
        /// Header found in the document
        found: String,
    },

    /// The node contains a field which is not declared by its descriptor
    #[error("node <{node}> has no field <{field}>")]
    InvalidFieldName {
        /// Header of the node
        node: String,
        /// Name of the offending field
        field: String,
    },

    /// A field name occurs more than once
    #[error("field <{field}> is declared more than once in node <{node}>")]
    DuplicatedFieldName {
        /// Header of the node
        node: String,
        /// Name of the offending field
        field: String,
    },

    /// The value of a field has the wrong type
    #[error("field <{field}> expected {expected:?}, found {found:?}")]
    InvalidFieldValueType {
        /// Name of the offending field
        field: String,
        /// Kind declared by the descriptor
        expected: FieldKind,
        /// Kind found in the document
        found: FieldKind,
    },

    /// A node-typed field refers to a node with a disallowed header
    #[error("field <{field}> does not accept node <{header}> (allowed: {allowed})")]
    InvalidVrmlNodeForGivenField {
        /// Name of the offending field
        field: String,
        /// Header of the referenced node
        header: String,
        /// Comma-separated list of allowed headers
        allowed: String,
    },

    /// `USE` refers to a name which was never `DEF`'d
    #[error("field <{field}> uses <{alias}>, which is never declared with `DEF`")]
    MissingDefNodeForUseNode {
        /// Name of the offending field
        field: String,
        /// Alias which could not be resolved
        alias: String,
    },

    /// A string field holds a value outside of its enumeration
    #[error("field <{field}> has value {value:?} (allowed: {allowed})")]
    InvalidStringValue {
        /// Name of the offending field
        field: String,
        /// Value found in the document
        value: String,
        /// Comma-separated list of allowed values
        allowed: String,
    },
}

/// Errors produced while walking the scene tree
#[derive(Error, Debug)]
pub enum TraversalError {
    /// Failure inside a node, with the node's header for context
    #[error("error in node <{header}>")]
    NodeTraversal {
        /// Header of the node that failed
        header: String,
        /// Underlying failure
        #[source]
        source: Box<TraversalError>,
    },

    /// Failure at the top level of a file
    #[error("error in root node #{index}")]
    FileTraversal {
        /// Position of the root node within the document
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<TraversalError>,
    },

    /// A node is reached again, through `USE`, from inside itself
    #[error("node <{alias}> is used inside of itself")]
    CyclicUseNode {
        /// `DEF` name of the node
        alias: String,
    },

    /// The header has no descriptor and unknown nodes are not ignored
    #[error("unknown node <{0}>")]
    UnknownVrmlNode(String),

    /// Validation failure; see inner error for details
    #[error("node failed validation")]
    Validation(#[from] ValidationError),

    /// An action failed while pulling data out of a helper node
    #[error("action for node <{node}> could not read field <{field}>")]
    Action {
        /// Canonical name of the node
        node: String,
        /// Field holding the helper node
        field: String,
        /// Underlying failure
        #[source]
        source: Box<TraversalError>,
    },
}

impl TraversalError {
    /// Wraps an error with the header of the node that produced it
    pub fn in_node(header: &str, source: TraversalError) -> Self {
        TraversalError::NodeTraversal {
            header: header.to_owned(),
            source: Box::new(source),
        }
    }
}

/// Errors produced by geometry calculators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    /// Failure inside the box calculator
    #[error("box calculation failed")]
    BoxCalculator(#[source] Box<CalculatorError>),

    /// Failure inside the general indexed face set calculator
    #[error("indexed face set calculation failed")]
    IndexedFaceSetCalculator(#[source] Box<CalculatorError>),

    /// Failure inside the triangular-only indexed face set calculator
    #[error("triangular indexed face set calculation failed")]
    IndexedTriangularFaceSetCalculator(#[source] Box<CalculatorError>),

    /// Failure inside the indexed line set calculator
    #[error("indexed line set calculation failed")]
    IndexedLineSetCalculator(#[source] Box<CalculatorError>),

    /// The calculator's inputs are not valid
    #[error("invalid calculator input")]
    PropertiesError(#[source] Box<CalculatorError>),

    /// A face refers to a coordinate that does not exist
    #[error("vertex index is outside of the coordinate array")]
    VertexIndexOutOfRange(#[source] Box<CalculatorError>),

    /// A face has fewer than three coordinates
    #[error("a face needs at least 3 coordinates, but has {0}")]
    InvalidNumberOfCoordinatesForFace(usize),

    /// The calculator cannot handle this input
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A required array is empty
    #[error("array <{0}> is empty")]
    EmptyArray(&'static str),

    /// A number is outside of its allowed range
    #[error("value {value} is outside of [{min}, {max}]")]
    NumberOutOfRange {
        /// Value that was checked
        value: i64,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },

    /// A value that must be strictly positive is not
    #[error("<{field}> must be positive, but is {value}")]
    NonPositiveValue {
        /// Name of the offending value
        field: &'static str,
        /// Value found
        value: f32,
    },

    /// Index data is not laid out as `a, b, c, -1` quadruples
    #[error("expected sentinel -1 at index {position}, found {found}")]
    InvalidTriangularLayout {
        /// Position in the index array where a sentinel was expected
        position: usize,
        /// Value found at that position
        found: i32,
    },
}

impl CalculatorError {
    /// Returns the wrapped cause, if any
    fn inner(&self) -> Option<&CalculatorError> {
        match self {
            CalculatorError::BoxCalculator(e)
            | CalculatorError::IndexedFaceSetCalculator(e)
            | CalculatorError::IndexedTriangularFaceSetCalculator(e)
            | CalculatorError::IndexedLineSetCalculator(e)
            | CalculatorError::PropertiesError(e)
            | CalculatorError::VertexIndexOutOfRange(e) => Some(e),
            _ => None,
        }
    }

    /// Iterates over this error and each of its causes, outermost first
    pub fn iter(&self) -> impl Iterator<Item = &CalculatorError> {
        std::iter::successors(Some(self), |e| e.inner())
    }

    /// Returns the root cause of this error
    pub fn innermost(&self) -> &CalculatorError {
        let mut out = self;
        while let Some(e) = out.inner() {
            out = e;
        }
        out
    }

    /// Checks whether any error in the chain matches the given predicate
    pub fn contains(&self, f: impl Fn(&CalculatorError) -> bool) -> bool {
        self.iter().any(f)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Formats an error and all of its causes
///
/// Each cause is printed on its own line, indented by two more spaces than the
/// error that wraps it.
pub fn chain(err: &dyn std::error::Error) -> String {
    let mut out = String::new();
    let mut next = Some(err);
    let mut level = 0;
    while let Some(e) = next {
        if level > 0 {
            out.push('\n');
        }
        out.push_str(&" ".repeat(2 * level));
        out.push_str(e.to_string().trim_end());
        next = e.source();
        level += 1;
    }
    out
}

/// Returns the root cause of an error chain
pub fn innermost<'a>(
    err: &'a (dyn std::error::Error + 'static),
) -> &'a (dyn std::error::Error + 'static) {
    let mut out = err;
    while let Some(e) = out.source() {
        out = e;
    }
    out
}
