use thiserror::Error;

/// Classifies mapping errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingErrorKind {
    /// Source address missing or not an IP literal
    SourceAddress,
    /// Destination address missing or not an IP literal
    DestinationAddress,
    /// Source port is not a base-10 port number
    SourcePort,
    /// Destination port is not a base-10 port number
    DestinationPort,
    /// Mapping file could not be read or included
    File,
}

/// Mapping engine error types
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("unable to parse source address")]
    InvalidSourceAddress,

    #[error("unable to parse destination address")]
    InvalidDestinationAddress,

    #[error("unable to parse source port")]
    InvalidSourcePort,

    #[error("unable to parse destination port")]
    InvalidDestinationPort,

    #[error("failed to parse mapping {spec}: {source}")]
    InvalidMapping {
        spec: String,
        #[source]
        source: Box<MappingError>,
    },

    #[error("Parse error at line {line}: {source}")]
    ParseErrorAtLine {
        line: usize,
        #[source]
        source: Box<MappingError>,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MappingError {
    /// Wrap a field-level error with the specification text that produced it.
    pub(crate) fn in_spec(self, spec: &str) -> Self {
        MappingError::InvalidMapping {
            spec: spec.to_string(),
            source: Box::new(self),
        }
    }

    /// Attach the 1-based line number of a mapping file.
    pub(crate) fn at_line(self, line: usize) -> Self {
        MappingError::ParseErrorAtLine {
            line,
            source: Box::new(self),
        }
    }

    /// The underlying failure class, looking through `InvalidMapping` wrappers.
    pub fn kind(&self) -> MappingErrorKind {
        match self {
            MappingError::InvalidSourceAddress => MappingErrorKind::SourceAddress,
            MappingError::InvalidDestinationAddress => MappingErrorKind::DestinationAddress,
            MappingError::InvalidSourcePort => MappingErrorKind::SourcePort,
            MappingError::InvalidDestinationPort => MappingErrorKind::DestinationPort,
            MappingError::InvalidMapping { source, .. }
            | MappingError::ParseErrorAtLine { source, .. } => source.kind(),
            MappingError::ParseError(_) | MappingError::IoError(_) => MappingErrorKind::File,
        }
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
