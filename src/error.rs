use thiserror::Error;

/// Errors raised while turning a template into a [`crate::Transform`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unexpected character '{ch}' at position {position}")]
    Tokenize { position: usize, ch: char },

    /// `token` is the index of the offending token, not a character offset.
    #[error("syntax error at token {token}: {message}")]
    Syntax { token: usize, message: String },

    #[error("empty expression")]
    EmptyExpression,

    #[error("'@' used outside of a !sortBy, !filter or !map argument")]
    UnboundElement,

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("unknown template tag: {0}")]
    UnknownTag(String),

    #[error("malformed foreach: {0}")]
    MalformedForeach(String),

    #[error("at {path}: {source}")]
    At {
        path: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Attach the template path where the error occurred, keeping the innermost path.
    pub fn at(self, path: &str) -> Self {
        match self {
            CompileError::At { .. } => self,
            other => CompileError::At {
                path: path.to_string(),
                source: Box::new(other),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum JtError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("cannot detect format: no file extension")]
    NoExtension,

    #[error("unknown file extension: .{0}")]
    UnknownExtension(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
