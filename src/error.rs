use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for ltx operations
#[derive(Error, Diagnostic, Debug)]
pub enum LtxError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Spawn(#[from] SpawnError),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(ltx::io))]
    Io { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(ltx::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, LtxError>;

/// Structural errors raised while loading a document. Any of these aborts the load.
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Malformed section header '{header}' [{}:{line}]", .file.display())]
    #[diagnostic(
        code(ltx::parse::header),
        help("Section ids may only contain letters, digits, '_', '@', '.' and '-'")
    )]
    MalformedHeader {
        header: String,
        file: PathBuf,
        line: usize,
    },

    #[error("Duplicate section id ({id}) found [{}:{line}]", .file.display())]
    #[diagnostic(code(ltx::parse::duplicate))]
    DuplicateSection { id: String, file: PathBuf, line: usize },

    #[error("No section with id ({parent}) was found [{}:{line}]", .file.display())]
    #[diagnostic(
        code(ltx::parse::parent),
        help("Parents must be declared before the sections inheriting from them")
    )]
    UnknownParent {
        parent: String,
        file: PathBuf,
        line: usize,
    },

    #[error("No parents specified ({id}) [{}:{line}]", .file.display())]
    #[diagnostic(code(ltx::parse::parent))]
    NoParents { id: String, file: PathBuf, line: usize },

    #[error("Redundant text [{}:{line}]", .file.display())]
    #[diagnostic(
        code(ltx::parse::redundant),
        help("Fields must follow a [section] header")
    )]
    RedundantText { file: PathBuf, line: usize },

    #[error("Block '{field}' opened with <<END is never closed [{}:{line}]", .file.display())]
    #[diagnostic(code(ltx::parse::block), help("Terminate the block with a line containing only END"))]
    UnterminatedBlock {
        field: String,
        file: PathBuf,
        line: usize,
    },

    #[error("#include found at line {line}, but the source file path is unknown")]
    #[diagnostic(code(ltx::parse::include))]
    IncludeWithoutSource { line: usize },

    #[error("#include error: gamedata doesn't have this file (\"{}\")", .path.display())]
    #[diagnostic(code(ltx::parse::include))]
    GamedataIncludeNotFound { path: PathBuf },

    #[error("#include error: file doesn't exist (\"{}\")", .path.display())]
    #[diagnostic(code(ltx::parse::include))]
    IncludeNotFound { path: PathBuf },

    #[error("#include cycle detected: \"{}\" includes itself", .path.display())]
    #[diagnostic(code(ltx::parse::include))]
    IncludeCycle { path: PathBuf },

    #[error("gamedata doesn't have this file (\"{}\")", .path.display())]
    #[diagnostic(code(ltx::parse::gamedata))]
    GamedataFileNotFound { path: PathBuf },

    #[error("File does not exist (\"{}\")", .path.display())]
    #[diagnostic(code(ltx::parse::file))]
    FileNotFound { path: PathBuf },

    #[error("gamedata path is not specified")]
    #[diagnostic(
        code(ltx::parse::gamedata),
        help("Configure gamedata.main in ltx.yaml or pass --gamedata")
    )]
    NoGamedata,

    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(code(ltx::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a field could not be read at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// The field is present as a bare flag.
    NoValue,
    /// The field is not declared in the section.
    NonExistent,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::NoValue => write!(f, "None value"),
            MissingReason::NonExistent => write!(f, "non-existent field"),
        }
    }
}

/// Errors raised by the typed field accessors.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("[{section}]::{field} can't be read as {expected} ({reason})")]
    #[diagnostic(code(ltx::field::missing))]
    Missing {
        section: String,
        field: String,
        expected: &'static str,
        reason: MissingReason,
    },

    #[error("[{section}]::{field} can't be read as {expected}{}", .detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
    #[diagnostic(code(ltx::field::format))]
    InvalidFormat {
        section: String,
        field: String,
        expected: &'static str,
        detail: Option<String>,
    },

    #[error("section [{section}] doesn't exist")]
    #[diagnostic(code(ltx::field::section))]
    UnknownSection { section: String },
}

impl FieldError {
    /// Whether the field was absent or a bare flag (as opposed to malformed).
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldError::Missing { .. })
    }
}

/// Errors raised while building or evaluating a spawn entry.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SpawnError {
    #[error("Invalid syntax: {0}")]
    #[diagnostic(code(ltx::spawn::syntax))]
    Syntax(String),

    #[error("section '{0}' doesn't exist")]
    #[diagnostic(code(ltx::spawn::section))]
    UnknownSection(String),

    #[error("section '{0}' has no 'class' field")]
    #[diagnostic(code(ltx::spawn::class))]
    MissingClass(String),

    #[error("section '{section}' has unexpected class ('{class}')")]
    #[diagnostic(code(ltx::spawn::class), help("Map the class in class_to_type"))]
    UnexpectedClass { section: String, class: String },

    #[error("Invalid {option} value ({value})")]
    #[diagnostic(code(ltx::spawn::range), help("Use a fraction between 0 and 1"))]
    OutOfRange { option: &'static str, value: String },

    #[error("option '{option}' is used with non-{expected} section")]
    #[diagnostic(code(ltx::spawn::option))]
    InapplicableOption {
        option: &'static str,
        expected: &'static str,
    },

    #[error("{addon} is not attachable for this weapon")]
    #[diagnostic(code(ltx::spawn::addon))]
    NotAttachable { addon: &'static str },

    #[error("scope_name is not specified for this weapon")]
    #[diagnostic(code(ltx::spawn::scope))]
    ScopeNameMissing,

    #[error("Scope must not be attached to a base-section weapon")]
    #[diagnostic(code(ltx::spawn::scope))]
    ScopeOnBaseSection,

    #[error("Scope must be attached to a multiscope-section weapon")]
    #[diagnostic(code(ltx::spawn::scope))]
    ScopeRequired,

    #[error("weapon '{0}' has an empty ammo_class list")]
    #[diagnostic(code(ltx::spawn::ammo))]
    NoAmmoClass(String),

    #[error("ammo '{0}' has a zero box_size")]
    #[diagnostic(code(ltx::spawn::ammo))]
    ZeroBoxSize(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Field(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_message() {
        let err = FieldError::Missing {
            section: "wpn_pm".to_string(),
            field: "cost".to_string(),
            expected: "<uint>",
            reason: MissingReason::NonExistent,
        };
        assert_eq!(
            err.to_string(),
            "[wpn_pm]::cost can't be read as <uint> (non-existent field)"
        );
        assert!(err.is_missing());
    }

    #[test]
    fn test_invalid_format_without_detail() {
        let err = FieldError::InvalidFormat {
            section: "wpn_pm".to_string(),
            field: "cost".to_string(),
            expected: "<uint>",
            detail: None,
        };
        assert_eq!(err.to_string(), "[wpn_pm]::cost can't be read as <uint>");
        assert!(!err.is_missing());
    }

    #[test]
    fn test_parse_error_location() {
        let err = ParseError::DuplicateSection {
            id: "a".to_string(),
            file: PathBuf::from("system.ltx"),
            line: 12,
        };
        assert_eq!(err.to_string(), "Duplicate section id (a) found [system.ltx:12]");
    }

    #[test]
    fn test_wrapped_into_ltx_error() {
        let err: LtxError = SpawnError::ScopeRequired.into();
        assert!(matches!(err, LtxError::Spawn(SpawnError::ScopeRequired)));
    }
}
