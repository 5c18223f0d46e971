//! Error types for the IoC container

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning, creating or registering beans
#[derive(Error, Debug)]
pub enum DiError {
    /// A discovered name could not be loaded from the type catalog
    #[error("Type not found: {name}")]
    TypeNotFound { name: String },

    /// Neither an injectable nor a zero-argument constructor is declared
    #[error("No suitable constructor found for type: {type_name}")]
    NoSuitableConstructor { type_name: String },

    /// No registered bean is assignable to a constructor parameter
    #[error("Dependency not found for constructor parameter: {param_type}")]
    UnresolvedParameter {
        type_name: String,
        param_type: &'static str,
    },

    /// No registered bean is assignable to an injectable field
    #[error("Dependency not found for field: {field}")]
    UnresolvedField {
        type_name: String,
        field: &'static str,
    },

    /// The dependency was found but could not be written into the field
    #[error("Failed to inject dependency into field {field}: {reason}")]
    InjectionFailed { field: &'static str, reason: String },

    /// Creating a bean failed; wraps the underlying cause
    #[error("Failed to create bean for type: {type_name}")]
    CreationFailed {
        type_name: String,
        #[source]
        source: Box<DiError>,
    },

    /// A bean with the same name is already registered
    #[error("Bean with name '{name}' already exists")]
    DuplicateBean { name: String },

    /// Walking a source directory failed
    #[error("Failed to scan {path}: {reason}")]
    Scan { path: PathBuf, reason: String },

    /// A load path entry could not be parsed
    #[error("Invalid load path entry: {entry}")]
    InvalidLoadPath { entry: String },

    /// User code panicked while a bean was being created
    #[error("Panicked while creating {type_name}: {message}")]
    Panicked { type_name: String, message: String },

    /// Internal error
    #[error("Internal IoC error: {0}")]
    Internal(String),
}

impl DiError {
    /// Create a TypeNotFound error
    #[inline]
    pub fn type_not_found(name: impl Into<String>) -> Self {
        Self::TypeNotFound { name: name.into() }
    }

    /// Wrap a cause into a CreationFailed error
    #[inline]
    pub fn creation_failed(type_name: impl Into<String>, source: DiError) -> Self {
        Self::CreationFailed {
            type_name: type_name.into(),
            source: Box::new(source),
        }
    }

    /// Create a Scan error from an I/O failure
    #[inline]
    pub fn scan(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Scan {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build a Panicked error from a `catch_unwind` payload
    pub fn panicked(type_name: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked {
            type_name: type_name.into(),
            message,
        }
    }

    /// Render the error and its whole source chain, one cause per line
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            current = cause.source();
        }
        out
    }
}

impl Clone for DiError {
    fn clone(&self) -> Self {
        match self {
            Self::TypeNotFound { name } => Self::TypeNotFound { name: name.clone() },
            Self::NoSuitableConstructor { type_name } => Self::NoSuitableConstructor {
                type_name: type_name.clone(),
            },
            Self::UnresolvedParameter {
                type_name,
                param_type,
            } => Self::UnresolvedParameter {
                type_name: type_name.clone(),
                param_type: *param_type,
            },
            Self::UnresolvedField { type_name, field } => Self::UnresolvedField {
                type_name: type_name.clone(),
                field: *field,
            },
            Self::InjectionFailed { field, reason } => Self::InjectionFailed {
                field: *field,
                reason: reason.clone(),
            },
            Self::CreationFailed { type_name, source } => Self::CreationFailed {
                type_name: type_name.clone(),
                source: source.clone(),
            },
            Self::DuplicateBean { name } => Self::DuplicateBean { name: name.clone() },
            Self::Scan { path, reason } => Self::Scan {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InvalidLoadPath { entry } => Self::InvalidLoadPath {
                entry: entry.clone(),
            },
            Self::Panicked { type_name, message } => Self::Panicked {
                type_name: type_name.clone(),
                message: message.clone(),
            },
            Self::Internal(s) => Self::Internal(s.clone()),
        }
    }
}

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, DiError>;
