use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    Declaration,
    Type,
}

/// A language-level error. These are collected, never raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// `None` for whole-program checks such as the missing `main`
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn unlocated(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            message: message.into(),
        }
    }

    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Syntax, line, message)
    }

    pub fn declaration(line: usize, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Declaration, line, message)
    }

    pub fn type_error(line: usize, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Type, line, message)
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::Syntax => write!(f, "Syntax"),
            DiagnosticKind::Declaration => write!(f, "Declaration"),
            DiagnosticKind::Type => write!(f, "Type"),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} error at line {}: {}", self.kind, line, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}
