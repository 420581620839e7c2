use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

/// Broad class of a data or configuration problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCategory {
    /// A stored altar definition could not be fully interpreted.
    AltarData,
    /// A configuration value could not be interpreted.
    Configuration,
}

impl ErrorCategory {
    /// Label shown to operators.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AltarData => "Altar Data Error",
            Self::Configuration => "Configuration Error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    category: ErrorCategory,
}

impl Diagnostic {
    /// Creates a diagnostic in the provided category.
    #[must_use]
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            category,
        }
    }

    /// Shorthand for an [`ErrorCategory::AltarData`] diagnostic.
    #[must_use]
    pub fn altar_data(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCategory::AltarData)
    }

    /// Shorthand for an [`ErrorCategory::Configuration`] diagnostic.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCategory::Configuration)
    }

    /// Human readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Class of the problem.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.category
    }
}

/// Ledger of data and configuration problems since the last reload.
///
/// Each distinct message is logged once; repeats only refresh the set of
/// categories operators are told about.
#[derive(Debug, Default)]
pub struct Diagnostics {
    seen: HashSet<String>,
    categories: BTreeSet<ErrorCategory>,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem, returning `true` when its message was new.
    pub fn record(&mut self, diagnostic: Diagnostic) -> bool {
        let _ = self.categories.insert(diagnostic.category);
        if !self.seen.insert(diagnostic.message.clone()) {
            return false;
        }
        tracing::error!(category = %diagnostic.category, "{}", diagnostic.message);
        self.entries.push(diagnostic);
        true
    }

    /// Reports whether anything was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Comma separated category labels, `None` when the ledger is clean.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        if self.categories.is_empty() {
            return None;
        }
        let labels: Vec<&str> = self.categories.iter().map(|c| c.label()).collect();
        Some(labels.join(", "))
    }

    /// Distinct problems in the order they were first seen.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Forgets everything; used when definitions are reloaded.
    pub fn clear(&mut self) {
        self.seen.clear();
        self.categories.clear();
        self.entries.clear();
    }
}
