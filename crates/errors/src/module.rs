//! Per-module diagnostics collected during a mutator pass

use std::fmt;

/// A user-facing error attached to a module variant and optionally to one of
/// its properties.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleDiagnostic {
    pub module: String,
    pub variant: String,
    pub property: Option<String>,
    pub message: String,
}

impl ModuleDiagnostic {
    #[must_use]
    pub fn module(
        module: impl Into<String>,
        variant: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            variant: variant.into(),
            property: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn property(
        module: impl Into<String>,
        variant: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            variant: variant.into(),
            property: Some(property.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ModuleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module {:?}", self.module)?;
        if !self.variant.is_empty() {
            write!(f, " variant {:?}", self.variant)?;
        }
        if let Some(property) = &self.property {
            write!(f, ": {property}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// All diagnostics reported by one mutator phase, in module order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleErrors(pub Vec<ModuleDiagnostic>);

impl ModuleErrors {
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, ModuleDiagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModuleErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}
