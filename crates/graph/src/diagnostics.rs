//! Per-module error sink

use varia_errors::{Error, ModuleDiagnostic, ModuleErrors};

use crate::Module;

/// Collects module and property errors during a phase
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<ModuleDiagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: ModuleDiagnostic) {
        self.0.push(diagnostic);
    }

    pub fn module_error(&mut self, module: &Module, message: impl Into<String>) {
        self.push(ModuleDiagnostic::module(
            module.name(),
            module.variant_name(),
            message,
        ));
    }

    pub fn property_error(
        &mut self,
        module: &Module,
        property: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(ModuleDiagnostic::property(
            module.name(),
            module.variant_name(),
            property,
            message,
        ));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleDiagnostic> {
        self.0.iter()
    }

    /// Fail with every collected diagnostic, if any
    ///
    /// # Errors
    ///
    /// Returns `Error::Module` when at least one diagnostic was collected.
    pub fn into_result(self) -> Result<(), Error> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Module(ModuleErrors(self.0)))
        }
    }
}

impl Extend<ModuleDiagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = ModuleDiagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = ModuleDiagnostic;
    type IntoIter = std::vec::IntoIter<ModuleDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
