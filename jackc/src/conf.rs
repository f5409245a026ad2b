//! Compiler configuration.

/// Compiler Configuration Parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompilerConf {
    /// Write the symbol tables into the output as comments.
    ///
    /// The class scope is listed after the class variable declarations,
    /// each subroutine scope after its function declaration.
    pub annotate: bool,
    /// Reject a name that is declared twice in the same scope.
    ///
    /// By default the later declaration silently replaces the earlier one.
    pub strict_declarations: bool,
}
