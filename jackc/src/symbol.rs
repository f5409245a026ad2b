//! Symbol tables.
//!
//! Two scopes are live while a subroutine is compiled. The class scope
//! holds static and field variables, and lives for the whole unit. The
//! subroutine scope holds arguments and locals, and is replaced with a
//! fresh value at every subroutine declaration.
use std::{collections::BTreeMap, fmt};

use smol_str::SmolStr;

use crate::vm::Segment;

/// Name of the implicit receiver argument of methods.
pub const RECEIVER: &str = "this";

/// Storage location class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SymbolKind {
    Static = 0,
    Field = 1,
    Argument = 2,
    Local = 3,
}

impl SymbolKind {
    const COUNT: usize = 4;

    /// Virtual machine segment the variable is stored in.
    #[rustfmt::skip]
    pub fn segment(self) -> Segment {
        match self {
            Self::Static   => Segment::Static,
            Self::Field    => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local    => Segment::Local,
        }
    }

    /// Kinds that live in the class scope.
    #[inline]
    pub fn is_class_level(self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }
}

impl fmt::Display for SymbolKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static   => write!(f, "static"),
            Self::Field    => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local    => write!(f, "var"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Declared type, either a primitive type keyword or a class name.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// Slot within the kind's segment.
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<SmolStr, Symbol>,
    /// Number of slots handed out per kind.
    counts: [u16; SymbolKind::COUNT],
}

impl SymbolTable {
    /// Define a variable at the next free slot of its kind.
    ///
    /// A name that already exists is overwritten. The slot of the
    /// previous definition stays counted. Returns the previous definition.
    pub fn define(&mut self, name: impl Into<SmolStr>, ty: impl Into<SmolStr>, kind: SymbolKind) -> Option<Symbol> {
        let name = name.into();
        let index = self.counts[kind as usize];
        self.counts[kind as usize] += 1;

        let symbol = Symbol {
            name: name.clone(),
            ty: ty.into(),
            kind,
            index,
        };
        log::trace!("define {} {} {} -> {} {}", kind, symbol.ty, name, kind.segment(), index);

        self.symbols.insert(name, symbol)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Kind of the named variable, or `None` when it isn't declared.
    #[inline]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.get(name).map(|symbol| symbol.kind)
    }

    #[inline]
    pub fn type_of(&self, name: &str) -> Option<&SmolStr> {
        self.get(name).map(|symbol| &symbol.ty)
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|symbol| symbol.index)
    }

    /// Number of variables declared of the given kind.
    #[inline]
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        self.counts[kind as usize]
    }

    /// Symbols ordered by kind, then slot.
    pub fn ordered(&self) -> Vec<&Symbol> {
        let mut symbols = self.symbols.values().collect::<Vec<_>>();
        symbols.sort_by_key(|symbol| (symbol.kind, symbol.index));
        symbols
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// Scope of the subroutine currently being compiled.
///
/// Owns the label counters, so every subroutine starts
/// numbering its branches from zero.
#[derive(Debug)]
pub struct SubroutineScope {
    /// Name qualified by its class, `Class.name`.
    name: SmolStr,
    kind: SubroutineKind,
    table: SymbolTable,
    loop_count: u32,
    branch_count: u32,
}

impl SubroutineScope {
    pub fn new(class_name: &str, name: &str, kind: SubroutineKind) -> Self {
        let mut table = SymbolTable::default();

        // The receiver is passed as the hidden first argument.
        if kind == SubroutineKind::Method {
            table.define(RECEIVER, class_name, SymbolKind::Argument);
        }

        Self {
            name: SmolStr::from(format!("{class_name}.{name}")),
            kind,
            table,
            loop_count: 0,
            branch_count: 0,
        }
    }

    /// Name qualified by its class.
    #[inline]
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> SubroutineKind {
        self.kind
    }

    #[inline]
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    #[inline]
    pub fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }

    /// Take the next loop number.
    pub fn next_loop(&mut self) -> u32 {
        let n = self.loop_count;
        self.loop_count += 1;
        n
    }

    /// Take the next conditional number.
    pub fn next_branch(&mut self) -> u32 {
        let n = self.branch_count;
        self.branch_count += 1;
        n
    }
}

/// Result of resolving a bare identifier against both scopes.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    Resolved(&'a Symbol),
    /// Not declared in either scope. The name is taken to be
    /// a class or a subroutine.
    AssumedExternal,
}

/// Resolve a name, searching the subroutine scope before the class scope.
pub fn resolve<'a>(subroutine: Option<&'a SymbolTable>, class: &'a SymbolTable, name: &str) -> Lookup<'a> {
    subroutine
        .and_then(|table| table.get(name))
        .or_else(|| class.get(name))
        .map(Lookup::Resolved)
        .unwrap_or(Lookup::AssumedExternal)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slots_per_kind_in_declaration_order() {
        let mut table = SymbolTable::default();
        table.define("a", "int", SymbolKind::Field);
        table.define("b", "int", SymbolKind::Static);
        table.define("c", "Point", SymbolKind::Field);
        table.define("d", "boolean", SymbolKind::Field);

        assert_eq!(table.index_of("a"), Some(0));
        assert_eq!(table.index_of("b"), Some(0));
        assert_eq!(table.index_of("c"), Some(1));
        assert_eq!(table.index_of("d"), Some(2));
        assert_eq!(table.var_count(SymbolKind::Field), 3);
        assert_eq!(table.var_count(SymbolKind::Static), 1);
        assert_eq!(table.var_count(SymbolKind::Local), 0);
        assert_eq!(table.type_of("c").map(|ty| ty.as_str()), Some("Point"));
    }

    #[test]
    fn test_unknown_name_has_no_kind() {
        let table = SymbolTable::default();
        assert_eq!(table.kind_of("nope"), None);
        assert!(!table.contains("nope"));
    }

    #[test]
    fn test_redefinition_overwrites() {
        let mut table = SymbolTable::default();
        assert!(table.define("x", "int", SymbolKind::Local).is_none());
        let previous = table.define("x", "char", SymbolKind::Local).unwrap();

        assert_eq!(previous.ty, "int");
        assert_eq!(table.index_of("x"), Some(1));
        assert_eq!(table.var_count(SymbolKind::Local), 2);
    }

    #[test]
    fn test_method_scope_seeds_receiver() {
        let mut scope = SubroutineScope::new("Point", "move", SubroutineKind::Method);
        scope.table_mut().define("dx", "int", SymbolKind::Argument);

        let this = scope.table().get(RECEIVER).unwrap();
        assert_eq!(this.ty, "Point");
        assert_eq!(this.index, 0);
        assert_eq!(scope.table().index_of("dx"), Some(1));
        assert_eq!(scope.name(), "Point.move");
    }

    #[test]
    fn test_scope_keeps_subroutine_kind() {
        let scope = SubroutineScope::new("Point", "new", SubroutineKind::Constructor);
        assert_eq!(scope.kind(), SubroutineKind::Constructor);
        assert!(!scope.table().contains(RECEIVER));
    }

    #[test]
    fn test_function_scope_has_no_receiver() {
        let scope = SubroutineScope::new("Main", "main", SubroutineKind::Function);
        assert!(!scope.table().contains(RECEIVER));
        assert_eq!(scope.table().var_count(SymbolKind::Argument), 0);
    }

    #[test]
    fn test_label_counters_are_independent() {
        let mut scope = SubroutineScope::new("Main", "main", SubroutineKind::Function);
        assert_eq!(scope.next_loop(), 0);
        assert_eq!(scope.next_loop(), 1);
        assert_eq!(scope.next_branch(), 0);
        assert_eq!(scope.next_loop(), 2);
        assert_eq!(scope.next_branch(), 1);
    }

    #[test]
    fn test_resolve_subroutine_shadows_class() {
        let mut class = SymbolTable::default();
        class.define("x", "int", SymbolKind::Field);
        class.define("y", "int", SymbolKind::Field);
        let mut scope = SubroutineScope::new("Main", "f", SubroutineKind::Function);
        scope.table_mut().define("x", "char", SymbolKind::Local);

        match resolve(Some(scope.table()), &class, "x") {
            Lookup::Resolved(symbol) => assert_eq!(symbol.kind, SymbolKind::Local),
            Lookup::AssumedExternal => panic!("x must resolve"),
        }
        match resolve(Some(scope.table()), &class, "y") {
            Lookup::Resolved(symbol) => assert_eq!(symbol.kind, SymbolKind::Field),
            Lookup::AssumedExternal => panic!("y must resolve"),
        }
        assert_eq!(resolve(Some(scope.table()), &class, "Output"), Lookup::AssumedExternal);
    }

    #[test]
    fn test_ordered_listing() {
        let mut table = SymbolTable::default();
        table.define("z", "int", SymbolKind::Field);
        table.define("a", "int", SymbolKind::Static);
        table.define("m", "int", SymbolKind::Field);

        let names = table.ordered().iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "z", "m"]);
    }
}
