use crate::ast::TypeSpec;
use std::collections::HashMap;
use std::fmt::{Display, Write};

/// Scope name of the global namespace. Function scopes use the function name.
pub const GLOBAL_SCOPE: &str = "";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SymbolEntry {
    pub name: String,
    pub scope: String,
    pub location: usize,
    /// `None` for records created by a use rather than a declaration
    pub kind: Option<SymbolKind>,
    pub declared: Option<TypeSpec>,
    /// Declaration line first, then every recorded use
    pub lines: Vec<usize>,
}

/// Insert/lookup service keyed by name and scope.
pub trait SymbolTable {
    /// Records `name` in `scope`. If the name is already visible there only
    /// the line number is appended.
    fn insert(
        &mut self,
        name: &str,
        line: usize,
        location: usize,
        scope: &str,
        kind: Option<SymbolKind>,
        declared: Option<TypeSpec>,
    );
    /// Location of `name` as seen from `scope`, falling back to the global scope.
    fn lookup(&self, name: &str, scope: &str) -> Option<usize>;
    fn entry(&self, name: &str, scope: &str) -> Option<&SymbolEntry>;
    fn dump(&self) -> String;
}

/// Hash-map backed table that remembers insertion order for listings.
#[derive(Debug, Default)]
pub struct ScopedTable {
    entries: Vec<SymbolEntry>,
    index: HashMap<(String, String), usize>,
}

impl ScopedTable {
    pub fn new() -> ScopedTable {
        ScopedTable::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    fn position(&self, name: &str, scope: &str) -> Option<usize> {
        let local = self.index.get(&(scope.to_string(), name.to_string()));
        local
            .or_else(|| {
                self.index
                    .get(&(GLOBAL_SCOPE.to_string(), name.to_string()))
            })
            .copied()
    }
}

impl SymbolTable for ScopedTable {
    fn insert(
        &mut self,
        name: &str,
        line: usize,
        location: usize,
        scope: &str,
        kind: Option<SymbolKind>,
        declared: Option<TypeSpec>,
    ) {
        if let Some(existing) = self.position(name, scope) {
            self.entries[existing].lines.push(line);
            return;
        }
        self.index
            .insert((scope.to_string(), name.to_string()), self.entries.len());
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            scope: scope.to_string(),
            location,
            kind,
            declared,
            lines: vec![line],
        });
    }

    fn lookup(&self, name: &str, scope: &str) -> Option<usize> {
        self.entry(name, scope).map(|entry| entry.location)
    }

    fn entry(&self, name: &str, scope: &str) -> Option<&SymbolEntry> {
        self.position(name, scope).map(|i| &self.entries[i])
    }

    fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<14} {:<14} {:<5} {:<9} {:<5} Line Numbers",
            "Name", "Scope", "Loc", "Kind", "Type"
        );
        let _ = writeln!(
            out,
            "{:<14} {:<14} {:<5} {:<9} {:<5} ------------",
            "----", "-----", "---", "----", "----"
        );
        for entry in &self.entries {
            let _ = writeln!(out, "{}", entry);
        }
        out
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Variable => write!(f, "var"),
        }
    }
}

impl Display for SymbolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = if self.scope == GLOBAL_SCOPE {
            "<global>"
        } else {
            self.scope.as_str()
        };
        let kind = self.kind.map(|k| k.to_string()).unwrap_or_default();
        let declared = self.declared.map(|t| t.to_string()).unwrap_or_default();
        let lines = self
            .lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(
            f,
            "{:<14} {:<14} {:<5} {:<9} {:<5} {}",
            self.name, scope, self.location, kind, declared, lines
        )
    }
}
