//! Editor variables.
//!
//! Behaviour such as tab expansion or re-casing on replace is controlled by
//! named, string-valued variables. A buffer may override any variable
//! locally; lookups fall back to the global table owned by the session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `tab-width`: columns per tab stop.
pub const TAB_WIDTH: &str = "tab-width";
/// `fill-column`: column beyond which auto-fill breaks lines.
pub const FILL_COLUMN: &str = "fill-column";
/// `case-replace`: re-case replacement text to match the replaced span.
pub const CASE_REPLACE: &str = "case-replace";
/// `kill-whole-line`: `kill-line` at column 0 also kills the newline.
pub const KILL_WHOLE_LINE: &str = "kill-whole-line";
/// `transient-mark-mode`: region commands need an active mark.
pub const TRANSIENT_MARK_MODE: &str = "transient-mark-mode";
/// `indent-tabs-mode`: indentation may use TAB characters.
pub const INDENT_TABS_MODE: &str = "indent-tabs-mode";
/// `auto-fill-mode`: new buffers start with auto-fill enabled.
pub const AUTO_FILL_MODE: &str = "auto-fill-mode";
/// `tab-always-indent`: `indent-for-tab-command` just inserts a tab.
pub const TAB_ALWAYS_INDENT: &str = "tab-always-indent";

/// Returns true if setting `name` interactively only affects the
/// current buffer.
pub fn is_local(name: &str) -> bool {
    matches!(name, TAB_WIDTH | FILL_COLUMN | INDENT_TABS_MODE)
}

/// A table of variable values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarTable {
    values: HashMap<String, String>,
}

impl VarTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns a variable's raw value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Removes a variable, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Number of variables set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VarTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.set(k, v);
        }
        table
    }
}

/// A buffer-local view: local overrides first, then the global table.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    local: &'a VarTable,
    global: &'a VarTable,
}

impl<'a> Scope<'a> {
    /// Creates a lookup scope.
    pub fn new(local: &'a VarTable, global: &'a VarTable) -> Self {
        Self { local, global }
    }

    /// Returns a variable's raw value.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.local.get(name).or_else(|| self.global.get(name))
    }

    /// Anything but `nil` is true; an unset variable is false.
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v != "nil")
    }

    /// Parses a numeric variable, yielding 0 when unset or malformed.
    pub fn get_number(&self, name: &str) -> i64 {
        self.get(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// A tab width that is never zero.
    pub fn tab_width(&self) -> usize {
        usize::try_from(self.get_number(TAB_WIDTH))
            .ok()
            .filter(|&t| t > 0)
            .unwrap_or(1)
    }

    /// The fill column, clamped at zero.
    pub fn fill_column(&self) -> usize {
        usize::try_from(self.get_number(FILL_COLUMN)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_overrides_global() {
        let global: VarTable = [(TAB_WIDTH, "8"), (CASE_REPLACE, "t")].into_iter().collect();
        let local: VarTable = [(TAB_WIDTH, "4")].into_iter().collect();
        let scope = Scope::new(&local, &global);

        assert_eq!(scope.tab_width(), 4);
        assert!(scope.get_bool(CASE_REPLACE));
    }

    #[test]
    fn test_bool_and_number_parsing() {
        let global: VarTable = [(CASE_REPLACE, "nil"), (FILL_COLUMN, "abc")].into_iter().collect();
        let local = VarTable::new();
        let scope = Scope::new(&local, &global);

        assert!(!scope.get_bool(CASE_REPLACE));
        assert!(!scope.get_bool(KILL_WHOLE_LINE));
        assert_eq!(scope.get_number(FILL_COLUMN), 0);
    }

    #[test]
    fn test_is_local() {
        assert!(is_local(TAB_WIDTH));
        assert!(!is_local(CASE_REPLACE));
        assert!(!is_local("no-such-variable"));
    }

    #[test]
    fn test_tab_width_never_zero() {
        let global: VarTable = [(TAB_WIDTH, "0")].into_iter().collect();
        let local = VarTable::new();
        assert_eq!(Scope::new(&local, &global).tab_width(), 1);
    }
}
