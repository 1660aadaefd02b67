//! The fixed mapping from control symbols to navigation actions.

/// Navigation action triggered by a control signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    First,
    Backward,
    Forward,
    Last,
    Jump,
}

/// One (symbol, action) pair of a control map.
#[derive(Clone, Debug)]
pub struct ControlEntry {
    pub symbol: String,
    pub action: NavAction,
}

/// Ordered control-symbol-to-action mapping, fixed at construction.
///
/// Order is display order: controls are attached to the message in this
/// order. Matching is case-sensitive exact equality on the symbol, so order
/// has no bearing on resolution.
#[derive(Clone, Debug)]
pub struct ControlMap {
    entries: Vec<ControlEntry>,
}

impl ControlMap {
    /// The standard five navigation controls.
    pub fn standard() -> Self {
        Self::new(vec![
            ("\u{23EE}", NavAction::First),    // ⏮
            ("\u{25C0}", NavAction::Backward), // ◀
            ("\u{25B6}", NavAction::Forward),  // ▶
            ("\u{23ED}", NavAction::Last),     // ⏭
            ("\u{1F522}", NavAction::Jump),    // 🔢
        ])
    }

    pub fn new(pairs: Vec<(&str, NavAction)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(symbol, action)| ControlEntry {
                symbol: symbol.to_string(),
                action,
            })
            .collect();
        Self { entries }
    }

    /// Symbols in display/attach order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    /// The action for a control symbol, or `None` when the signal names no
    /// known control and should be ignored.
    pub fn resolve(&self, symbol: &str) -> Option<NavAction> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_map_keeps_display_order() {
        let map = ControlMap::standard();
        let symbols: Vec<&str> = map.symbols().collect();
        assert_eq!(
            symbols,
            vec!["\u{23EE}", "\u{25C0}", "\u{25B6}", "\u{23ED}", "\u{1F522}"]
        );
    }

    #[test]
    fn resolve_is_exact_match() {
        let map = ControlMap::standard();
        assert_eq!(map.resolve("\u{25B6}"), Some(NavAction::Forward));
        assert_eq!(map.resolve("\u{1F522}"), Some(NavAction::Jump));
        assert_eq!(map.resolve("x"), None);
        assert_eq!(map.resolve(""), None);
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let map = ControlMap::new(vec![("a", NavAction::First), ("A", NavAction::Last)]);
        assert_eq!(map.resolve("a"), Some(NavAction::First));
        assert_eq!(map.resolve("A"), Some(NavAction::Last));
    }
}
