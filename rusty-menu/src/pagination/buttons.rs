//! Reaction controls and the actions they trigger.

use crate::channel::ReactionSymbol;

/// What a control does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    FirstPage,
    PreviousPage,
    NextPage,
    LastPage,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonGroup {
    Navigation,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub symbol: ReactionSymbol,
    pub action: ButtonAction,
    pub group: ButtonGroup,
}

/// Ordered symbol -> action table.
///
/// Actions are plain tags; the session resolves them against its own state
/// at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonRegistry {
    buttons: Vec<Button>,
}

impl Default for ButtonRegistry {
    fn default() -> Self {
        use ButtonAction::*;
        use ButtonGroup::*;

        let table = [
            ("⏪", FirstPage, Navigation),
            ("◀️", PreviousPage, Navigation),
            ("▶️", NextPage, Navigation),
            ("⏩", LastPage, Navigation),
            ("❌", Stop, General),
        ];

        Self {
            buttons: table
                .into_iter()
                .map(|(symbol, action, group)| Button {
                    symbol: ReactionSymbol::from(symbol),
                    action,
                    group,
                })
                .collect(),
        }
    }
}

impl ButtonRegistry {
    /// Registry with a custom, ordered button table.
    pub fn new(buttons: Vec<Button>) -> Self {
        Self { buttons }
    }

    pub fn group(&self, group: ButtonGroup) -> impl Iterator<Item = &Button> {
        self.buttons.iter().filter(move |button| button.group == group)
    }

    pub fn navigation(&self) -> impl Iterator<Item = &Button> {
        self.group(ButtonGroup::Navigation)
    }

    pub fn general(&self) -> impl Iterator<Item = &Button> {
        self.group(ButtonGroup::General)
    }

    /// Every control symbol, navigation first.
    pub fn all(&self) -> impl Iterator<Item = &Button> {
        self.navigation().chain(self.general())
    }

    /// Resolve a symbol among the given groups.
    pub fn resolve(&self, symbol: &ReactionSymbol, groups: &[ButtonGroup]) -> Option<ButtonAction> {
        self.buttons
            .iter()
            .find(|button| &button.symbol == symbol && groups.contains(&button.group))
            .map(|button| button.action)
    }

    /// Symbols of the given groups in attach order.
    pub fn symbols(&self, groups: &[ButtonGroup]) -> Vec<ReactionSymbol> {
        self.all()
            .filter(|button| groups.contains(&button.group))
            .map(|button| button.symbol.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_ordered_and_grouped() {
        let registry = ButtonRegistry::default();
        let nav: Vec<ButtonAction> = registry.navigation().map(|b| b.action).collect();
        assert_eq!(
            nav,
            [
                ButtonAction::FirstPage,
                ButtonAction::PreviousPage,
                ButtonAction::NextPage,
                ButtonAction::LastPage
            ]
        );
        assert_eq!(registry.general().count(), 1);
        assert_eq!(registry.all().count(), 5);
    }

    #[test]
    fn resolve_ignores_inactive_groups() {
        let registry = ButtonRegistry::default();
        let next = ReactionSymbol::from("▶️");

        assert_eq!(
            registry.resolve(&next, &[ButtonGroup::Navigation]),
            Some(ButtonAction::NextPage)
        );
        assert_eq!(registry.resolve(&next, &[ButtonGroup::General]), None);
        assert_eq!(
            registry.resolve(&ReactionSymbol::from("👍"), &[ButtonGroup::Navigation]),
            None
        );
    }

    #[test]
    fn symbols_follow_navigation_then_general() {
        let registry = ButtonRegistry::default();
        let symbols = registry.symbols(&[ButtonGroup::General, ButtonGroup::Navigation]);
        assert_eq!(symbols.first().map(ReactionSymbol::as_str), Some("⏪"));
        assert_eq!(symbols.last().map(ReactionSymbol::as_str), Some("❌"));
    }
}
