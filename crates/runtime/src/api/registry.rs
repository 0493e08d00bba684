//! Provider registry for managing turn providers.
//!
//! The [`ProviderRegistry`] maps combatants to the provider that decides
//! their turns.
//!
//! # Design
//!
//! - **Provider instances**: Stored by `ProviderKind`, shared across combatants
//! - **Combatant bindings**: Each combatant can be bound to a specific `ProviderKind`
//! - **Fallback chain**: Combatant binding → Default provider

use std::collections::HashMap;

use combat_core::CombatantId;

use super::{ProviderKind, Result, RuntimeError, TurnProvider};

/// Registry of turn providers with per-combatant bindings.
///
/// ```text
/// ProviderRegistry
/// ├── providers: HashMap<ProviderKind, Box<dyn TurnProvider>>
/// ├── bindings: HashMap<CombatantId, ProviderKind>
/// └── default_kind: ProviderKind
/// ```
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Box<dyn TurnProvider>>,

    /// Sparse: only combatants that do not use the default.
    bindings: HashMap<CombatantId, ProviderKind>,

    default_kind: ProviderKind,
}

impl ProviderRegistry {
    /// Creates an empty registry that defaults to the planner.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            bindings: HashMap::new(),
            default_kind: ProviderKind::Planner,
        }
    }

    /// Registers a provider for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: ProviderKind, provider: impl TurnProvider + 'static) {
        self.providers.insert(kind, Box::new(provider));
    }

    /// Binds a combatant to a provider kind.
    pub fn bind(&mut self, combatant: CombatantId, kind: ProviderKind) {
        self.bindings.insert(combatant, kind);
    }

    /// Reverts a combatant to the default provider.
    ///
    /// Returns the previous kind if it was bound.
    pub fn unbind(&mut self, combatant: CombatantId) -> Option<ProviderKind> {
        self.bindings.remove(&combatant)
    }

    pub fn set_default(&mut self, kind: ProviderKind) {
        self.default_kind = kind;
    }

    pub fn default_kind(&self) -> ProviderKind {
        self.default_kind
    }

    /// Kind used for `combatant`: its binding, or the default.
    pub fn kind_for(&self, combatant: CombatantId) -> ProviderKind {
        self.bindings
            .get(&combatant)
            .copied()
            .unwrap_or(self.default_kind)
    }

    /// Provider that decides `combatant`'s turns.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::ProviderNotSet` if the resolved kind has no
    /// registered provider.
    pub fn provider_for(&mut self, combatant: CombatantId) -> Result<&mut dyn TurnProvider> {
        let kind = self.kind_for(combatant);
        self.get_mut(kind)
    }

    /// # Errors
    ///
    /// Returns `RuntimeError::ProviderNotSet` if no provider is registered for `kind`.
    pub fn get_mut(&mut self, kind: ProviderKind) -> Result<&mut dyn TurnProvider> {
        match self.providers.get_mut(&kind) {
            Some(provider) => Ok(provider.as_mut()),
            None => Err(RuntimeError::ProviderNotSet { kind }),
        }
    }

    pub fn has(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PassProvider;

    #[test]
    fn test_binding_falls_back_to_default() {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::Planner, PassProvider);
        registry.bind(CombatantId(2), ProviderKind::Scripted);

        assert_eq!(registry.kind_for(CombatantId(1)), ProviderKind::Planner);
        assert_eq!(registry.kind_for(CombatantId(2)), ProviderKind::Scripted);
        assert!(registry.provider_for(CombatantId(1)).is_ok());
        assert!(matches!(
            registry.provider_for(CombatantId(2)),
            Err(RuntimeError::ProviderNotSet {
                kind: ProviderKind::Scripted
            })
        ));

        assert_eq!(registry.unbind(CombatantId(2)), Some(ProviderKind::Scripted));
        assert!(registry.provider_for(CombatantId(2)).is_ok());
    }
}
