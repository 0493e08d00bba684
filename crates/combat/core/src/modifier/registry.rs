//! Explicit registry of data-declared modifiers.
//!
//! The registry is built once with [`ModifierRegistry::init`] and is immutable
//! afterwards; callers pass it by reference. Definitions that fail structural
//! validation are rejected at init and reported as diagnostics.

use std::collections::BTreeMap;

use super::{ConditionExpr, Diagnostic, EvalContext, ExprError, ModifierId, ModifierSource, ModifierValue};

/// Data-declared modifier as loaded from content.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierDefinition {
    pub id: ModifierId,
    pub label: String,
    /// Guard; the modifier applies unconditionally when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub when: Option<ConditionExpr>,
    pub effect: ModifierValue,
}

/// Compiled form of a definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluator {
    Constant(ModifierValue),
    Declared {
        when: ConditionExpr,
        effect: ModifierValue,
    },
}

impl Evaluator {
    /// Returns the modifier value if it applies in `ctx`.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Option<ModifierValue>, ExprError> {
        match self {
            Evaluator::Constant(value) => Ok(Some(*value)),
            Evaluator::Declared { when, effect } => {
                Ok(when.evaluate(ctx)?.then_some(*effect))
            }
        }
    }
}

/// A registered modifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredModifier {
    pub label: String,
    pub evaluator: Evaluator,
}

/// Immutable map from modifier id to evaluator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierRegistry {
    entries: BTreeMap<ModifierId, RegisteredModifier>,
    diagnostics: Vec<Diagnostic>,
}

impl ModifierRegistry {
    /// Builds the registry from definitions.
    ///
    /// Rejected definitions (zero magnitudes, invalid expressions) are left
    /// out and recorded as diagnostics. A later definition with the same id
    /// replaces the earlier one and is also recorded.
    pub fn init(definitions: impl IntoIterator<Item = ModifierDefinition>) -> Self {
        let mut entries = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for definition in definitions {
            let diagnose = |message: String| Diagnostic {
                modifier: Some(definition.id.clone()),
                source: ModifierSource::Schema,
                message,
            };

            if let ModifierValue::Magnitude { amount: 0, .. } = definition.effect {
                diagnostics.push(diagnose("magnitude must be non-zero".to_string()));
                continue;
            }

            let evaluator = match definition.when {
                None => Evaluator::Constant(definition.effect),
                Some(when) => {
                    if let Err(error) = when.validate() {
                        diagnostics.push(diagnose(error.to_string()));
                        continue;
                    }
                    Evaluator::Declared {
                        when,
                        effect: definition.effect,
                    }
                }
            };

            let replaced = entries.insert(
                definition.id.clone(),
                RegisteredModifier {
                    label: definition.label,
                    evaluator,
                },
            );
            if replaced.is_some() {
                diagnostics.push(Diagnostic {
                    modifier: Some(definition.id),
                    source: ModifierSource::Schema,
                    message: "duplicate definition replaced the earlier one".to_string(),
                });
            }
        }

        Self {
            entries,
            diagnostics,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ModifierId) -> Option<&RegisteredModifier> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Problems found while building the registry.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
