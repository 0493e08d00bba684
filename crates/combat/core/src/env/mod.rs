//! Traits describing read-only encounter data.
//!
//! Oracles expose creature definitions, rule tables and dice. The [`Env`]
//! aggregate bundles them so the engine and the planner can access everything
//! they need without coupling to the content loaders.
mod catalog;
mod error;
mod rng;
mod rules;

pub use catalog::{AuraDef, CatalogOracle, CreatureDefinition, PassiveTrait};
pub use error::OracleError;
pub use rng::{PcgRng, RngOracle, compute_seed, roll_context};
pub use rules::RulesOracle;

/// Aggregates read-only oracles required by the engine and the planner.
pub struct Env<'a, C, L, R>
where
    C: CatalogOracle + ?Sized,
    L: RulesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    catalog: Option<&'a C>,
    rules: Option<&'a L>,
    rng: Option<&'a R>,
}

impl<C, L, R> Clone for Env<'_, C, L, R>
where
    C: CatalogOracle + ?Sized,
    L: RulesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, L, R> Copy for Env<'_, C, L, R>
where
    C: CatalogOracle + ?Sized,
    L: RulesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type CombatEnv<'a> = Env<'a, dyn CatalogOracle + 'a, dyn RulesOracle + 'a, dyn RngOracle + 'a>;

impl<'a, C, L, R> Env<'a, C, L, R>
where
    C: CatalogOracle + ?Sized,
    L: RulesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(catalog: Option<&'a C>, rules: Option<&'a L>, rng: Option<&'a R>) -> Self {
        Self {
            catalog,
            rules,
            rng,
        }
    }

    pub fn with_all(catalog: &'a C, rules: &'a L, rng: &'a R) -> Self {
        Self::new(Some(catalog), Some(rules), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            catalog: None,
            rules: None,
            rng: None,
        }
    }

    /// Returns the CatalogOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CatalogNotAvailable` if no catalog was provided.
    pub fn catalog(&self) -> Result<&'a C, OracleError> {
        self.catalog.ok_or(OracleError::CatalogNotAvailable)
    }

    /// Returns the RulesOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RulesNotAvailable` if no rules oracle was provided.
    pub fn rules(&self) -> Result<&'a L, OracleError> {
        self.rules.ok_or(OracleError::RulesNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }
}

impl<'a, C, L, R> Env<'a, C, L, R>
where
    C: CatalogOracle + 'a,
    L: RulesOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `CombatEnv`.
    pub fn as_combat_env(&self) -> CombatEnv<'a> {
        let catalog: Option<&'a dyn CatalogOracle> = self.catalog.map(|c| c as _);
        let rules: Option<&'a dyn RulesOracle> = self.rules.map(|r| r as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|r| r as _);
        Env::new(catalog, rules, rng)
    }
}
