//! Flag definitions.

use std::collections::HashMap;

use crate::{FlagKind, FlagValue, RegionError, RegionResult};

/// Declared type and resolution properties of one flag name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagDef {
    pub name: String,
    pub kind: FlagKind,
    /// Owners of an applicable region may bypass a deny of this flag.
    pub owner_bypass: bool,
}

impl FlagDef {
    #[must_use]
    pub fn new(name: impl AsRef<str>, kind: FlagKind) -> Self {
        Self {
            name: name.as_ref().to_ascii_lowercase(),
            kind,
            owner_bypass: false,
        }
    }

    /// A state flag.
    #[must_use]
    pub fn state(name: impl AsRef<str>) -> Self {
        Self::new(name, FlagKind::State)
    }

    /// Let region owners bypass denies of this flag.
    #[must_use]
    pub fn owner_bypass(mut self) -> Self {
        self.owner_bypass = true;
        self
    }
}

/// Maps flag names to their definitions.
///
/// Lookups are case-insensitive; names are stored lowercase.
#[derive(Clone, Debug, Default)]
pub struct FlagRegistry {
    defs: HashMap<String, FlagDef>,
}

impl FlagRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the common protection flags.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let defs = [
            FlagDef::state("build").owner_bypass(),
            FlagDef::state("block-break").owner_bypass(),
            FlagDef::state("block-place").owner_bypass(),
            FlagDef::state("interact").owner_bypass(),
            FlagDef::state("use").owner_bypass(),
            FlagDef::state("pvp"),
            FlagDef::state("mob-spawning"),
            FlagDef::state("entry"),
            FlagDef::state("exit"),
            FlagDef::state("passthrough"),
            FlagDef::new("greeting", FlagKind::String),
            FlagDef::new("farewell", FlagKind::String),
            FlagDef::new("heal-amount", FlagKind::Integer),
            FlagDef::new("heal-delay", FlagKind::Integer),
            FlagDef::new("notify-enter", FlagKind::Boolean),
            FlagDef::new("price", FlagKind::Double),
            FlagDef::new("allowed-visitors", FlagKind::ActorSet),
        ];
        for def in defs {
            registry.defs.insert(def.name.clone(), def);
        }
        registry
    }

    /// Register a flag. Registering an identical definition twice is a no-op.
    pub fn register(&mut self, def: FlagDef) -> RegionResult<()> {
        match self.defs.get(&def.name) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(RegionError::ConflictingFlag(def.name)),
            None => {
                tracing::debug!("registered flag '{}' ({})", def.name, def.kind);
                self.defs.insert(def.name.clone(), def);
                Ok(())
            }
        }
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagDef> {
        match self.defs.get(name) {
            Some(def) => Some(def),
            None => self.defs.get(&name.to_ascii_lowercase()),
        }
    }

    /// Look up a definition, failing with [`RegionError::UnknownFlag`].
    pub fn require(&self, name: &str) -> RegionResult<&FlagDef> {
        self.get(name).ok_or_else(|| RegionError::UnknownFlag(name.to_owned()))
    }

    /// Check that a value fits a flag's declared kind.
    pub fn check(&self, name: &str, value: &FlagValue) -> RegionResult<&FlagDef> {
        let def = self.require(name)?;
        if def.kind != value.kind() {
            return Err(RegionError::TypeMismatch {
                flag: def.name.clone(),
                expected: def.kind,
                found: value.kind(),
            });
        }
        match value {
            FlagValue::Double(value) if !value.is_finite() => Err(RegionError::NonFiniteValue(def.name.clone())),
            _ => Ok(def),
        }
    }

    /// Definitions sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<&FlagDef> {
        let mut defs: Vec<_> = self.defs.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
