//! The resolution algorithm.

use smallvec::SmallVec;
use ward_region::{
    FlagEntry, FlagKind, FlagRegistry, FlagValue, Region, RegionError, RegionId, RegionResult, State, Subject,
};
use ward_spatial::ApplicableSet;

/// One region chain's answer for a flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub value: FlagValue,
    /// Priority of the chain head; inherited values compete at this priority.
    pub priority: i32,
    /// Directly applicable region the chain starts at.
    pub head: RegionId,
    /// Region that actually defines the value.
    pub source: RegionId,
    pub override_immune: bool,
}

/// Outcome of resolving one flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlagResolution {
    /// The resolved value, or `None` when no region supplies one.
    pub value: Option<FlagValue>,
    /// Region whose entry decided the value. After an owner bypass this is
    /// the owned region that lifted the deny.
    pub winning_region: Option<RegionId>,
    /// A deny was lifted because the subject owns an applicable region.
    pub owner_override: bool,
    /// Every chain's answer, best first.
    pub candidates: SmallVec<[Candidate; 4]>,
}

impl FlagResolution {
    /// The value as a state, if it is one.
    #[must_use]
    pub fn state(&self) -> Option<State> {
        self.value.as_ref().and_then(FlagValue::as_state)
    }

    /// Whether a state flag resolved to allow, falling back to `default` when unset.
    #[must_use]
    pub fn allows(&self, default: bool) -> bool {
        match self.state() {
            Some(State::Allow) => true,
            Some(State::Deny) => false,
            None => default,
        }
    }
}

/// Reduces an applicable set to one flag value.
///
/// Holds nothing but the registry; every call is a pure function of its
/// arguments.
#[derive(Clone, Copy, Debug)]
pub struct FlagResolver<'a> {
    registry: &'a FlagRegistry,
}

impl<'a> FlagResolver<'a> {
    #[must_use]
    pub const fn new(registry: &'a FlagRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &'a FlagRegistry {
        self.registry
    }

    /// Resolve `flag` over a set for an optional subject.
    ///
    /// A missing subject is treated as an actor that owns and belongs to
    /// nothing. Fails only if the flag is not registered.
    pub fn resolve(&self, set: &ApplicableSet, flag: &str, subject: Option<&dyn Subject>) -> RegionResult<FlagResolution> {
        let def = self.registry.require(flag)?;
        let name = def.name.as_str();

        let mut candidates: SmallVec<[Candidate; 4]> = set
            .heads()
            .iter()
            .filter_map(|head| chain_candidate(set, head, name, subject))
            .collect();

        if candidates.is_empty() {
            if let Some(global) = set.global() {
                candidates.extend(chain_candidate(set, global, name, subject));
            }
        }

        candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.head.cmp(&b.head)));

        let Some(winner) = pick_winner(&candidates, def.kind) else {
            tracing::trace!("flag '{}' unset at {} regions", name, set.len());
            return Ok(FlagResolution::default());
        };

        if def.owner_bypass && winner.value.is_deny() {
            if let Some(owned) = subject.and_then(|subject| bypass_region(set, &candidates, winner.priority, subject)) {
                tracing::trace!("flag '{}' deny from '{}' lifted by owner of '{}'", name, winner.source, owned);
                return Ok(FlagResolution {
                    value: Some(FlagValue::State(State::Allow)),
                    winning_region: Some(owned),
                    owner_override: true,
                    candidates,
                });
            }
        }

        let value = Some(winner.value.clone());
        let winning_region = Some(winner.source.clone());
        Ok(FlagResolution {
            value,
            winning_region,
            owner_override: false,
            candidates,
        })
    }

    /// Resolve several state flags together.
    ///
    /// Deny if any flag resolves to deny, allow if at least one allows and
    /// none deny, `None` if all are unset.
    pub fn test_state(&self, set: &ApplicableSet, flags: &[&str], subject: Option<&dyn Subject>) -> RegionResult<Option<State>> {
        let mut result = None;

        for flag in flags {
            let def = self.registry.require(flag)?;
            if def.kind != FlagKind::State {
                return Err(RegionError::TypeMismatch {
                    flag: def.name.clone(),
                    expected: FlagKind::State,
                    found: def.kind,
                });
            }

            match self.resolve(set, flag, subject)?.state() {
                Some(State::Deny) => return Ok(Some(State::Deny)),
                Some(State::Allow) => result = Some(State::Allow),
                None => {}
            }
        }

        Ok(result)
    }
}

/// Whether the subject owns or belongs to a region, counting ancestors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Standing {
    pub owner: bool,
    pub member: bool,
}

impl Standing {
    /// Standing of `subject` in `region` and every ancestor the set knows.
    #[must_use]
    pub fn of(set: &ApplicableSet, region: &Region, subject: Option<&dyn Subject>) -> Self {
        let Some(subject) = subject else {
            return Self::default();
        };

        let mut standing = Self::default();
        for region in set.chain(region) {
            standing.owner |= region.has_owner(subject);
            standing.member |= region.has_member(subject);
            if standing.owner {
                standing.member = true;
                break;
            }
        }
        standing
    }

    #[must_use]
    pub fn admits(self, entry: &FlagEntry) -> bool {
        entry.group.contains(self.owner, self.member)
    }
}

/// Nearest entry along a chain that applies to the subject.
fn chain_candidate(set: &ApplicableSet, head: &Region, flag: &str, subject: Option<&dyn Subject>) -> Option<Candidate> {
    let standing = Standing::of(set, head, subject);

    set.chain(head).find_map(|region| {
        let entry = region.flag(flag)?;
        standing.admits(entry).then(|| Candidate {
            value: entry.value.clone(),
            priority: head.priority(),
            head: head.id().clone(),
            source: region.id().clone(),
            override_immune: entry.override_immune,
        })
    })
}

/// Highest candidate; for state flags a deny beats an allow at equal priority.
fn pick_winner(candidates: &[Candidate], kind: FlagKind) -> Option<&Candidate> {
    let top = candidates.first()?;
    if kind != FlagKind::State {
        return Some(top);
    }

    candidates
        .iter()
        .take_while(|candidate| candidate.priority == top.priority)
        .find(|candidate| candidate.value.is_deny())
        .or(Some(top))
}

/// Owned direct region that lifts a deny at `priority`, if any.
fn bypass_region(set: &ApplicableSet, candidates: &[Candidate], priority: i32, subject: &dyn Subject) -> Option<RegionId> {
    // Direct regions are sorted priority-first, so the first owned one has
    // the highest priority.
    let owned = set
        .direct()
        .iter()
        .find(|region| Standing::of(set, region, Some(subject)).owner)?;

    if owned.priority() < priority {
        return None;
    }

    let blocked = candidates
        .iter()
        .any(|candidate| candidate.override_immune && candidate.value.is_deny() && candidate.priority >= owned.priority());

    (!blocked).then(|| owned.id().clone())
}
