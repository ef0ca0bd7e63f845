//! Applicable region sets returned by index queries.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use rustc_hash::FxBuildHasher;
use ward_region::{Region, RegionId};

/// Regions that apply at a point or volume, frozen at query time.
///
/// Holds three disjoint groups:
///
/// ```text
/// direct     geometry matches the query       priority desc, id asc
/// inherited  reached only through parent links priority desc, id asc
/// global     the world's __global__ region, if defined
/// ```
///
/// Every region is an `Arc` snapshot; later edits to the index do not show
/// through.
#[derive(Clone, Debug, Default)]
pub struct ApplicableSet {
    direct: Vec<Arc<Region>>,
    inherited: Vec<Arc<Region>>,
    global: Option<Arc<Region>>,
    heads: Vec<Arc<Region>>,
    by_id: HashMap<RegionId, Arc<Region>, FxBuildHasher>,
}

impl ApplicableSet {
    /// Build a set from directly matching regions, following parent links
    /// through `lookup`.
    pub(crate) fn build<'a>(
        mut direct: Vec<Arc<Region>>,
        global: Option<Arc<Region>>,
        lookup: impl Fn(&RegionId) -> Option<&'a Arc<Region>>,
    ) -> Self {
        direct.sort_by(|a, b| compare(a, b));

        let mut by_id: HashMap<RegionId, Arc<Region>, FxBuildHasher> = HashMap::with_hasher(FxBuildHasher);
        if let Some(global) = &global {
            by_id.insert(global.id().clone(), Arc::clone(global));
        }
        for region in &direct {
            by_id.insert(region.id().clone(), Arc::clone(region));
        }

        let mut inherited = Vec::new();
        let mut covered: HashSet<RegionId, FxBuildHasher> = HashSet::with_hasher(FxBuildHasher);

        for region in &direct {
            let mut next = region.parent().cloned();
            // `covered` doubles as the visited set, so a chain stops where an
            // earlier walk already went.
            while let Some(parent_id) = next.take() {
                if !covered.insert(parent_id.clone()) {
                    break;
                }
                let parent = match by_id.get(&parent_id) {
                    Some(parent) => Arc::clone(parent),
                    None => match lookup(&parent_id) {
                        Some(parent) => {
                            by_id.insert(parent_id, Arc::clone(parent));
                            inherited.push(Arc::clone(parent));
                            Arc::clone(parent)
                        }
                        None => break,
                    },
                };
                next = parent.parent().cloned();
            }
        }

        inherited.sort_by(|a, b| compare(a, b));

        let heads = direct
            .iter()
            .filter(|region| !covered.contains(region.id()))
            .cloned()
            .collect();

        Self {
            direct,
            inherited,
            global,
            heads,
            by_id,
        }
    }

    /// Regions whose geometry matched the query, global excluded.
    #[must_use]
    pub fn direct(&self) -> &[Arc<Region>] {
        &self.direct
    }

    /// Ancestors of direct regions that did not match on their own.
    #[must_use]
    pub fn inherited(&self) -> &[Arc<Region>] {
        &self.inherited
    }

    #[must_use]
    pub fn global(&self) -> Option<&Arc<Region>> {
        self.global.as_ref()
    }

    /// Direct regions that are not an ancestor of another direct region.
    ///
    /// Each head starts one inheritance chain; chains of different heads may
    /// share ancestors.
    #[must_use]
    pub fn heads(&self) -> &[Arc<Region>] {
        &self.heads
    }

    /// Look up any region in the set, global included.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Region>> {
        self.by_id.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// A region followed by its ancestors, nearest first.
    pub fn chain<'a>(&'a self, region: &'a Region) -> impl Iterator<Item = &'a Region> + 'a {
        let limit = self.by_id.len() + 1;
        std::iter::successors(Some(region), move |current| {
            current
                .parent()
                .and_then(|parent| self.by_id.get(parent))
                .map(|parent| &**parent)
        })
        .take(limit)
    }

    /// Direct, then inherited, then global.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Region>> {
        self.direct.iter().chain(&self.inherited).chain(&self.global)
    }

    /// Ids in iteration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&RegionId> {
        self.iter().map(|region| region.id()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Priority descending, then id ascending.
pub(crate) fn compare(a: &Region, b: &Region) -> std::cmp::Ordering {
    b.priority().cmp(&a.priority()).then_with(|| a.id().cmp(b.id()))
}
