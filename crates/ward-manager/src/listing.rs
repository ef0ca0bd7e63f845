//! Region listings.

use ward_geom::{Aabb, ShapeKind};
use ward_region::{Region, RegionId, Subject};
use ward_spatial::RegionIndex;

/// How a listed region relates to the filter's subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Member,
}

/// Which regions a listing includes.
#[derive(Default)]
pub struct RegionFilter<'a> {
    /// Only regions this subject owns, directly or through an ancestor.
    pub subject: Option<&'a dyn Subject>,
    /// With a subject, also include regions it is a member of.
    pub include_members: bool,
    /// Only ids containing this text, case-insensitively.
    pub id_contains: Option<String>,
}

/// One line of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSummary {
    pub id: RegionId,
    pub kind: ShapeKind,
    pub priority: i32,
    pub parent: Option<RegionId>,
    /// `None` for the global region.
    pub bounds: Option<Aabb>,
    pub volume: u64,
    pub owners: usize,
    pub members: usize,
    pub flags: usize,
    pub relation: Option<Relation>,
}

pub(crate) fn list(index: &RegionIndex, filter: &RegionFilter<'_>) -> Vec<RegionSummary> {
    let needle = filter.id_contains.as_deref().map(str::to_ascii_lowercase);

    let mut summaries: Vec<_> = index
        .iter()
        .filter(|region| needle.as_deref().is_none_or(|needle| region.id().as_str().contains(needle)))
        .filter_map(|region| match filter.subject {
            None => Some(summarize(region, None)),
            Some(subject) => match relation(index, region, subject) {
                Some(Relation::Owner) => Some(summarize(region, Some(Relation::Owner))),
                Some(Relation::Member) if filter.include_members => Some(summarize(region, Some(Relation::Member))),
                _ => None,
            },
        })
        .collect();

    // The index iterates by id already; only the global region moves.
    summaries.sort_by_key(|summary| !summary.id.is_global());
    summaries
}

fn relation(index: &RegionIndex, region: &Region, subject: &dyn Subject) -> Option<Relation> {
    let chain = std::iter::once(region).chain(index.ancestors(region.id().as_str()).into_iter().map(|r| &**r));

    let mut relation = None;
    for link in chain {
        if link.has_owner(subject) {
            return Some(Relation::Owner);
        }
        if link.has_member(subject) {
            relation = Some(Relation::Member);
        }
    }
    relation
}

fn summarize(region: &Region, relation: Option<Relation>) -> RegionSummary {
    RegionSummary {
        id: region.id().clone(),
        kind: region.shape().kind(),
        priority: region.priority(),
        parent: region.parent().cloned(),
        bounds: (!region.is_global()).then(|| region.bounding_box()),
        volume: region.volume(),
        owners: region.owners().len(),
        members: region.members().len(),
        flags: region.flags().len(),
        relation,
    }
}
