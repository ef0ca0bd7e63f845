//! Flag resolution over applicable region sets.
//!
//! Given the regions that apply at a point, an optional acting subject and a
//! flag name, [`FlagResolver::resolve`] produces one value and the region that
//! decided it:
//!
//! 1. Each chain head (a directly applicable region that is not an ancestor
//!    of another) yields the nearest entry on its parent chain whose group
//!    admits the subject. The entry competes at the head's priority.
//! 2. Candidates sort by priority descending, then head id ascending. For
//!    state flags a deny at the top priority beats any allow there.
//! 3. If the flag allows owner bypass and the winner is a deny, a subject
//!    owning a direct region at or above the winning priority gets allow,
//!    unless an override-immune deny sits at or above that region.
//! 4. The global region answers only when no chain does.

mod resolver;

pub use resolver::{Candidate, FlagResolution, FlagResolver, Standing};
