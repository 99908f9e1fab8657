use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Partial update of an entity's mutable fields. Every field is optional;
/// an unset field leaves the record untouched.
pub trait RecordPatch: Clone + Default + Debug + PartialEq {
    /// Fold a later patch into this one. Fields set in `later` win.
    fn merge(&mut self, later: Self);

    fn is_empty(&self) -> bool;
}

/// A record that can be edited locally before being committed to the
/// remote source that owns it.
pub trait EditableRecord: Clone + Debug {
    type Id: Clone + Ord + Eq + Hash + Debug + Display;
    type Patch: RecordPatch;

    fn record_id(&self) -> &Self::Id;

    fn apply(&mut self, patch: &Self::Patch);
}
