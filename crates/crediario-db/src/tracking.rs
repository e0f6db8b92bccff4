//! Entity change tracking: states, entries, and the tracked registry.
//!
//! Every entity attached to a unit of work carries a tracking state and
//! a snapshot of its last-persisted field values. Mutation goes through
//! the registry (`update` takes a mutator closure), which is what marks
//! an `Unchanged` entry `Modified` -- there is no per-field interception.
//!
//! State machine:
//!
//! ```text
//! Detached -> Added -> Unchanged <-> Modified -> Deleted -> Detached
//! ```
//!
//! Invariant: at most one entry exists per persisted identity within a
//! registry. Re-attaching is a no-op returning the existing handle;
//! re-adding is an error. Never a duplicate entry.

use std::collections::BTreeMap;

use serde::Serialize;

/// The lifecycle tag a registry assigns to a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityState {
    /// Not tracked; mutations have no persistence effect.
    Detached,
    /// Newly registered; the next commit inserts it.
    Added,
    /// Persisted; current values match the snapshot.
    Unchanged,
    /// Persisted; at least one field differs from the snapshot.
    Modified,
    /// Marked for removal; the next commit deletes it.
    Deleted,
}

impl core::fmt::Display for EntityState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Detached => "Detached",
            Self::Added => "Added",
            Self::Unchanged => "Unchanged",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
        };
        write!(f, "{name}")
    }
}

/// Handle to a tracked entry within one unit-of-work scope.
///
/// Handles are scope-local: they are meaningless outside the unit of
/// work that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryId(u64);

impl core::fmt::Display for EntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Misuse of the tracking registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    /// The identity is already tracked; adding it again would duplicate
    /// the entry.
    #[error("{kind} with id {id} is already tracked")]
    AlreadyTracked {
        /// Entity kind name (table-ish label).
        kind: &'static str,
        /// The persisted identity that is already registered.
        id: i32,
    },

    /// The handle does not refer to a tracked entry in this scope.
    #[error("entry {0} is not tracked in this scope")]
    NotTracked(EntryId),

    /// The operation requires a persisted identity the entity lacks.
    #[error("{kind} has no persisted identity")]
    MissingIdentity {
        /// Entity kind name.
        kind: &'static str,
    },

    /// The entry is marked for deletion and cannot be mutated.
    #[error("entry {0} is marked Deleted and cannot be modified")]
    EntryDeleted(EntryId),
}

/// An entity a registry can track: identified by an optional persisted
/// integer identity.
pub trait TrackedEntity: Clone {
    /// Human-readable kind label used in errors and the registry listing.
    const KIND: &'static str;

    /// The persisted identity, if the entity exists in storage.
    fn persisted_id(&self) -> Option<i32>;

    /// Record the identity assigned by an insert.
    fn set_persisted_id(&mut self, id: i32);
}

/// One tracked entity: current values, snapshot, and state.
#[derive(Debug, Clone)]
pub struct TrackedEntry<T> {
    current: T,
    /// Last-persisted field values; `None` until first persisted.
    snapshot: Option<T>,
    state: EntityState,
}

impl<T: TrackedEntity> TrackedEntry<T> {
    /// The entity's current (possibly mutated) values.
    pub const fn current(&self) -> &T {
        &self.current
    }

    /// The entry's tracking state.
    pub const fn state(&self) -> EntityState {
        self.state
    }
}

/// Registry of tracked entries for one entity type within one scope.
#[derive(Debug)]
pub struct TrackedSet<T> {
    entries: BTreeMap<EntryId, TrackedEntry<T>>,
}

impl<T: TrackedEntity> TrackedSet<T> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a new entity for insertion. State becomes `Added`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::AlreadyTracked`] if the entity carries a
    /// persisted identity that is already registered in this scope.
    pub fn add(&mut self, entry: EntryId, entity: T) -> Result<EntryId, TrackError> {
        if let Some(id) = entity.persisted_id()
            && self.find_by_persisted_id(id).is_some()
        {
            return Err(TrackError::AlreadyTracked { kind: T::KIND, id });
        }

        self.entries.insert(
            entry,
            TrackedEntry {
                current: entity,
                snapshot: None,
                state: EntityState::Added,
            },
        );
        tracing::debug!(entry = %entry, kind = T::KIND, state = %EntityState::Added, "entity added");
        Ok(entry)
    }

    /// Register a pre-existing record without scheduling an insert.
    /// State becomes `Unchanged` and the snapshot is taken now.
    ///
    /// Attaching an identity that is already tracked is a no-op and
    /// returns the existing handle.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::MissingIdentity`] if the entity has no
    /// persisted identity.
    pub fn attach(&mut self, entry: EntryId, entity: T) -> Result<EntryId, TrackError> {
        let id = entity
            .persisted_id()
            .ok_or(TrackError::MissingIdentity { kind: T::KIND })?;

        if let Some(existing) = self.find_by_persisted_id(id) {
            return Ok(existing);
        }

        self.entries.insert(
            entry,
            TrackedEntry {
                snapshot: Some(entity.clone()),
                current: entity,
                state: EntityState::Unchanged,
            },
        );
        tracing::debug!(entry = %entry, kind = T::KIND, state = %EntityState::Unchanged, "entity attached");
        Ok(entry)
    }

    /// The current values of a tracked entity.
    pub fn get(&self, entry: EntryId) -> Option<&T> {
        self.entries.get(&entry).map(|e| &e.current)
    }

    /// The tracking state of an entry.
    pub fn state(&self, entry: EntryId) -> Option<EntityState> {
        self.entries.get(&entry).map(|e| e.state)
    }

    /// Apply a mutation through the registry.
    ///
    /// An `Unchanged` entry transitions to `Modified`; `Added` and
    /// `Modified` entries keep their state (the pending insert/update
    /// picks up the new values). Returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::NotTracked`] for unknown handles and
    /// [`TrackError::EntryDeleted`] for entries marked for deletion.
    pub fn update(
        &mut self,
        entry: EntryId,
        mutate: impl FnOnce(&mut T),
    ) -> Result<EntityState, TrackError> {
        let tracked = self
            .entries
            .get_mut(&entry)
            .ok_or(TrackError::NotTracked(entry))?;

        if tracked.state == EntityState::Deleted {
            return Err(TrackError::EntryDeleted(entry));
        }

        mutate(&mut tracked.current);
        if tracked.state == EntityState::Unchanged {
            tracked.state = EntityState::Modified;
        }
        tracing::debug!(entry = %entry, kind = T::KIND, state = %tracked.state, "entity mutated");
        Ok(tracked.state)
    }

    /// Mark an entry for deletion.
    ///
    /// A persisted entry transitions to `Deleted`; an `Added` entry was
    /// never inserted, so it is simply detached. Returns the resulting
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::NotTracked`] for unknown handles.
    pub fn remove(&mut self, entry: EntryId) -> Result<EntityState, TrackError> {
        let tracked = self
            .entries
            .get_mut(&entry)
            .ok_or(TrackError::NotTracked(entry))?;

        let next = if tracked.state == EntityState::Added {
            self.entries.remove(&entry);
            EntityState::Detached
        } else {
            tracked.state = EntityState::Deleted;
            EntityState::Deleted
        };
        tracing::debug!(entry = %entry, kind = T::KIND, state = %next, "entity removed");
        Ok(next)
    }

    /// Stop tracking an entry unconditionally, regardless of prior state.
    ///
    /// Returns `true` if the entry was tracked.
    pub fn detach(&mut self, entry: EntryId) -> bool {
        let removed = self.entries.remove(&entry).is_some();
        if removed {
            tracing::debug!(entry = %entry, kind = T::KIND, state = %EntityState::Detached, "entity detached");
        }
        removed
    }

    /// Restore every pending entry to its last-persisted shape.
    ///
    /// `Modified` entries get their snapshot values back and become
    /// `Unchanged`; `Added` entries are detached; `Deleted` entries are
    /// restored to `Unchanged` (presence restored -- the pending delete
    /// is cancelled).
    pub fn revert(&mut self) {
        let mut dropped: Vec<EntryId> = Vec::new();

        for (entry, tracked) in &mut self.entries {
            match tracked.state {
                EntityState::Modified | EntityState::Deleted => {
                    if let Some(snapshot) = &tracked.snapshot {
                        tracked.current = snapshot.clone();
                    }
                    tracked.state = EntityState::Unchanged;
                }
                EntityState::Added => dropped.push(*entry),
                EntityState::Unchanged | EntityState::Detached => {}
            }
        }

        for entry in dropped {
            self.entries.remove(&entry);
        }
        tracing::debug!(kind = T::KIND, "pending changes reverted");
    }

    /// Iterate over entries in handle order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &TrackedEntry<T>)> {
        self.entries.iter().map(|(entry, tracked)| (*entry, tracked))
    }

    /// Whether any entry is pending persistence work.
    pub fn has_pending(&self) -> bool {
        self.entries
            .values()
            .any(|e| e.state != EntityState::Unchanged)
    }

    /// Transition states after a successful commit.
    ///
    /// `assigned` carries the identities generated for `Added` entries.
    /// `Added`/`Modified` become `Unchanged` with refreshed snapshots;
    /// `Deleted` entries leave the registry (now `Detached`).
    pub fn apply_commit(&mut self, assigned: &[(EntryId, i32)]) {
        for (entry, id) in assigned {
            if let Some(tracked) = self.entries.get_mut(entry) {
                tracked.current.set_persisted_id(*id);
            }
        }

        let mut dropped: Vec<EntryId> = Vec::new();
        for (entry, tracked) in &mut self.entries {
            match tracked.state {
                EntityState::Added | EntityState::Modified => {
                    tracked.snapshot = Some(tracked.current.clone());
                    tracked.state = EntityState::Unchanged;
                }
                EntityState::Deleted => dropped.push(*entry),
                EntityState::Unchanged | EntityState::Detached => {}
            }
        }
        for entry in dropped {
            self.entries.remove(&entry);
        }
    }

    /// Find the handle tracking a given persisted identity.
    pub fn find_by_persisted_id(&self, id: i32) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|(_, tracked)| tracked.current.persisted_id() == Some(id))
            .map(|(entry, _)| *entry)
    }
}

impl<T: TrackedEntity> Default for TrackedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic source of scope-local entry handles.
#[derive(Debug, Default)]
pub struct EntrySequence(u64);

impl EntrySequence {
    /// Create a sequence starting at the first handle.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Issue the next handle.
    pub const fn next_entry(&mut self) -> EntryId {
        self.0 = self.0.wrapping_add(1);
        EntryId(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: Option<i32>,
        label: String,
    }

    impl TrackedEntity for Widget {
        const KIND: &'static str = "widget";

        fn persisted_id(&self) -> Option<i32> {
            self.id
        }

        fn set_persisted_id(&mut self, id: i32) {
            self.id = Some(id);
        }
    }

    fn widget(id: Option<i32>) -> Widget {
        Widget {
            id,
            label: "original".to_owned(),
        }
    }

    fn set_with(entity: Widget) -> (TrackedSet<Widget>, EntryId) {
        let mut seq = EntrySequence::new();
        let mut set = TrackedSet::new();
        let entry = seq.next_entry();
        let persisted = entity.id.is_some();
        let result = if persisted {
            set.attach(entry, entity)
        } else {
            set.add(entry, entity)
        };
        assert!(result.is_ok());
        (set, entry)
    }

    #[test]
    fn add_marks_entry_added() {
        let (set, entry) = set_with(widget(None));
        assert_eq!(set.state(entry), Some(EntityState::Added));
    }

    #[test]
    fn attach_marks_entry_unchanged() {
        let (set, entry) = set_with(widget(Some(1)));
        assert_eq!(set.state(entry), Some(EntityState::Unchanged));
    }

    #[test]
    fn attaching_same_identity_twice_is_a_noop() {
        let (mut set, entry) = set_with(widget(Some(1)));
        let mut seq = EntrySequence::new();
        let _ = seq.next_entry();

        let again = set.attach(seq.next_entry(), widget(Some(1)));
        assert_eq!(again, Ok(entry));
        assert_eq!(set.entries().count(), 1);
    }

    #[test]
    fn adding_tracked_identity_is_an_error() {
        let (mut set, _) = set_with(widget(Some(1)));
        let mut seq = EntrySequence::new();
        let _ = seq.next_entry();

        let result = set.add(seq.next_entry(), widget(Some(1)));
        assert_eq!(
            result,
            Err(TrackError::AlreadyTracked {
                kind: "widget",
                id: 1
            })
        );
    }

    #[test]
    fn mutation_transitions_unchanged_to_modified() {
        let (mut set, entry) = set_with(widget(Some(1)));

        let state = set.update(entry, |w| w.label = "renamed".to_owned());
        assert_eq!(state, Ok(EntityState::Modified));
        assert_eq!(set.get(entry).map(|w| w.label.as_str()), Some("renamed"));
    }

    #[test]
    fn mutation_keeps_added_state() {
        let (mut set, entry) = set_with(widget(None));

        let state = set.update(entry, |w| w.label = "renamed".to_owned());
        assert_eq!(state, Ok(EntityState::Added));
    }

    #[test]
    fn deleted_entry_rejects_mutation() {
        let (mut set, entry) = set_with(widget(Some(1)));
        assert_eq!(set.remove(entry), Ok(EntityState::Deleted));

        let result = set.update(entry, |w| w.label = "renamed".to_owned());
        assert_eq!(result, Err(TrackError::EntryDeleted(entry)));
    }

    #[test]
    fn removing_added_entry_detaches_it() {
        let (mut set, entry) = set_with(widget(None));
        assert_eq!(set.remove(entry), Ok(EntityState::Detached));
        assert_eq!(set.state(entry), None);
    }

    #[test]
    fn revert_restores_snapshot_values() {
        let (mut set, entry) = set_with(widget(Some(1)));
        let _ = set.update(entry, |w| w.label = "renamed".to_owned());

        set.revert();

        assert_eq!(set.state(entry), Some(EntityState::Unchanged));
        assert_eq!(set.get(entry).map(|w| w.label.as_str()), Some("original"));
    }

    #[test]
    fn revert_detaches_added_entries() {
        let (mut set, entry) = set_with(widget(None));
        set.revert();
        assert_eq!(set.state(entry), None);
    }

    #[test]
    fn revert_restores_deleted_entry() {
        // The observed ORM left Deleted entries untouched on revert; the
        // defensible semantic restores presence, so Deleted -> Unchanged.
        let (mut set, entry) = set_with(widget(Some(1)));
        assert_eq!(set.remove(entry), Ok(EntityState::Deleted));

        set.revert();

        assert_eq!(set.state(entry), Some(EntityState::Unchanged));
    }

    #[test]
    fn apply_commit_refreshes_states_and_snapshots() {
        let mut seq = EntrySequence::new();
        let mut set = TrackedSet::new();

        let added = seq.next_entry();
        assert!(set.add(added, widget(None)).is_ok());

        let attached = seq.next_entry();
        assert!(set.attach(attached, widget(Some(9))).is_ok());
        let _ = set.update(attached, |w| w.label = "renamed".to_owned());

        let removed = seq.next_entry();
        assert!(set.attach(removed, widget(Some(10))).is_ok());
        assert_eq!(set.remove(removed), Ok(EntityState::Deleted));

        set.apply_commit(&[(added, 42)]);

        assert_eq!(set.state(added), Some(EntityState::Unchanged));
        assert_eq!(set.get(added).and_then(Widget::persisted_id), Some(42));
        assert_eq!(set.state(attached), Some(EntityState::Unchanged));
        assert_eq!(set.state(removed), None);

        // A fresh mutation after commit must diff against the new snapshot.
        let state = set.update(attached, |w| w.label = "renamed".to_owned());
        assert_eq!(state, Ok(EntityState::Modified));
    }
}
