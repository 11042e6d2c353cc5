//! Identity-keyed entity cache.
//!
//! One `Cache` holds one entity family for one view. Insertion order is
//! preserved (feeds render in arrival order); `upsert` replaces by id and
//! never appends a duplicate.

use indexmap::IndexMap;
use std::hash::Hash;
use verdant_core::{
    Badge, BadgeId, Goal, GoalId, GroupId, GroupSummary, Plant, PlantId, ReflectionEntry,
    ReflectionId,
};

/// An entity with a stable identity and a rendered-field equality test.
pub trait Identified {
    /// Identity type.
    type Id: Copy + Eq + Hash;

    /// The entity's id.
    fn id(&self) -> Self::Id;

    /// Whether a view rendering `self` would display exactly the same
    /// thing for `other`. Local bookkeeping fields are excluded.
    fn renders_same_as(&self, other: &Self) -> bool;
}

impl Identified for Goal {
    type Id = GoalId;

    fn id(&self) -> GoalId {
        self.id
    }

    fn renders_same_as(&self, other: &Self) -> bool {
        Goal::renders_same_as(self, other)
    }
}

impl Identified for ReflectionEntry {
    type Id = ReflectionId;

    fn id(&self) -> ReflectionId {
        self.id
    }

    fn renders_same_as(&self, other: &Self) -> bool {
        ReflectionEntry::renders_same_as(self, other)
    }
}

impl Identified for Plant {
    type Id = PlantId;

    fn id(&self) -> PlantId {
        self.id
    }

    fn renders_same_as(&self, other: &Self) -> bool {
        self == other
    }
}

impl Identified for Badge {
    type Id = BadgeId;

    fn id(&self) -> BadgeId {
        self.id
    }

    fn renders_same_as(&self, other: &Self) -> bool {
        self == other
    }
}

impl Identified for GroupSummary {
    type Id = GroupId;

    fn id(&self) -> GroupId {
        self.id
    }

    fn renders_same_as(&self, other: &Self) -> bool {
        self == other
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The id was new; the entity was appended.
    Inserted,
    /// The id existed and at least one rendered field changed.
    Updated,
    /// The id existed with identical rendered fields; nothing happened.
    Unchanged,
}

impl Applied {
    /// Whether the cache contents changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Insertion-ordered, identity-keyed store for one entity family.
#[derive(Debug, Clone, Default)]
pub struct Cache<T: Identified> {
    items: IndexMap<T::Id, T>,
}

impl<T: Identified> Cache<T> {
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Insert or replace by id. Replacing with identical rendered fields
    /// reports [`Applied::Unchanged`] and keeps the existing value, so
    /// a duplicated delivery is a true no-op.
    pub fn upsert(&mut self, item: T) -> Applied {
        match self.items.get(&item.id()) {
            Some(existing) if existing.renders_same_as(&item) => Applied::Unchanged,
            Some(_) => {
                self.items.insert(item.id(), item);
                Applied::Updated
            }
            None => {
                self.items.insert(item.id(), item);
                Applied::Inserted
            }
        }
    }

    /// Seed from a snapshot: insert only if the id is absent.
    ///
    /// A snapshot is a point-in-time read requested earlier than any push
    /// delta that raced with it, so an entity the push path already wrote
    /// is fresher than the snapshot's copy. Skipping present ids makes
    /// the final state independent of which path completed first.
    pub fn seed(&mut self, item: T) -> Applied {
        if self.items.contains_key(&item.id()) {
            return Applied::Unchanged;
        }
        self.items.insert(item.id(), item);
        Applied::Inserted
    }

    /// Remove by id; unknown ids are a no-op.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.items.shift_remove(&id)
    }

    /// Look up by id.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.get(&id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    /// Whether the id is present.
    pub fn contains(&self, id: T::Id) -> bool {
        self.items.contains_key(&id)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop everything, e.g. before a snapshot rebuild.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Find the first entity matching a predicate.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.values().find(|item| pred(item))
    }
}

impl<T: Identified> FromIterator<T> for Cache<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut cache = Self::new();
        for item in iter {
            cache.upsert(item);
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::UserId;

    fn goal(id: u64, progress: u8) -> Goal {
        Goal {
            id: GoalId::new(id),
            title: format!("goal {id}"),
            progress,
            created_by: UserId::new(1),
            ..Goal::default()
        }
    }

    #[test]
    fn upsert_never_duplicates() {
        let mut cache = Cache::new();
        assert_eq!(cache.upsert(goal(1, 10)), Applied::Inserted);
        assert_eq!(cache.upsert(goal(1, 10)), Applied::Unchanged);
        assert_eq!(cache.upsert(goal(1, 60)), Applied::Updated);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(GoalId::new(1)).unwrap().progress, 60);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut cache: Cache<Goal> = Cache::new();
        assert!(cache.remove(GoalId::new(5)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let cache: Cache<Goal> = [goal(3, 0), goal(1, 0), goal(2, 0)].into_iter().collect();
        let ids: Vec<u64> = cache.iter().map(|g| g.id.value()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
