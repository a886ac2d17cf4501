use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::ConcurrencyToken;
use crate::domain::persistence::{EntityKind, Mutation, Record};
use std::collections::HashMap;
use uuid::Uuid;

type Key = (EntityKind, Uuid);

/// A change waiting for the next flush.
#[derive(Debug, Clone)]
pub enum Staged {
    Add(Record),
    Update(Record),
    Delete { expected: Option<ConcurrencyToken> },
}

/// Pending mutations keyed by entity identity, flushed in first-staged order.
///
/// Staging the same identity twice merges into one change instead of
/// queueing both, so a flush never sends contradictory writes for a row.
#[derive(Debug, Default)]
pub struct ChangeSet {
    slots: Vec<Option<(Key, Staged)>>,
    index: HashMap<Key, usize>,
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, kind: EntityKind, id: Uuid) -> Option<&Staged> {
        let slot = *self.index.get(&(kind, id))?;
        self.slots[slot].as_ref().map(|(_, staged)| staged)
    }

    pub fn stage_add(&mut self, record: Record) -> DomainResult<()> {
        let key = (record.kind(), record.id());
        match self.get(key.0, key.1) {
            Some(Staged::Delete { .. }) => Err(DomainError::validation(format!(
                "{} {} is staged for deletion and cannot be added again",
                key.0, key.1
            ))),
            Some(_) => Err(DomainError::validation(format!(
                "{} {} is already tracked",
                key.0, key.1
            ))),
            None => {
                self.push(key, Staged::Add(record));
                Ok(())
            }
        }
    }

    pub fn stage_update(&mut self, record: Record) -> DomainResult<()> {
        let key = (record.kind(), record.id());
        let Some(&slot) = self.index.get(&key) else {
            self.push(key, Staged::Update(record));
            return Ok(());
        };
        let entry = &mut self.slots[slot];
        match entry.as_mut().map(|(_, staged)| staged) {
            Some(Staged::Add(current) | Staged::Update(current)) => {
                *current = record;
                Ok(())
            }
            Some(Staged::Delete { .. }) => Err(DomainError::validation(format!(
                "{} {} is staged for deletion and cannot be updated",
                key.0, key.1
            ))),
            None => {
                self.push(key, Staged::Update(record));
                Ok(())
            }
        }
    }

    pub fn stage_delete(&mut self, kind: EntityKind, id: Uuid, expected: Option<ConcurrencyToken>) {
        let key = (kind, id);
        let Some(&slot) = self.index.get(&key) else {
            self.push(key, Staged::Delete { expected });
            return;
        };
        let entry = &mut self.slots[slot];
        match entry.as_ref().map(|(_, staged)| staged) {
            // never reached the store, so there is nothing to delete
            Some(Staged::Add(_)) => {
                *entry = None;
                self.index.remove(&key);
            }
            Some(Staged::Update(record)) => {
                let expected = record.concurrency_token().or(expected);
                *entry = Some((key, Staged::Delete { expected }));
            }
            Some(Staged::Delete { .. }) | None => {}
        }
    }

    /// Drain every pending change as store mutations, leaving the set empty.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        self.index.clear();
        std::mem::take(&mut self.slots)
            .into_iter()
            .flatten()
            .map(|((kind, id), staged)| match staged {
                Staged::Add(record) => Mutation::Insert(record),
                Staged::Update(record) => Mutation::Update(record),
                Staged::Delete { expected } => Mutation::Delete { kind, id, expected },
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    fn push(&mut self, key: Key, staged: Staged) {
        self.index.insert(key, self.slots.len());
        self.slots.push(Some((key, staged)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persistence::Entity;
    use crate::domain::tag::{Tag, TagName, TagSlug};
    use chrono::Utc;

    fn tag(name: &str) -> Tag {
        Tag::new(
            TagName::new(name).unwrap(),
            TagSlug::new(name.to_lowercase()).unwrap(),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn add_then_update_stays_an_insert_with_latest_state() {
        let mut changes = ChangeSet::default();
        let mut rust = tag("rust");
        changes.stage_add(rust.clone().into_record()).unwrap();
        rust.set_description(Some("systems".into())).unwrap();
        changes.stage_update(rust.clone().into_record()).unwrap();

        let mutations = changes.take_mutations();
        assert_eq!(mutations.len(), 1);
        match &mutations[0] {
            Mutation::Insert(Record::Tag(staged)) => {
                assert_eq!(staged.description.as_deref(), Some("systems"));
            }
            other => panic!("unexpected mutation {other:?}"),
        }
        assert!(changes.is_empty());
    }

    #[test]
    fn add_then_delete_cancels_out() {
        let mut changes = ChangeSet::default();
        let rust = tag("rust");
        changes.stage_add(rust.clone().into_record()).unwrap();
        changes.stage_delete(EntityKind::Tag, rust.id.into(), None);
        assert!(changes.is_empty());
        assert!(changes.take_mutations().is_empty());
    }

    #[test]
    fn update_then_delete_becomes_delete() {
        let mut changes = ChangeSet::default();
        let rust = tag("rust");
        changes.stage_update(rust.clone().into_record()).unwrap();
        changes.stage_delete(EntityKind::Tag, rust.id.into(), None);
        let mutations = changes.take_mutations();
        assert!(matches!(mutations.as_slice(), [Mutation::Delete { .. }]));
    }

    #[test]
    fn duplicate_add_and_readd_after_delete_are_rejected() {
        let mut changes = ChangeSet::default();
        let rust = tag("rust");
        changes.stage_add(rust.clone().into_record()).unwrap();
        assert!(changes.stage_add(rust.clone().into_record()).is_err());

        let go = tag("go");
        changes.stage_delete(EntityKind::Tag, go.id.into(), None);
        assert!(changes.stage_add(go.into_record()).is_err());
    }

    #[test]
    fn flush_preserves_first_staged_order() {
        let mut changes = ChangeSet::default();
        let (a, b, c) = (tag("a"), tag("b"), tag("c"));
        changes.stage_add(a.clone().into_record()).unwrap();
        changes.stage_add(b.clone().into_record()).unwrap();
        changes.stage_add(c.clone().into_record()).unwrap();
        changes.stage_update(a.clone().into_record()).unwrap();

        let ids: Vec<Uuid> = changes.take_mutations().iter().map(Mutation::id).collect();
        assert_eq!(ids, vec![a.id.as_uuid(), b.id.as_uuid(), c.id.as_uuid()]);
    }
}
