//! In-memory mapping repository
//!
//! Used for tests and ephemeral runs. Check-and-insert happens under a
//! single write lock, which gives the same at-most-one-row guarantee as the
//! unique index in PostgreSQL.

use super::{
    InsertOutcome, Mapping, MappingPage, MappingRepository, MappingStatistics, NewMapping,
    TimeRange,
};
use crate::anonymization::models::EntityType;
use crate::domain::{MasqueradeError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, Mapping>,
    index: HashMap<(String, EntityType), i64>,
}

impl State {
    fn find(&self, fingerprint: &str, entity_type: &EntityType) -> Option<i64> {
        self.index
            .get(&(fingerprint.to_string(), entity_type.clone()))
            .copied()
    }
}

/// Process-local repository; contents are lost on exit
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| MasqueradeError::StoreUnavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| MasqueradeError::StoreUnavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl MappingRepository for InMemoryRepository {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn test_connection(&self) -> Result<()> {
        self.read().map(|_| ())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn lookup(&self, fingerprint: &str, entity_type: &EntityType) -> Result<Option<Mapping>> {
        let state = self.read()?;
        Ok(state
            .find(fingerprint, entity_type)
            .and_then(|id| state.rows.get(&id))
            .cloned())
    }

    async fn record_use(
        &self,
        fingerprint: &str,
        entity_type: &EntityType,
    ) -> Result<Option<Mapping>> {
        let mut state = self.write()?;
        let Some(id) = state.find(fingerprint, entity_type) else {
            return Ok(None);
        };
        Ok(state.rows.get_mut(&id).map(|mapping| {
            mapping.use_count += 1;
            mapping.last_used = Utc::now();
            mapping.clone()
        }))
    }

    async fn insert_if_absent(&self, new: NewMapping) -> Result<InsertOutcome> {
        let mut state = self.write()?;
        if state.find(&new.fingerprint, &new.entity_type).is_some() {
            return Ok(InsertOutcome::Conflict);
        }

        state.next_id += 1;
        let now = Utc::now();
        let mapping = Mapping {
            id: state.next_id,
            fingerprint: new.fingerprint,
            entity_type: new.entity_type,
            substitute: new.substitute,
            first_seen: now,
            last_used: now,
            use_count: 1,
        };
        state.index.insert(
            (mapping.fingerprint.clone(), mapping.entity_type.clone()),
            mapping.id,
        );
        state.rows.insert(mapping.id, mapping.clone());
        Ok(InsertOutcome::Inserted(mapping))
    }

    async fn list(
        &self,
        limit: usize,
        offset: usize,
        entity_type: Option<&EntityType>,
    ) -> Result<MappingPage> {
        let state = self.read()?;
        let mut matching: Vec<&Mapping> = state
            .rows
            .values()
            .filter(|m| entity_type.map_or(true, |t| &m.entity_type == t))
            .collect();
        matching.sort_by(|a, b| b.first_seen.cmp(&a.first_seen).then(b.id.cmp(&a.id)));

        Ok(MappingPage {
            total: matching.len() as u64,
            mappings: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            limit,
            offset,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Mapping>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn update_substitute(&self, id: i64, substitute: &str) -> Result<Option<Mapping>> {
        let mut state = self.write()?;
        Ok(state.rows.get_mut(&id).map(|mapping| {
            mapping.substitute = substitute.to_string();
            mapping.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.write()?;
        match state.rows.remove(&id) {
            Some(mapping) => {
                state
                    .index
                    .remove(&(mapping.fingerprint, mapping.entity_type));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut state = self.write()?;
        let removed = state.rows.len() as u64;
        state.rows.clear();
        state.index.clear();
        Ok(removed)
    }

    async fn list_by_time_range(&self, range: &TimeRange) -> Result<Vec<Mapping>> {
        let state = self.read()?;
        let mut matching: Vec<Mapping> = state
            .rows
            .values()
            .filter(|m| range.contains(m))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.first_seen.cmp(&b.first_seen).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn statistics(&self) -> Result<MappingStatistics> {
        Ok(MappingStatistics::from_mappings(self.read()?.rows.values()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.rows.len() as u64)
    }
}
