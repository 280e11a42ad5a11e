use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::foods::query::{FoodFilter, PageRequest};
use crate::foods::repo::FoodStore;
use crate::foods::repo_types::{FoodFields, FoodRecord};

/// In-process store; records live in insertion order.
#[derive(Default)]
pub struct MemoryFoodStore {
    records: RwLock<Vec<FoodRecord>>,
}

impl MemoryFoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FoodStore for MemoryFoodStore {
    async fn insert(&self, fields: FoodFields) -> anyhow::Result<FoodRecord> {
        if !fields.has_identity() {
            anyhow::bail!("food_name or food_code is required");
        }
        let now = OffsetDateTime::now_utc();
        let record = FoodRecord {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<FoodRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn search(
        &self,
        filter: &FoodFilter,
        page: PageRequest,
    ) -> anyhow::Result<(i64, Vec<FoodRecord>)> {
        let records = self.records.read().await;
        let matching: Vec<&FoodRecord> = records.iter().filter(|r| filter.matches(r)).collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(0))
            .cloned()
            .collect();
        Ok((total, items))
    }

    async fn replace(&self, id: Uuid, fields: FoodFields) -> anyhow::Result<Option<FoodRecord>> {
        if !fields.has_identity() {
            anyhow::bail!("food_name or food_code is required");
        }
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.fields = fields;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let mut records = self.records.write().await;
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        Ok(Some(records.remove(pos).id))
    }
}
