use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::foods::dto::FoodPage;
use crate::foods::query::{FoodFilter, PageRequest};
use crate::foods::repo::FoodStore;
use crate::foods::repo_types::{FoodFields, FoodRecord};

pub async fn query_foods(
    store: &dyn FoodStore,
    filter: &FoodFilter,
    page: PageRequest,
) -> Result<FoodPage, AppError> {
    let (total, items) = store.search(filter, page).await?;
    debug!(total, returned = items.len(), page = page.page, "foods queried");
    Ok(FoodPage {
        total,
        page: page.page,
        per_page: page.per_page,
        items,
    })
}

pub async fn get_food(store: &dyn FoodStore, id: Uuid) -> Result<FoodRecord, AppError> {
    store.find(id).await?.ok_or(AppError::NotFound)
}

pub async fn create_food(store: &dyn FoodStore, fields: FoodFields) -> Result<FoodRecord, AppError> {
    let record = store.insert(fields).await?;
    info!(id = %record.id, "food created");
    Ok(record)
}

pub async fn replace_food(
    store: &dyn FoodStore,
    id: Uuid,
    fields: FoodFields,
) -> Result<FoodRecord, AppError> {
    let record = store.replace(id, fields).await?.ok_or(AppError::NotFound)?;
    info!(id = %record.id, "food replaced");
    Ok(record)
}

pub async fn delete_food(store: &dyn FoodStore, id: Uuid) -> Result<Uuid, AppError> {
    let deleted = store.delete(id).await?.ok_or(AppError::NotFound)?;
    info!(id = %deleted, "food deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::memory::MemoryFoodStore;

    async fn seeded(names: &[&str]) -> MemoryFoodStore {
        let store = MemoryFoodStore::new();
        for name in names {
            store
                .insert(FoodFields {
                    food_name: Some(name.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn total_is_stable_across_pages() {
        let store = seeded(&["a1", "a2", "a3", "a4", "a5", "zz"]).await;
        let filter = FoodFilter {
            food_name: Some("A".into()),
            ..Default::default()
        };

        let mut seen = Vec::new();
        for page in 1..=3 {
            let result = query_foods(&store, &filter, PageRequest { page, per_page: 2 })
                .await
                .unwrap();
            assert_eq!(result.total, 5);
            assert_eq!(result.per_page, 2);
            assert!(result.items.len() <= 2);
            seen.extend(result.items.into_iter().map(|r| r.fields.food_name.unwrap()));
        }
        assert_eq!(seen, vec!["a1", "a2", "a3", "a4", "a5"]);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = seeded(&[]).await;
        let id = Uuid::new_v4();
        assert!(matches!(get_food(&store, id).await, Err(AppError::NotFound)));
        assert!(matches!(delete_food(&store, id).await, Err(AppError::NotFound)));
        let fields = FoodFields {
            food_code: Some("X".into()),
            ..Default::default()
        };
        assert!(matches!(
            replace_food(&store, id, fields).await,
            Err(AppError::NotFound)
        ));
    }
}
