use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::foods::query::{FoodFilter, PageRequest};
use crate::foods::repo_types::{FoodFields, FoodRecord};

/// Persistence service for food records.
///
/// Implementations own their connection resources; callers hold the store
/// behind an `Arc` for the lifetime of the process and call [`FoodStore::close`]
/// once on shutdown.
#[async_trait]
pub trait FoodStore: Send + Sync {
    async fn insert(&self, fields: FoodFields) -> anyhow::Result<FoodRecord>;

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<FoodRecord>>;

    /// Returns the total number of matches and the requested page, in insertion order.
    async fn search(
        &self,
        filter: &FoodFilter,
        page: PageRequest,
    ) -> anyhow::Result<(i64, Vec<FoodRecord>)>;

    async fn replace(&self, id: Uuid, fields: FoodFields) -> anyhow::Result<Option<FoodRecord>>;

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Uuid>>;

    async fn close(&self) {}
}

const COLUMNS: &str = "id, food_code, food_name, group_name, research_year, maker_name, \
     reference_name, serving_size, calorie, carbohydrate, protein, fat, sugars, sodium, \
     cholesterol, saturated_fatty_acids, trans_fat, created_at, updated_at";

const FILTER: &str = r#"
    ($1::text IS NULL OR strpos(lower(food_name), lower($1)) > 0)
    AND ($2::text IS NULL OR strpos(lower(maker_name), lower($2)) > 0)
    AND ($3::text IS NULL OR research_year = $3)
    AND ($4::text IS NULL OR food_code = $4)
"#;

#[derive(Clone)]
pub struct PgFoodStore {
    pool: PgPool,
}

impl PgFoodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bind_fields(
    q: QueryAs<'_, Postgres, FoodRecord, PgArguments>,
    f: FoodFields,
) -> QueryAs<'_, Postgres, FoodRecord, PgArguments> {
    q.bind(f.food_code)
        .bind(f.food_name)
        .bind(f.group_name)
        .bind(f.research_year)
        .bind(f.maker_name)
        .bind(f.reference_name)
        .bind(f.serving_size)
        .bind(f.calorie)
        .bind(f.carbohydrate)
        .bind(f.protein)
        .bind(f.fat)
        .bind(f.sugars)
        .bind(f.sodium)
        .bind(f.cholesterol)
        .bind(f.saturated_fatty_acids)
        .bind(f.trans_fat)
}

#[async_trait]
impl FoodStore for PgFoodStore {
    async fn insert(&self, fields: FoodFields) -> anyhow::Result<FoodRecord> {
        let sql = format!(
            r#"
            INSERT INTO foods (id, food_code, food_name, group_name, research_year, maker_name,
                               reference_name, serving_size, calorie, carbohydrate, protein, fat,
                               sugars, sodium, cholesterol, saturated_fatty_acids, trans_fat)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {COLUMNS}
            "#
        );
        let q = sqlx::query_as::<_, FoodRecord>(&sql).bind(Uuid::new_v4());
        let record = bind_fields(q, fields)
            .fetch_one(&self.pool)
            .await
            .context("insert food")?;
        debug!(id = %record.id, "food inserted");
        Ok(record)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<FoodRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM foods WHERE id = $1");
        let record = sqlx::query_as::<_, FoodRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("find food")?;
        Ok(record)
    }

    async fn search(
        &self,
        filter: &FoodFilter,
        page: PageRequest,
    ) -> anyhow::Result<(i64, Vec<FoodRecord>)> {
        // count and page come from one snapshot
        let mut tx = self.pool.begin().await.context("begin search")?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM foods WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.food_name.as_deref())
            .bind(filter.maker_name.as_deref())
            .bind(filter.research_year.as_deref())
            .bind(filter.food_code.as_deref())
            .fetch_one(&mut *tx)
            .await
            .context("count foods")?;

        let list_sql = format!(
            "SELECT {COLUMNS} FROM foods WHERE {FILTER} ORDER BY seq ASC LIMIT $5 OFFSET $6"
        );
        let items = sqlx::query_as::<_, FoodRecord>(&list_sql)
            .bind(filter.food_name.as_deref())
            .bind(filter.maker_name.as_deref())
            .bind(filter.research_year.as_deref())
            .bind(filter.food_code.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await
            .context("list foods")?;

        tx.commit().await?;
        Ok((total, items))
    }

    async fn replace(&self, id: Uuid, fields: FoodFields) -> anyhow::Result<Option<FoodRecord>> {
        let sql = format!(
            r#"
            UPDATE foods
            SET food_code = $2, food_name = $3, group_name = $4, research_year = $5,
                maker_name = $6, reference_name = $7, serving_size = $8, calorie = $9,
                carbohydrate = $10, protein = $11, fat = $12, sugars = $13, sodium = $14,
                cholesterol = $15, saturated_fatty_acids = $16, trans_fat = $17,
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let q = sqlx::query_as::<_, FoodRecord>(&sql).bind(id);
        let record = bind_fields(q, fields)
            .fetch_optional(&self.pool)
            .await
            .context("replace food")?;
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let deleted = sqlx::query_scalar::<_, Uuid>("DELETE FROM foods WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("delete food")?;
        Ok(deleted)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
