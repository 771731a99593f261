//! PostgreSQL-backed store.
//!
//! Follows the plain-sqlx style used across the workspace: `sqlx::query` with
//! positional binds, row decoding via `try_get`, embedded migrations. Order
//! creation wraps the order shell and every line item in a single
//! transaction, so a mid-list failure (unknown pizza id) commits nothing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use pza_schemas::{LineItem, NewPizza, OrderRecord, OrderStatus, PizzaRecord};

use crate::{normalize_toppings, validate_items, OrderStore, StoreError};

pub const ENV_DB_URL: &str = "PZA_DATABASE_URL";

/// Connect to Postgres using PZA_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// PostgreSQL [`OrderStore`] implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<LineItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            select pizza_id, quantity
            from order_items
            where order_id = $1
            order by pizza_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.iter()
            .map(|row| {
                Ok(LineItem {
                    pizza_id: row.try_get("pizza_id").map_err(unavailable)?,
                    quantity: row.try_get("quantity").map_err(unavailable)?,
                })
            })
            .collect()
    }

    fn order_from_row(row: &sqlx::postgres::PgRow, items: Vec<LineItem>) -> Result<OrderRecord, StoreError> {
        let status_raw: String = row.try_get("status").map_err(unavailable)?;
        let status = OrderStatus::parse(&status_raw)
            .ok_or_else(|| StoreError::Unavailable(format!("corrupt order status: {status_raw}")))?;
        Ok(OrderRecord {
            id: row.try_get("id").map_err(unavailable)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(unavailable)?,
            status,
            status_changed_at: row
                .try_get::<DateTime<Utc>, _>("status_changed_at")
                .map_err(unavailable)?,
            items,
        })
    }
}

/// Backend failures are reported as transient; callers with pending writes
/// retry them.
fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_pizza(&self, new: NewPizza) -> Result<PizzaRecord, StoreError> {
        let topping_ids = normalize_toppings(new.topping_ids);

        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let row = sqlx::query(
            r#"
            insert into pizzas (base_id, cheese_id)
            values ($1, $2)
            returning id
            "#,
        )
        .bind(new.base_id)
        .bind(new.cheese_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(unavailable)?;
        let id: i64 = row.try_get("id").map_err(unavailable)?;

        for &topping_id in &topping_ids {
            sqlx::query(
                r#"
                insert into pizza_toppings (pizza_id, topping_id)
                values ($1, $2)
                "#,
            )
            .bind(id)
            .bind(topping_id)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        }

        tx.commit().await.map_err(unavailable)?;

        Ok(PizzaRecord {
            id,
            base_id: new.base_id,
            cheese_id: new.cheese_id,
            topping_ids,
        })
    }

    async fn fetch_pizza(&self, id: i64) -> Result<PizzaRecord, StoreError> {
        let row = sqlx::query(
            r#"
            select id, base_id, cheese_id
            from pizzas
            where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .ok_or(StoreError::PizzaNotFound(id))?;

        let topping_rows = sqlx::query(
            r#"
            select topping_id
            from pizza_toppings
            where pizza_id = $1
            order by topping_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let topping_ids = topping_rows
            .iter()
            .map(|r| r.try_get("topping_id").map_err(unavailable))
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(PizzaRecord {
            id: row.try_get("id").map_err(unavailable)?,
            base_id: row.try_get("base_id").map_err(unavailable)?,
            cheese_id: row.try_get("cheese_id").map_err(unavailable)?,
            topping_ids,
        })
    }

    async fn create_order(&self, items: &[LineItem]) -> Result<OrderRecord, StoreError> {
        validate_items(items)?;

        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        // Every pizza reference must resolve before anything is committed.
        for item in items {
            let found = sqlx::query("select 1 from pizzas where id = $1")
                .bind(item.pizza_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(unavailable)?;
            if found.is_none() {
                // Dropping the open transaction rolls it back.
                return Err(StoreError::PizzaNotFound(item.pizza_id));
            }
        }

        let row = sqlx::query(
            r#"
            insert into orders (status)
            values ($1)
            returning id, created_at, status_changed_at
            "#,
        )
        .bind(OrderStatus::Placed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(unavailable)?;

        let id: i64 = row.try_get("id").map_err(unavailable)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(unavailable)?;
        let status_changed_at: DateTime<Utc> =
            row.try_get("status_changed_at").map_err(unavailable)?;

        for item in items {
            sqlx::query(
                r#"
                insert into order_items (order_id, pizza_id, quantity)
                values ($1, $2, $3)
                "#,
            )
            .bind(id)
            .bind(item.pizza_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        }

        tx.commit().await.map_err(unavailable)?;

        Ok(OrderRecord {
            id,
            created_at,
            status: OrderStatus::Placed,
            status_changed_at,
            items: items.to_vec(),
        })
    }

    async fn fetch_order(&self, id: i64) -> Result<OrderRecord, StoreError> {
        let row = sqlx::query(
            r#"
            select id, created_at, status, status_changed_at
            from orders
            where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .ok_or(StoreError::OrderNotFound(id))?;

        let items = self.fetch_order_items(id).await?;
        Self::order_from_row(&row, items)
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            update orders
            set status = $2,
                status_changed_at = now()
            where id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }
        Ok(())
    }

    async fn list_in_flight(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            select id, created_at, status, status_changed_at
            from orders
            where status <> $1
            order by id
            "#,
        )
        .bind(OrderStatus::Delivered.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(unavailable)?;
            let items = self.fetch_order_items(id).await?;
            out.push(Self::order_from_row(row, items)?);
        }
        Ok(out)
    }
}
