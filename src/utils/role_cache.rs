use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::model::role::ApproverRole;
use crate::repository::{RepositoryError, RoleTable};

/// (department_id, position_id)
type RoleKey = (u64, u64);

/// Resolves a session's approver role, caching the backend mapping.
/// Positions without a role are cached too, as `None`.
pub struct RoleDirectory {
    table: Arc<dyn RoleTable>,
    cache: Cache<RoleKey, Option<ApproverRole>>,
}

impl RoleDirectory {
    pub fn new(table: Arc<dyn RoleTable>, ttl: Duration) -> Self {
        Self {
            table,
            cache: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn resolve(
        &self,
        department_id: u64,
        position_id: u64,
    ) -> Result<Option<ApproverRole>, RepositoryError> {
        let key = (department_id, position_id);
        if let Some(role) = self.cache.get(&key).await {
            return Ok(role);
        }

        let role = self.table.lookup(department_id, position_id).await?;
        self.cache.insert(key, role).await;
        Ok(role)
    }

    async fn batch_insert(&self, rows: &[(RoleKey, ApproverRole)]) {
        let futures: Vec<_> = rows
            .iter()
            .map(|(key, role)| self.cache.insert(*key, Some(*role)))
            .collect();

        futures::future::join_all(futures).await;
    }
}

/// Preload every configured approver position in batches.
pub async fn warmup_role_cache(
    directory: &RoleDirectory,
    pool: &MySqlPool,
    batch_size: usize,
) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, u64, String)>(
        r#"
        SELECT department_id, position_id, role
        FROM approver_roles
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (department_id, position_id, code) = row?;
        let Some(role) = ApproverRole::from_code(&code) else {
            tracing::warn!(department_id, position_id, code = %code, "Skipping unknown approver role");
            continue;
        };
        batch.push(((department_id, position_id), role));
        total_count += 1;

        if batch.len() >= batch_size {
            directory.batch_insert(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        directory.batch_insert(&batch).await;
    }

    tracing::info!(total_count, "Approver role cache warmup complete");

    Ok(())
}
