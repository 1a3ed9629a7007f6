use anyhow::{Result, anyhow};
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::access::Directory;
use crate::model::person::Person;

const SNAPSHOT_KEY: &str = "people";

/// Caches the full person directory as one shared snapshot.
#[derive(Clone)]
pub struct DirectoryCache {
    cache: Cache<&'static str, Arc<Directory>>,
}

impl DirectoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Current snapshot, loading it from the database on a miss.
    pub async fn get(&self, pool: &MySqlPool) -> Result<Arc<Directory>> {
        self.get_or_load(load_directory(pool)).await
    }

    /// Concurrent misses share a single in-flight load.
    pub async fn get_or_load<F>(&self, load: F) -> Result<Arc<Directory>>
    where
        F: Future<Output = Result<Directory>>,
    {
        self.cache
            .try_get_with(SNAPSHOT_KEY, async move { load.await.map(Arc::new) })
            .await
            .map_err(|e| anyhow!("Failed to load directory: {}", e))
    }

    /// Drop the snapshot after people or reporting lines change.
    pub async fn invalidate(&self) {
        self.cache.invalidate(SNAPSHOT_KEY).await;
    }
}

/// Stream every person row into a directory snapshot.
pub async fn load_directory(pool: &MySqlPool) -> Result<Directory> {
    let mut stream = sqlx::query_as::<_, Person>(
        r#"
        SELECT id, name, email, role, manager_id
        FROM people
        "#,
    )
    .fetch(pool);

    let mut people = Vec::new();
    while let Some(row) = stream.next().await {
        people.push(row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?);
    }

    let directory: Directory = people.into_iter().collect();
    tracing::debug!(people = directory.len(), "Directory loaded");
    Ok(directory)
}

/// Load the directory once at startup so the first requests hit a warm cache.
pub async fn warmup_directory_cache(cache: &DirectoryCache, pool: &MySqlPool) -> Result<()> {
    let directory = cache.get(pool).await?;
    log::info!(
        "Directory cache warmup complete: {} people",
        directory.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot() -> Directory {
        [
            Person::new("d", "director", None),
            Person::new("m", "manager", Some("d")),
        ]
        .into_iter()
        .collect()
    }

    #[actix_web::test]
    async fn loads_once_until_invalidated() {
        let cache = DirectoryCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let loads = &counter;

        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(snapshot())
        };

        let first = cache.get_or_load(load()).await.unwrap();
        let second = cache.get_or_load(load()).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        cache.get_or_load(load()).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn failed_load_is_not_cached() {
        let cache = DirectoryCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_load(async { Err::<Directory, _>(anyhow!("database down")) })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("database down"));

        let dir = cache.get_or_load(async { Ok::<_, anyhow::Error>(snapshot()) }).await.unwrap();
        assert!(dir.contains("m"));
    }
}
