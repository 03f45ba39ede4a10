use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Tag, DEFAULT_TAG_COLOR};

/// Refetch tags once the cached list is older than this.
/// Tags change rarely; mutations through the client invalidate immediately.
const CACHE_STALE_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn is_stale(&self) -> bool {
        (Utc::now() - self.cached_at).num_minutes() > CACHE_STALE_MINUTES
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entry: Option<CachedData<Vec<Tag>>>,
    // Bumped by every invalidation; a fetch started under an older
    // generation must not be stored.
    generation: u64,
}

/// Last fetched tag list, shared by every lookup that needs tag colours.
#[derive(Debug, Default)]
pub struct TagCache {
    state: RwLock<CacheState>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tags if present and fresh.
    pub async fn get(&self) -> Option<Vec<Tag>> {
        let state = self.state.read().await;
        state
            .entry
            .as_ref()
            .filter(|cached| !cached.is_stale())
            .map(|cached| cached.data.clone())
    }

    /// Drop the cached list. Fetches already in flight will not store theirs.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        if state.entry.take().is_some() {
            debug!("Tag cache invalidated");
        }
    }

    /// Return cached tags, or run `fetch` and remember what it returns.
    ///
    /// A failed fetch leaves the cache empty, and so does a fetch that raced
    /// with [`TagCache::invalidate`]: its result is returned to the caller
    /// but not kept.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<Vec<Tag>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Tag>, E>>,
    {
        let started = {
            let state = self.state.read().await;
            if let Some(cached) = state.entry.as_ref().filter(|c| !c.is_stale()) {
                return Ok(cached.data.clone());
            }
            state.generation
        };

        let tags = fetch().await?;

        let mut state = self.state.write().await;
        if state.generation == started {
            debug!(count = tags.len(), "Tag cache filled");
            state.entry = Some(CachedData::new(tags.clone()));
        } else {
            debug!("Tag cache invalidated during fetch, result not kept");
        }
        Ok(tags)
    }
}

/// Case-insensitive lookup by name.
pub fn find_by_name<'a>(tags: &'a [Tag], name: &str) -> Option<&'a Tag> {
    let name = name.trim().to_lowercase();
    tags.iter().find(|t| t.nome.to_lowercase() == name)
}

/// Colour of the named tag, or the default colour when it is unknown.
pub fn color_of(tags: &[Tag], name: &str) -> String {
    find_by_name(tags, name)
        .map(|t| t.color().to_string())
        .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string())
}

/// Tags matching `names`, in the order given; unknown names are skipped.
pub fn by_names(tags: &[Tag], names: &[String]) -> Vec<Tag> {
    names
        .iter()
        .filter_map(|n| find_by_name(tags, n).cloned())
        .collect()
}
