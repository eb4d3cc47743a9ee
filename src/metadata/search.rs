use super::{Catalog, CatalogResult};
use crate::models::WorkSummary;
use crate::sources::MangaQuery;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

impl Catalog {
    /// Free-text search.
    ///
    /// A blank query returns nothing without calling upstream. Candidates
    /// keep the upstream ranking; each one gets its cover from the cover
    /// listing, at most `search_concurrency` lookups at a time. A failed
    /// cover lookup leaves that entry's cover empty.
    pub async fn search(&self, query: &str, limit: Option<u32>) -> CatalogResult<Vec<WorkSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = self.settings.clamp_limit(limit);

        let candidates = self
            .upstream()
            .search_manga(&MangaQuery::by_title(query, limit))
            .await?;
        log::info!("Search {:?}: {} candidates", query, candidates.len());

        // one slot per upstream position; lookups fill in covers as they land
        let mut slots: Vec<WorkSummary> = candidates
            .iter()
            .map(|manga| WorkSummary {
                id: manga.id.clone(),
                title: self.display_title(manga),
                cover: None,
            })
            .collect();

        let pool = Arc::new(Semaphore::new(self.settings.search_concurrency));
        let mut lookups = JoinSet::new();
        for (index, slot) in slots.iter().enumerate() {
            let catalog = self.clone();
            let pool = Arc::clone(&pool);
            let manga_id = slot.id.clone();
            lookups.spawn(async move {
                let _permit = pool.acquire_owned().await;
                (index, catalog.best_cover(&manga_id).await)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, cover)) => slots[index].cover = cover,
                Err(e) => log::warn!("Cover lookup task for {:?} did not finish: {}", query, e),
            }
        }

        Ok(slots)
    }
}
