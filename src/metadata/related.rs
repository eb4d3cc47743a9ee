use super::Catalog;
use crate::models::WorkSummary;
use crate::sources::{MangaOrder, MangaQuery};
use futures::future::join_all;
use std::collections::HashSet;

/// Entries shown in the related-works strip
pub const MAX_RELATED: usize = 8;
/// Tags combined into the similarity query
const QUERY_TAGS: usize = 2;
const TAG_SEARCH_LIMIT: u32 = 10;
const TOP_LIST_LIMIT: u32 = 20;

impl Catalog {
    /// Works to suggest next to `manga_id`.
    ///
    /// Combines a title search on the leading tag names with the most
    /// followed and best rated works. Each of the three listings may fail on
    /// its own; the current work and duplicates are dropped.
    pub async fn related_works(&self, manga_id: &str, tags: &[String]) -> Vec<WorkSummary> {
        if tags.is_empty() {
            return Vec::new();
        }
        let tag_query = tags
            .iter()
            .take(QUERY_TAGS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let queries = [
            MangaQuery::by_title(&tag_query, TAG_SEARCH_LIMIT),
            MangaQuery::top(MangaOrder::FollowedCount, TOP_LIST_LIMIT),
            MangaQuery::top(MangaOrder::Rating, TOP_LIST_LIMIT),
        ];
        let listings = join_all(queries.iter().map(|q| self.upstream().search_manga(q))).await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut related = Vec::with_capacity(MAX_RELATED);
        for (query, listing) in queries.iter().zip(listings) {
            let candidates = match listing {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!("Related works listing {:?} failed: {}", query.order, e);
                    continue;
                }
            };
            for manga in candidates {
                if related.len() == MAX_RELATED {
                    return related;
                }
                if manga.id == manga_id || !seen.insert(manga.id.clone()) {
                    continue;
                }
                related.push(self.summary_from_listing(&manga));
            }
        }
        related
    }
}
