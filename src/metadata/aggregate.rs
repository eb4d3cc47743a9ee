use super::{Catalog, CatalogResult};
use crate::locale::{resolve_all, resolve_or};
use crate::models::{Credits, WorkDetail};
use crate::sources::{is_valid_manga_id, Include, UpstreamError};

const DEFAULT_STATUS: &str = "unknown";
const DEFAULT_CONTENT_RATING: &str = "safe";

impl Catalog {
    /// Author and artist names; empty when the lookup failed
    pub async fn credits(&self, manga_id: &str) -> Credits {
        match self
            .upstream()
            .get_manga(manga_id, &[Include::Author, Include::Artist])
            .await
        {
            Ok(manga) => Credits {
                authors: manga.related_names(Include::Author),
                artists: manga.related_names(Include::Artist),
            },
            Err(e) => {
                log::warn!("Credits lookup failed for {}: {}", manga_id, e);
                Credits::default()
            }
        }
    }

    /// Compose the full detail record for one work.
    ///
    /// Only the primary lookup can fail the request. Cover, gallery and
    /// credits are fetched concurrently and each degrades on its own; related
    /// works follow once the tags are known.
    pub async fn work_detail(&self, id: &str) -> CatalogResult<WorkDetail> {
        if !is_valid_manga_id(id) {
            log::info!("Rejecting malformed work id {:?}", id);
            return Err(UpstreamError::NotFound);
        }
        let manga = self
            .upstream()
            .get_manga(id, &[Include::CoverArt, Include::Author, Include::Artist])
            .await?;
        let manga_id = manga.id.as_str();
        log::info!("Aggregating detail for {}", manga_id);

        let (cover, gallery, credits) = tokio::join!(
            self.best_cover(manga_id),
            self.volume_gallery(manga_id),
            self.credits(manga_id)
        );

        let priority = self.settings.priority();
        let attributes = &manga.attributes;
        let tags = resolve_all(&manga.tag_names(), priority);
        let related_works = self.related_works(manga_id, &tags).await;

        // the primary record already carries one cover; use it when the
        // cover listing gave nothing
        let cover = cover.or_else(|| {
            manga
                .cover_file_name()
                .map(|file| self.settings.covers.url(manga_id, file))
        });

        Ok(WorkDetail {
            id: manga.id.clone(),
            title: self.display_title(&manga),
            description: resolve_or(&attributes.description, priority, ""),
            status: attributes
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            year: attributes.year,
            content_rating: attributes
                .content_rating
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_RATING.to_string()),
            tags,
            cover,
            alt_titles: resolve_all(&attributes.alt_titles, priority),
            total_volumes: gallery.total_volumes,
            latest_volume: gallery.latest_volume,
            volumes: gallery.volumes,
            authors: credits.authors,
            artists: credits.artists,
            related_works,
        })
    }
}
