//! Cover selection and per-volume galleries
//!
//! Covers come from `GET /cover?manga[]={id}&order[volume]=asc`. Each record
//! may carry a volume label and a locale; this module decides which one to
//! show as "the" cover, and builds the ordered gallery for the detail page.

use crate::models::{VolumeEntry, VolumeGallery};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Locale shown in a gallery entry whose cover record carries none
pub const UNKNOWN_LOCALE: &str = "unknown";

/// One cover image available for a work
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverRecord {
    pub file_name: Option<String>,
    pub volume: Option<String>,
    pub locale: Option<String>,
}

impl CoverRecord {
    pub fn new(file_name: &str, volume: Option<&str>, locale: Option<&str>) -> Self {
        Self {
            file_name: Some(file_name.to_string()),
            volume: volume.map(str::to_string),
            locale: locale.map(str::to_string),
        }
    }

    fn is_en(&self) -> bool {
        self.locale.as_deref() == Some("en")
    }

    fn score(&self) -> u8 {
        let en = if self.is_en() { 2 } else { 0 };
        let first_volume = if self.volume.as_deref() == Some("1") { 1 } else { 0 };
        en + first_volume
    }

    fn usable_file_name(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|f| !f.is_empty())
    }
}

/// Builds image URLs of the form `{host}/covers/{manga_id}/{file}{suffix}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverTemplate {
    pub host: String,
    pub size_suffix: String,
}

impl Default for CoverTemplate {
    fn default() -> Self {
        Self {
            host: "https://uploads.mangadex.org".to_string(),
            size_suffix: ".256.jpg".to_string(),
        }
    }
}

impl CoverTemplate {
    pub fn url(&self, manga_id: &str, file_name: &str) -> String {
        format!(
            "{}/covers/{}/{}{}",
            self.host.trim_end_matches('/'),
            manga_id,
            file_name,
            self.size_suffix
        )
    }

    fn url_for(&self, manga_id: &str, cover: &CoverRecord) -> Option<String> {
        cover
            .usable_file_name()
            .map(|file_name| self.url(manga_id, file_name))
    }
}

/// Pick the cover to display for a work.
///
/// English covers score 2, volume "1" scores 1. The highest score wins and
/// the earliest record wins a tie, so the upstream volume order decides
/// between equals. Returns `None` for an empty list or when the winner has
/// no file name.
pub fn pick_best_cover(
    covers: &[CoverRecord],
    manga_id: &str,
    template: &CoverTemplate,
) -> Option<String> {
    let mut best: Option<&CoverRecord> = None;
    for cover in covers {
        match best {
            Some(current) if cover.score() <= current.score() => {}
            _ => best = Some(cover),
        }
    }
    best.and_then(|cover| template.url_for(manga_id, cover))
}

/// Numeric sort key for a volume label; `None` for labels that are not a
/// finite number.
fn volume_number(label: &str) -> Option<f64> {
    label.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric labels ascending, then non-numeric labels.
fn compare_volumes(a: &str, b: &str) -> Ordering {
    match (volume_number(a), volume_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Build the per-volume gallery.
///
/// Records without a volume label are dropped. Each label keeps a single
/// record: the first English one, or else the first one seen. Entries are
/// sorted by the numeric value of their label; labels that are not numbers
/// go last in the order they were first seen.
pub fn build_volume_gallery(
    covers: &[CoverRecord],
    manga_id: &str,
    template: &CoverTemplate,
) -> VolumeGallery {
    let mut chosen: Vec<(&str, &CoverRecord)> = Vec::new();
    for cover in covers {
        let Some(volume) = cover.volume.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };
        match chosen.iter_mut().find(|(label, _)| *label == volume) {
            Some(slot) => {
                if cover.is_en() && !slot.1.is_en() {
                    slot.1 = cover;
                }
            }
            None => chosen.push((volume, cover)),
        }
    }

    // stable: equal keys keep first-seen order
    chosen.sort_by(|(a, _), (b, _)| compare_volumes(a, b));

    let volumes: Vec<VolumeEntry> = chosen
        .into_iter()
        .map(|(volume, cover)| VolumeEntry {
            volume: volume.to_string(),
            cover: template.url_for(manga_id, cover),
            locale: cover
                .locale
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNKNOWN_LOCALE.to_string()),
        })
        .collect();

    VolumeGallery::from_volumes(volumes)
}
