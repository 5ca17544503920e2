use serde::{Deserialize, Serialize};

use crate::record::BacklinkRecord;

/// Aggregate over `domain_inlink_rank` values greater than zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankStats {
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

impl RankStats {
    /// All zero when `ranks` is empty; the average is rounded to 2 decimals.
    pub fn from_ranks(ranks: &[f64]) -> Self {
        if ranks.is_empty() {
            return Self::default();
        }

        let sum: f64 = ranks.iter().sum();
        let max = ranks.iter().copied().fold(f64::MIN, f64::max);
        let min = ranks.iter().copied().fold(f64::MAX, f64::min);

        // Rounding must not push the mean outside the observed range.
        Self {
            average: round2(sum / ranks.len() as f64).clamp(min, max),
            max,
            min,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One backlink as presented to callers, numbered by input position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklinkEntry {
    pub position: usize,
    pub source_url: String,
    pub target_url: String,
    pub title: String,
    pub anchor_text: String,
    pub alt_text: String,
    pub is_nofollow: bool,
    pub is_image: bool,
    pub image_source: String,
    pub inlink_rank: f64,
    pub domain_inlink_rank: f64,
    pub first_seen: String,
    pub last_visited: String,
}

impl BacklinkEntry {
    pub fn from_record(position: usize, record: &BacklinkRecord) -> Self {
        Self {
            position,
            source_url: record.url_from.clone(),
            target_url: record.url_to.clone(),
            title: record.title.clone(),
            anchor_text: record.anchor.clone(),
            alt_text: record.alt.clone(),
            is_nofollow: record.nofollow,
            is_image: record.image,
            image_source: record.image_source.clone(),
            inlink_rank: record.inlink_rank,
            domain_inlink_rank: record.domain_inlink_rank,
            first_seen: record.first_seen.clone(),
            last_visited: record.last_visited.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSummary {
    pub domain: String,
    pub total_backlinks: usize,
    pub total_referring_domains: usize,
    pub dofollow_count: usize,
    pub nofollow_count: usize,
    pub image_links: usize,
    pub avg_domain_rank: f64,
    pub max_domain_rank: f64,
    pub min_domain_rank: f64,
    pub all_backlinks: Vec<BacklinkEntry>,
    pub has_more: bool,
}

impl DomainSummary {
    pub fn rank_stats(&self) -> RankStats {
        RankStats {
            average: self.avg_domain_rank,
            max: self.max_domain_rank,
            min: self.min_domain_rank,
        }
    }
}
