use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::domain::{normalize_domain, referring_host};
use crate::record::{BacklinkRecord, BacklinksPage};
use crate::stats::{BacklinkEntry, DomainSummary, RankStats};

/// Summarize a batch of backlinks for `domain`.
///
/// Pure and stateless: every call starts from zero. Records whose source URL
/// has no usable host are still counted in every total except the referring
/// domain set.
pub fn analyze(domain: &str, records: &[BacklinkRecord]) -> DomainSummary {
    let start_time = Instant::now();
    let domain = normalize_domain(domain);

    let mut referring_domains: HashSet<String> = HashSet::new();
    let mut dofollow_count = 0;
    let mut nofollow_count = 0;
    let mut image_links = 0;
    let mut ranks = Vec::new();

    for record in records {
        match referring_host(&record.url_from) {
            Ok(host) => {
                referring_domains.insert(host);
            }
            Err(e) => {
                debug!(action = "skip", component = "referring_host", url = %record.url_from, error = %e, "No host for source URL");
            }
        }

        if record.nofollow {
            nofollow_count += 1;
        } else {
            dofollow_count += 1;
        }

        if record.image {
            image_links += 1;
        }

        if record.domain_inlink_rank > 0.0 {
            ranks.push(record.domain_inlink_rank);
        }
    }

    let rank_stats = RankStats::from_ranks(&ranks);
    let all_backlinks = records
        .iter()
        .enumerate()
        .map(|(i, record)| BacklinkEntry::from_record(i + 1, record))
        .collect();

    info!(
        action = "complete",
        component = "aggregation",
        domain = %domain,
        backlinks = records.len(),
        referring_domains = referring_domains.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Backlink aggregation completed"
    );

    DomainSummary {
        domain,
        total_backlinks: records.len(),
        total_referring_domains: referring_domains.len(),
        dofollow_count,
        nofollow_count,
        image_links,
        avg_domain_rank: rank_stats.average,
        max_domain_rank: rank_stats.max,
        min_domain_rank: rank_stats.min,
        all_backlinks,
        has_more: false,
    }
}

/// Like [`analyze`], carrying the page's "has more results" flag through.
pub fn analyze_page(domain: &str, page: &BacklinksPage) -> DomainSummary {
    DomainSummary {
        has_more: page.has_more,
        ..analyze(domain, &page.backlinks)
    }
}
