use std::fmt::Write as _;
use std::time::Instant;

use tracing::info;

use crate::analysis::analyze_page;
use crate::client::BacklinkSource;
use crate::domain::normalize_domain;
use crate::error::{Error, Result};
use crate::filter::EntryFilter;
use crate::stats::DomainSummary;
use crate::utils::{format_number, format_rank, or_na, truncate};

const RULE: &str = "==================================================";
const MAX_SOURCE_CHARS: usize = 60;
const MAX_ANCHOR_CHARS: usize = 40;

/// Normalize `domain`, fetch its backlinks from `source` and summarize them.
///
/// Fetch failures are returned as-is; no partial summary is produced.
pub async fn check_domain(
    source: &dyn BacklinkSource,
    domain: &str,
    limit: usize,
) -> Result<DomainSummary> {
    let total_start_time = Instant::now();
    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return Err(Error::InvalidInput("domain is required".into()));
    }

    info!(action = "start", component = "domain_check", domain = %domain, "Starting backlink analysis");
    let page = source.fetch(&domain, limit).await?;
    let summary = analyze_page(&domain, &page);

    info!(
        action = "complete",
        component = "domain_check",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Backlink analysis completed"
    );
    Ok(summary)
}

/// Plain-text report: summary block followed by the selected backlinks.
pub fn render_summary(summary: &DomainSummary, filter: &EntryFilter) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "BACKLINK SUMMARY");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Domain analyzed: {}", summary.domain);
    let _ = writeln!(out, "Total backlinks: {}", format_number(summary.total_backlinks));
    let _ = writeln!(
        out,
        "Referring domains: {}",
        format_number(summary.total_referring_domains)
    );
    let _ = writeln!(
        out,
        "Dofollow: {} | Nofollow: {} | Image links: {}",
        format_number(summary.dofollow_count),
        format_number(summary.nofollow_count),
        format_number(summary.image_links)
    );
    let ranks = summary.rank_stats();
    let _ = writeln!(
        out,
        "Domain rank: avg {} | max {} | min {}",
        format_rank(ranks.average),
        format_rank(ranks.max),
        format_rank(ranks.min)
    );
    if summary.has_more {
        let _ = writeln!(out, "More results are available upstream (raise --limit to fetch more)");
    }

    let selected = filter.apply(&summary.all_backlinks);
    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "TOP {} BACKLINKS", selected.len());
    let _ = writeln!(out, "{RULE}");

    if selected.is_empty() {
        let _ = writeln!(out, "No backlinks found for this domain.");
        return out;
    }

    for entry in selected {
        let link_type = if entry.is_nofollow { "Nofollow" } else { "Dofollow" };
        let image = if entry.is_image { " | Image" } else { "" };
        let _ = writeln!(
            out,
            "{:2}. Source: {}",
            entry.position,
            truncate(or_na(&entry.source_url), MAX_SOURCE_CHARS)
        );
        let _ = writeln!(out, "    Target: {}", or_na(&entry.target_url));
        let _ = writeln!(
            out,
            "    Anchor: \"{}\" | Type: {}{}",
            truncate(or_na(&entry.anchor_text), MAX_ANCHOR_CHARS),
            link_type,
            image
        );
        let _ = writeln!(
            out,
            "    Domain rank: {} | First seen: {}",
            format_rank(entry.domain_inlink_rank),
            or_na(&entry.first_seen)
        );
        let _ = writeln!(out);
    }

    out
}
