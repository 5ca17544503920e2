use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::stats::BacklinkEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LinkType {
    #[default]
    All,
    Dofollow,
    Nofollow,
    Image,
}

impl LinkType {
    fn matches(self, entry: &BacklinkEntry) -> bool {
        match self {
            LinkType::All => true,
            LinkType::Dofollow => !entry.is_nofollow,
            LinkType::Nofollow => entry.is_nofollow,
            LinkType::Image => entry.is_image,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    /// Input order
    #[default]
    Position,
    /// Highest domain inlink rank first
    DomainRank,
    /// Highest page inlink rank first
    Rank,
    /// Most recently first seen
    Newest,
    /// Earliest first seen
    Oldest,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <SortKey as clap::ValueEnum>::from_str(s, true)
            .map_err(|_| Error::InvalidInput(format!("unknown sort key: {}", s)))
    }
}

/// Display-side selection over a summary's entries.
#[derive(Debug, Default)]
pub struct EntryFilter {
    pub link_type: LinkType,
    pub search: Option<Regex>,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

impl EntryFilter {
    /// Search is a case-insensitive regex over anchor text, title and source
    /// URL; plain words behave as substring matches.
    pub fn with_search(mut self, pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            self.search = None;
            return Ok(self);
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("invalid search pattern: {}", e)))?;
        self.search = Some(regex);
        Ok(self)
    }

    fn matches(&self, entry: &BacklinkEntry) -> bool {
        if !self.link_type.matches(entry) {
            return false;
        }
        match &self.search {
            Some(regex) => {
                regex.is_match(&entry.anchor_text)
                    || regex.is_match(&entry.title)
                    || regex.is_match(&entry.source_url)
            }
            None => true,
        }
    }

    /// Matching entries, sorted, cut to `limit`. Positions are untouched.
    pub fn apply<'a>(&self, entries: &'a [BacklinkEntry]) -> Vec<&'a BacklinkEntry> {
        let mut selected: Vec<&BacklinkEntry> =
            entries.iter().filter(|entry| self.matches(entry)).collect();

        match self.sort {
            SortKey::Position => selected.sort_by_key(|e| e.position),
            SortKey::DomainRank => {
                selected.sort_by(|a, b| desc(a.domain_inlink_rank, b.domain_inlink_rank))
            }
            SortKey::Rank => selected.sort_by(|a, b| desc(a.inlink_rank, b.inlink_rank)),
            SortKey::Newest => selected.sort_by(|a, b| {
                by_date(&a.first_seen, &b.first_seen, |x, y| y.cmp(&x))
            }),
            SortKey::Oldest => selected.sort_by(|a, b| {
                by_date(&a.first_seen, &b.first_seen, |x, y| x.cmp(&y))
            }),
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Orders two date strings with `cmp`; unparsable dates always sort last.
fn by_date(
    a: &str,
    b: &str,
    cmp: impl Fn(NaiveDateTime, NaiveDateTime) -> Ordering,
) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Accepts the date shapes the feed uses: `2024-01-31`,
/// `2024-01-31 10:00:00` and RFC 3339.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
