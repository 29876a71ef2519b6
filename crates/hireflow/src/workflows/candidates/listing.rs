use serde::Serialize;

use super::domain::CandidateStatus;
use super::repository::CandidateRecord;
use crate::config::PipelineConfig;

/// Search and paging options for candidate listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateQuery {
    /// Case-insensitive match against name, email and skills.
    pub search: Option<String>,
    /// Keep only candidates in one of these statuses; empty keeps all.
    pub statuses: Vec<CandidateStatus>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl CandidateQuery {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidatePage<T> {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub items: Vec<T>,
}

impl<T> CandidatePage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CandidatePage<U> {
        CandidatePage {
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

fn matches_search(record: &CandidateRecord, needle: &str) -> bool {
    let profile = &record.profile;
    profile.name.to_lowercase().contains(needle)
        || profile.email.to_lowercase().contains(needle)
        || profile
            .skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(needle))
}

/// Filter and page `records` without reordering or mutating them.
///
/// With no `page_size` the whole match set is returned on page 1, which keeps an empty query
/// equivalent to the input collection.
pub fn filter_candidates<'a>(
    records: &'a [CandidateRecord],
    query: &CandidateQuery,
    limits: &PipelineConfig,
) -> CandidatePage<&'a CandidateRecord> {
    let needle = query.needle();
    let matched: Vec<&CandidateRecord> = records
        .iter()
        .filter(|record| {
            query.statuses.is_empty() || query.statuses.contains(&record.state.status())
        })
        .filter(|record| {
            needle
                .as_deref()
                .map_or(true, |needle| matches_search(record, needle))
        })
        .collect();

    let total = matched.len();
    let page = query.page.unwrap_or(1).max(1);
    let page_size = match query.page_size {
        Some(size) => size.clamp(1, limits.max_page_size),
        None if query.page.is_some() => limits.default_page_size,
        None => total.max(1),
    };

    let items = matched
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    CandidatePage {
        total,
        page,
        page_size,
        items,
    }
}
