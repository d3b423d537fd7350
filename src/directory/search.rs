//! Public directory search: filter matching, pagination and tag suggestions.
//! Callers only ever feed approved profiles in here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::MentorProfile;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_SUGGEST_LIMIT: usize = 10;
pub const MAX_SUGGEST_LIMIT: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub keyword: Option<String>,
    pub research_interests: Vec<String>,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self { PageRequest { page: 1, page_size: DEFAULT_PAGE_SIZE } }
}

impl PageRequest {
    /// Page numbers start at 1; page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: usize, page_size: usize) -> Self {
        PageRequest { page: page.max(1), page_size: page_size.clamp(1, MAX_PAGE_SIZE) }
    }

    pub fn offset(&self) -> usize { (self.page - 1).saturating_mul(self.page_size) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), total: self.total, page: self.page, page_size: self.page_size }
    }
}

/// Slice an already filtered and ordered result set.
pub fn paginate<T>(rows: Vec<T>, req: PageRequest) -> Page<T> {
    let total = rows.len();
    let items = rows.into_iter().skip(req.offset()).take(req.page_size).collect();
    Page { items, total, page: req.page, page_size: req.page_size }
}

fn eq_ci(a: &str, b: &str) -> bool { a.trim().eq_ignore_ascii_case(b.trim()) }

fn contains_ci(haystack: &str, needle_lower: &str) -> bool { haystack.to_lowercase().contains(needle_lower) }

/// Every requested tag must match one of the profile's interests.
pub fn has_all_interests(profile: &MentorProfile, tags: &[String]) -> bool {
    tags.iter().filter(|t| !t.trim().is_empty()).all(|tag| profile.research_interests.iter().any(|i| eq_ci(i, tag)))
}

pub fn matches(profile: &MentorProfile, filters: &SearchFilters) -> bool {
    if let Some(kw) = filters.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let needle = kw.to_lowercase();
        let scalar_hit = [
            profile.full_name.as_str(),
            profile.institution.as_str(),
            profile.department.as_str(),
            profile.current_role.as_str(),
            profile.city.as_str(),
            profile.country.as_str(),
            profile.continent.as_str(),
        ]
        .iter()
        .any(|f| contains_ci(f, &needle));
        let list_hit = profile.degrees.iter().chain(profile.research_interests.iter()).any(|f| contains_ci(f, &needle));
        if !scalar_hit && !list_hit {
            return false;
        }
    }
    if !has_all_interests(profile, &filters.research_interests) {
        return false;
    }
    let place = [
        (&filters.continent, &profile.continent),
        (&filters.country, &profile.country),
        (&filters.city, &profile.city),
    ];
    place.iter().all(|(want, have)| match want.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        Some(w) => eq_ci(w, have),
        None => true,
    })
}

/// Lowercased, de-duplicated, sorted tags starting with `prefix`.
pub fn suggest_tags(tag_lists: &[Vec<String>], prefix: &str, limit: usize) -> Vec<String> {
    let prefix = prefix.trim().to_lowercase();
    let tags: BTreeSet<String> = tag_lists
        .iter()
        .flatten()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && t.starts_with(&prefix))
        .collect();
    tags.into_iter().take(limit.min(MAX_SUGGEST_LIMIT)).collect()
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
