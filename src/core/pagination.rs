use super::error::RateError;
use super::rates::PageInfo;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A validated one-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self, RateError> {
        if page < 1 {
            return Err(RateError::invalid("page must be at least 1"));
        }
        if page_size < 1 {
            return Err(RateError::invalid("page size must be at least 1"));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    pub fn info(&self, total_count: usize, returned_count: usize) -> PageInfo {
        PageInfo {
            page: self.page,
            page_size: self.page_size,
            total_count,
            returned_count,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Slices `entries` in key order, returning the page and the unpaged total.
///
/// A page past the end yields an empty slice rather than an error.
pub fn paginate<K, V>(entries: &BTreeMap<K, V>, page: PageRequest) -> (BTreeMap<K, V>, usize)
where
    K: Ord + Clone,
    V: Clone,
{
    let slice = entries
        .iter()
        .skip(page.offset())
        .take(page.page_size as usize)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (slice, entries.len())
}
