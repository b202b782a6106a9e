//! Offset pagination for list and search queries.

use std::fmt;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 100;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageValidationError {
    LimitOutOfRange { max: u32 },
}

impl fmt::Display for PageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitOutOfRange { max } => write!(f, "limit must be between 1 and {max}"),
        }
    }
}

impl std::error::Error for PageValidationError {}

/// `skip`/`limit` pair with a bounded limit.
///
/// # Examples
/// ```
/// use contacts_api::domain::Page;
///
/// let page = Page::new(Some(20), None).unwrap();
/// assert_eq!((page.skip(), page.limit()), (20, 100));
/// assert!(Page::new(None, Some(0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    skip: u32,
    limit: u32,
}

impl Page {
    /// Build a page, filling in defaults for missing values.
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Result<Self, PageValidationError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageValidationError::LimitOutOfRange { max: MAX_LIMIT });
        }
        Ok(Self {
            skip: skip.unwrap_or(0),
            limit,
        })
    }

    pub fn skip(self) -> u32 {
        self.skip
    }

    pub fn limit(self) -> u32 {
        self.limit
    }

    /// Slice an in-memory, already-ordered result set.
    pub fn apply<T>(self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(0))]
    #[case(Some(MAX_LIMIT + 1))]
    fn rejects_out_of_range_limits(#[case] limit: Option<u32>) {
        assert_eq!(
            Page::new(None, limit),
            Err(PageValidationError::LimitOutOfRange { max: MAX_LIMIT })
        );
    }

    #[rstest]
    fn apply_skips_then_limits() {
        let page = Page::new(Some(2), Some(3)).expect("valid page");
        assert_eq!(page.apply(0..10), vec![2, 3, 4]);
    }

    #[rstest]
    fn apply_past_the_end_is_empty() {
        let page = Page::new(Some(50), None).expect("valid page");
        assert!(page.apply(0..10).is_empty());
    }
}
