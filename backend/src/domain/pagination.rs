//! Offset pagination shared by listing endpoints.

use serde::Serialize;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Validation errors for [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange { max: u32 },
}

/// Requested window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u32,
}

impl PageRequest {
    /// Validate optional query parameters, applying the defaults.
    ///
    /// # Examples
    /// ```
    /// use dfds_backend::domain::PageRequest;
    ///
    /// let page = PageRequest::new(None, None).unwrap();
    /// assert_eq!(page.limit(), 20);
    /// assert!(PageRequest::new(Some(0), None).is_err());
    /// ```
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Result<Self, PageRequestError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(PageRequestError::LimitOutOfRange {
                max: MAX_PAGE_LIMIT,
            });
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results together with the size of the full listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Wrap a window of items fetched for `request`.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            limit: request.limit(),
            offset: request.offset(),
            total,
        }
    }

    /// Transform every item while keeping the window metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            offset: self.offset,
            total: self.total,
        }
    }
}
