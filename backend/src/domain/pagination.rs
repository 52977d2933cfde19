//! Offset pagination for back-office listings.

use serde::Serialize;
use utoipa::ToSchema;

use super::validation::{FieldError, ViolationCode, Violations};

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validate raw query values, applying defaults for absent ones.
    ///
    /// ```
    /// use finlead::domain::PageRequest;
    ///
    /// let page = PageRequest::parse(Some(3), Some(10)).unwrap();
    /// assert_eq!(page.offset(), 20);
    /// assert!(PageRequest::parse(Some(0), None).is_err());
    /// ```
    pub fn parse(page: Option<i64>, page_size: Option<i64>) -> Result<Self, Violations> {
        let mut violations = Violations::default();
        let page = violations.check("page", bounded(page.unwrap_or(1), 1, i64::from(u32::MAX)));
        let page_size = violations.check(
            "pageSize",
            bounded(
                page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
                1,
                i64::from(MAX_PAGE_SIZE),
            ),
        );
        violations.finish(|| Some(Self::new(page?, page_size?)))
    }

    /// Build a page request from trusted values.
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// One-based page number.
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Items per page, between 1 and 100.
    pub const fn page_size(self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub const fn offset(self) -> u64 {
        (self.page as u64).saturating_sub(1) * self.page_size as u64
    }

    /// Whether a page exists after this one given `total` rows.
    pub const fn has_next(self, total: u64) -> bool {
        self.offset() + (self.page_size as u64) < total
    }
}

fn bounded(value: i64, min: i64, max: i64) -> Result<u32, FieldError> {
    if value < min || value > max {
        return Err(FieldError::new(
            ViolationCode::OutOfRange,
            format!("must be between {min} and {max}"),
        ));
    }
    u32::try_from(value)
        .map_err(|_| FieldError::new(ViolationCode::OutOfRange, "is out of range"))
}

/// A page of results with the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Wrap `items` fetched for `request`.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
        }
    }

    /// Whether rows exist past this page.
    pub fn has_next(&self) -> bool {
        PageRequest::new(self.page, self.page_size).has_next(self.total)
    }

    /// Convert every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}
