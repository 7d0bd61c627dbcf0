//! Page-number pagination shared by the list endpoints.
//!
//! Pages are 1-based on the wire; the default page size is 12 and callers may
//! raise it up to `MAX_PAGE_SIZE`.

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 10_000;

/// Normalize raw query values into a zero-based page index and an effective
/// page size.
pub fn normalize(page: Option<u64>, page_size: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1) - 1;
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        assert_eq!(normalize(None, None), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn page_is_one_based() {
        assert_eq!(normalize(Some(3), Some(20)), (2, 20));
        // page=0 is treated as the first page
        assert_eq!(normalize(Some(0), None), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(normalize(None, Some(0)), (0, 1));
        assert_eq!(normalize(None, Some(9_999_999)), (0, MAX_PAGE_SIZE));
    }
}
