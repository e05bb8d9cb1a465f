use serde::Serialize;

use crate::request::{PAGE_PARAM, SIZE_PARAM};

/// Navigation links derived from the total count, page and size of a search.
///
/// Every field serializes, absent links as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub first: Option<String>,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

impl Pagination {
    /// Compute the link set for `total` rows viewed `size` at a time, with
    /// `page` being the 1-based page that was served.
    ///
    /// A page of `0` means "unset" and is treated as the first page. A size
    /// of `0` means "unlimited", so all rows live on a single page.
    pub fn new(total: u64, page: u64, size: u64, path: &str) -> Self {
        let mut links = Pagination::default();
        if total == 0 {
            return links;
        }

        let total_pages = total_pages(total, size);
        let page = page.max(1);

        if total_pages > 1 && page > 1 {
            links.first = Some(link(path, 1, size));
            links.previous = Some(link(path, page - 1, size));
        }

        if total_pages > page {
            links.next = Some(link(path, page + 1, size));
            // The last page always advertises the full size, not the remainder.
            links.last = Some(link(path, total_pages, size));
        }

        links
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.previous.is_none() && self.next.is_none() && self.last.is_none()
    }
}

/// `ceil(total / size)`, with an unlimited size collapsing to one page.
pub fn total_pages(total: u64, size: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    if size == 0 {
        return 1;
    }
    total.div_ceil(size)
}

fn link(path: &str, page: u64, size: u64) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(PAGE_PARAM, &page.to_string())
        .append_pair(SIZE_PARAM, &size.to_string())
        .finish();
    format!("{path}?{query}")
}
