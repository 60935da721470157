//! `Link`-header pagination parsing
//!
//! GitHub-style Link headers look like:
//! `<https://api.example.com/users/u/repos?per_page=100&page=2>; rel="next",
//!  <https://api.example.com/users/u/repos?per_page=100&page=4>; rel="last"`

/// Raw page hints parsed from one Link header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// The next page number (from `rel="next"`).
    pub next_page: Option<u32>,
    /// The last page number (from `rel="last"`).
    pub last_page: Option<u32>,
}

impl PageLinks {
    /// Total number of pages, when the header announced a last page.
    pub fn total_pages(&self) -> Option<u32> {
        self.last_page
    }
}

/// Parse a Link header into page hints. Unrecognized rels are ignored.
pub fn parse_link_header(header: &str) -> PageLinks {
    let mut links = PageLinks::default();

    for part in header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;
        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel)) = (url, rel)
            && let Some(page) = page_from_url(url)
        {
            match rel {
                "next" => links.next_page = Some(page),
                "last" => links.last_page = Some(page),
                _ => {}
            }
        }
    }

    links
}

/// Extract the `page` query parameter from a URL.
fn page_from_url(url: &str) -> Option<u32> {
    let query = &url[url.find('?')? + 1..];
    query
        .split('&')
        .find_map(|param| param.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
}

/// Pagination state derived for one listing request. Not persisted: each
/// listing request derives its own from that response's Link header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Total pages, from the `rel="last"` hint.
    pub total_pages: u32,
    /// The request URL stripped of its query string.
    pub base_url: String,
    /// Query parameter that carries the page number.
    pub page_param: String,
}

impl PaginationState {
    /// Derive pagination state for `request_url` from its Link header.
    /// Returns `None` when the header carries no `rel="last"` hint.
    pub fn from_link_header(request_url: &str, header: &str) -> Option<Self> {
        let total_pages = parse_link_header(header).last_page?;
        let base_url = request_url
            .split('?')
            .next()
            .unwrap_or(request_url)
            .to_string();
        Some(Self {
            total_pages,
            base_url,
            page_param: "page".to_string(),
        })
    }

    /// Rebuild the URL for a given page from the derived state.
    pub fn url_for_page(&self, page: u32) -> String {
        format!("{}?{}={}", self.base_url, self.page_param, page)
    }
}
