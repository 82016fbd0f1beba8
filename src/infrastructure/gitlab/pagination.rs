//! Offset pagination as exposed through GitLab's `X-*` response headers.

use reqwest::header::HeaderMap;
use std::future::Future;

use super::gateway::RemoteError;

/// Number of records requested per page.
pub const DEFAULT_PER_PAGE: u32 = 20;

const HEADER_PAGE: &str = "x-page";
const HEADER_TOTAL_PAGES: &str = "x-total-pages";
const HEADER_NEXT_PAGE: &str = "x-next-page";

/// Page metadata reported alongside a collection response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current: u32,
    /// Absent for very large collections, where GitLab skips counting
    pub total: Option<u32>,
    pub next: Option<u32>,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current: 1,
            total: None,
            next: None,
        }
    }
}

impl PageInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .and_then(|value| value.parse::<u32>().ok())
        };

        Self {
            current: number(HEADER_PAGE).unwrap_or(1),
            total: number(HEADER_TOTAL_PAGES),
            next: number(HEADER_NEXT_PAGE),
        }
    }

    /// Page to request next, or `None` once the last page has been seen.
    pub fn next_page(&self) -> Option<u32> {
        match self.total {
            Some(total) if self.current >= total => None,
            Some(_) => Some(self.next.unwrap_or(self.current + 1)),
            None => self.next,
        }
    }
}

/// Fetch pages starting at 1 until the remote reports the last one.
///
/// Items are concatenated in the order received. The first failing page
/// aborts the whole listing and drops whatever was collected before it, so
/// callers never see a silently truncated collection.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, RemoteError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, PageInfo), RemoteError>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let (batch, info) = fetch(page).await?;
        items.extend(batch);

        match info.next_page() {
            // A remote pointing backwards would otherwise loop forever
            Some(next) if next > page => page = next,
            _ => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::sync::Mutex;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn status_error() -> RemoteError {
        RemoteError::Status {
            url: "https://gitlab.com/api/v4/groups/org/projects".into(),
            status: 500,
            message: "boom".into(),
        }
    }

    #[test]
    fn test_page_info_from_headers() {
        let info = PageInfo::from_headers(&headers(&[
            ("x-page", "2"),
            ("x-total-pages", "3"),
            ("x-next-page", "3"),
        ]));
        assert_eq!(
            info,
            PageInfo {
                current: 2,
                total: Some(3),
                next: Some(3)
            }
        );
        assert_eq!(info.next_page(), Some(3));
    }

    #[test]
    fn test_last_page_has_no_successor() {
        let info = PageInfo::from_headers(&headers(&[
            ("x-page", "3"),
            ("x-total-pages", "3"),
            ("x-next-page", ""),
        ]));
        assert_eq!(info.next, None);
        assert_eq!(info.next_page(), None);
    }

    #[test]
    fn test_missing_total_falls_back_to_next_header() {
        let info = PageInfo::from_headers(&headers(&[("x-page", "1"), ("x-next-page", "2")]));
        assert_eq!(info.total, None);
        assert_eq!(info.next_page(), Some(2));

        let info = PageInfo::from_headers(&headers(&[("x-page", "4")]));
        assert_eq!(info.next_page(), None);
    }

    #[test]
    fn test_missing_headers_means_single_page() {
        let info = PageInfo::from_headers(&HeaderMap::new());
        assert_eq!(info, PageInfo::default());
        assert_eq!(info.next_page(), None);
    }

    #[tokio::test]
    async fn test_collect_pages_concatenates_in_order() {
        let requested = Mutex::new(Vec::new());
        let items = collect_pages(|page| {
            requested.lock().unwrap().push(page);
            async move {
                let batch = vec![page * 10, page * 10 + 1];
                let info = PageInfo {
                    current: page,
                    total: Some(3),
                    next: if page < 3 { Some(page + 1) } else { None },
                };
                Ok((batch, info))
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![10, 11, 20, 21, 30, 31]);
        assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_collect_pages_discards_partial_results_on_error() {
        let result: Result<Vec<u32>, _> = collect_pages(|page| async move {
            if page == 2 {
                return Err(status_error());
            }
            Ok((
                vec![page],
                PageInfo {
                    current: page,
                    total: Some(3),
                    next: Some(page + 1),
                },
            ))
        })
        .await;

        assert!(matches!(result, Err(RemoteError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_non_advancing_next_page() {
        let items = collect_pages(|page| async move {
            Ok((
                vec![page],
                PageInfo {
                    current: page,
                    total: None,
                    next: Some(1),
                },
            ))
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1]);
    }
}
