// ── Full-collection pagination aggregator ──
//
// Page 1 is fetched first to learn `total_pages`; the remaining pages are
// fetched concurrently as one ordered batch. Order comes from the page
// index, never from completion time.

use std::future::Future;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::Error;

/// Collect every page of a list endpoint into one envelope.
///
/// `fetch_page` is called with 1-based page numbers and must apply any
/// resource filters itself. The returned envelope reuses page 1's `meta`,
/// so its pagination counters describe the first request, not the merged
/// `data`. If any page fails, the whole call fails with that page's error
/// and nothing fetched so far is returned.
pub async fn fetch_all_pages<T, F, Fut>(fetch_page: F) -> Result<Envelope<T>, Error>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Envelope<T>, Error>>,
{
    let first = fetch_page(1).await?;
    let total_pages = first.total_pages();
    if total_pages <= 1 {
        return Ok(first);
    }

    let rest = try_join_all((2..=total_pages).map(&fetch_page)).await?;

    let Envelope { mut data, meta } = first;
    for page in rest {
        data.extend(page.data);
    }

    debug!(pages = total_pages, items = data.len(), "aggregated paginated collection");
    Ok(Envelope { data, meta })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::envelope::{Meta, Pagination};

    fn page(n: u32, total_pages: u32, items: Vec<u32>) -> Envelope<u32> {
        Envelope {
            meta: Some(Meta {
                pagination: Some(Pagination {
                    total: 0,
                    count: items.len() as u64,
                    per_page: 3,
                    current_page: n,
                    total_pages,
                }),
            }),
            data: items,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concatenates_in_page_order_regardless_of_completion() {
        // later pages finish first
        let result = fetch_all_pages(|n| async move {
            tokio::time::sleep(Duration::from_millis(u64::from(10 - n))).await;
            Ok(page(n, 4, vec![n * 10, n * 10 + 1, n * 10 + 2]))
        })
        .await
        .unwrap();

        assert_eq!(
            result.data,
            vec![10, 11, 12, 20, 21, 22, 30, 31, 32, 40, 41, 42]
        );
        // meta is page 1's
        assert_eq!(result.pagination().map(|p| p.current_page), Some(1));
        assert_eq!(result.pagination().map(|p| p.count), Some(3));
    }

    #[tokio::test]
    async fn single_page_makes_exactly_one_request() {
        let calls = Mutex::new(Vec::new());
        let result = fetch_all_pages(|n| {
            calls.lock().unwrap().push(n);
            async move {
                Ok(Envelope {
                    data: vec![1_u32, 2],
                    meta: None,
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(result.data, vec![1, 2]);
        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn any_failed_page_rejects_whole_aggregation() {
        let result = fetch_all_pages(|n| async move {
            if n == 3 {
                Err(Error::ServerError {
                    message: "page 3 exploded".into(),
                })
            } else {
                Ok(page(n, 4, vec![n]))
            }
        })
        .await;

        match result {
            Err(Error::ServerError { message }) => assert_eq!(message, "page 3 exploded"),
            other => panic!("expected ServerError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_page_failure_is_propagated() {
        let result: Result<Envelope<u32>, Error> =
            fetch_all_pages(|_| async { Err(Error::Unauthorized) }).await;
        assert!(matches!(result, Err(Error::Unauthorized)));
    }
}
