//! Paginated fetch-all aggregation.

use color_eyre::Result;
use futures::future::try_join_all;
use std::future::Future;

use super::types::{Params, ResourcePage};

/// Largest page size the API accepts. Fetching at this size means most
/// collections aggregate in a single request.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Fetch every page of a collection and concatenate the items in page order.
pub async fn fetch_all<T, F, Fut>(fetch_page: F) -> Result<Vec<T>>
where
  F: Fn(Params) -> Fut,
  Fut: Future<Output = Result<ResourcePage<T>>>,
{
  fetch_all_pages(fetch_page, MAX_PAGE_SIZE).await
}

/// `fetch_all` with an explicit page size.
///
/// Page 1 is fetched first to learn the server-reported total; pages 2..N
/// are then fetched concurrently and concatenated in page order. Any page
/// failure fails the whole aggregation - no partial results. The total is
/// trusted as reported: a later page returning fewer items than expected is
/// not re-validated.
pub async fn fetch_all_pages<T, F, Fut>(fetch_page: F, page_size: u32) -> Result<Vec<T>>
where
  F: Fn(Params) -> Fut,
  Fut: Future<Output = Result<ResourcePage<T>>>,
{
  let params = |page: u32| Params {
    page: Some(page),
    page_size: Some(page_size),
  };

  let first = fetch_page(params(1)).await?;
  let total_pages = first.results.div_ceil(page_size);

  let mut items = first.data;
  if total_pages > 1 {
    let rest = try_join_all((2..=total_pages).map(|page| fetch_page(params(page)))).await?;
    for page in rest {
      items.extend(page.data);
    }
  }

  Ok(items)
}
