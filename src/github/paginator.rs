use std::marker::PhantomData;

use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::github::client::ensure_success;
use crate::github::rate_limit::RateLimitStatus;

pub const PER_PAGE: u32 = 100;

/// A lazy, finite sequence of result pages.
///
/// Each call to [`Paginator::next_page`] issues one request and follows the
/// `Link: rel="next"` header. The sequence ends when no next link is given or
/// a page comes back empty, and cannot be restarted. A next link pointing at
/// another origin than the first page is rejected, since the client's
/// credentials would be sent along with it.
pub struct Paginator<'a, T> {
    client: &'a Client,
    context: String,
    origin: Option<Origin>,
    next_url: Option<String>,
    pages_fetched: u32,
    _item: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Paginator<'a, T> {
    pub fn new(client: &'a Client, first_url: String, context: impl Into<String>) -> Self {
        Self {
            client,
            context: context.into(),
            origin: origin_of(&first_url),
            next_url: Some(first_url),
            pages_fetched: 0,
            _item: PhantomData,
        }
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        tracing::debug!("Fetching: {}", url);
        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response, &self.context).await?;

        RateLimitStatus::from_headers(response.headers()).log();
        let next = next_link(response.headers());
        if let Some(next_url) = &next {
            if self.origin.is_none() || origin_of(next_url) != self.origin {
                return Err(Error::GitHubApi {
                    status: response.status().as_u16(),
                    message: format!(
                        "refusing to follow pagination link to a different host for {}: {}",
                        self.context, next_url
                    ),
                });
            }
        }

        let body = response.bytes().await?;
        let items: Vec<T> = serde_json::from_slice(&body)?;
        self.pages_fetched += 1;

        if items.is_empty() {
            return Ok(None);
        }

        self.next_url = next;
        Ok(Some(items))
    }

    /// Drains the remaining pages, preserving order.
    pub async fn fetch_all(mut self) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        while let Some(items) = self.next_page().await? {
            all_items.extend(items);
        }
        tracing::debug!(
            "Fetched {} items in {} pages for {}",
            all_items.len(),
            self.pages_fetched,
            self.context
        );
        Ok(all_items)
    }
}

type Origin = (String, String, Option<u16>);

fn origin_of(url: &str) -> Option<Origin> {
    let url = Url::parse(url).ok()?;
    Some((
        url.scheme().to_string(),
        url.host_str()?.to_string(),
        url.port_or_known_default(),
    ))
}

/// Extracts the `rel="next"` target from a `Link` header.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        parts
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| url.to_string())
    })
}
