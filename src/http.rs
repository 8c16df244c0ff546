use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};

/// Transport seam for the record loader; tests substitute a stub so the
/// pipeline runs without a network.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<HttpTextResult>;
}

#[derive(Clone, Debug)]
pub struct HttpTextResult {
    pub status: u16,
    pub body: String,
}

pub struct ReqwestHttp;

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get_text(&self, url: &str) -> Result<HttpTextResult> {
        let client = reqwest::Client::new();
        let resp = client
            .get(url)
            // Published sheets sit behind aggressive edge caches; always
            // read the live export.
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpTextResult { status, body })
    }
}
