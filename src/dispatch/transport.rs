use std::future::Future;
use std::time::Duration;

/// JSONをPOSTしてHTTPステータスを返す
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<u16, String>> + Send;
}

/// reqwest による送信（認証なし）
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<u16, String>> + Send {
        let request = self.client.post(url).json(body);
        async move {
            request
                .send()
                .await
                .map(|resp| resp.status().as_u16())
                .map_err(|e| e.to_string())
        }
    }
}
