use crate::error::{BookingError, Result};
use crate::types::{BookingRecord, CabType};

#[cfg(feature = "ssr")]
pub use rest::HttpBackend;

/// Read access to the booking REST backend.
///
/// `Ok(None)` means the backend answered without a `data` payload.
#[allow(async_fn_in_trait)]
pub trait BookingBackend {
    async fn booking_by_id(&self, id: &str, token: Option<&str>) -> Result<Option<BookingRecord>>;
    async fn cab_type_by_id(&self, id: &str) -> Result<Option<CabType>>;
}

/// Browser-side backend that goes through the server functions in
/// [`crate::api`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFnBackend;

impl BookingBackend for ServerFnBackend {
    async fn booking_by_id(&self, id: &str, token: Option<&str>) -> Result<Option<BookingRecord>> {
        crate::api::get_booking(id.to_string(), token.map(str::to_string))
            .await
            .map_err(|e| BookingError::BackendUnavailable(e.to_string()))
    }

    async fn cab_type_by_id(&self, id: &str) -> Result<Option<CabType>> {
        crate::api::get_cab_type(id.to_string())
            .await
            .map_err(|e| BookingError::BackendUnavailable(e.to_string()))
    }
}

#[cfg(feature = "ssr")]
mod rest {
    use super::BookingBackend;
    use crate::error::{BookingError, Result};
    use crate::types::{BookingRecord, CabType, Envelope};
    use reqwest::{Client, StatusCode};
    use serde::de::DeserializeOwned;
    use std::time::Duration;
    use tracing::debug;

    pub struct HttpBackend {
        client: Client,
        base_url: String,
    }

    impl HttpBackend {
        pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(BookingError::Http)?;

            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        async fn fetch_data<T: DeserializeOwned>(
            &self,
            url: &str,
            token: Option<&str>,
        ) -> Result<Option<T>> {
            let mut request = self.client.get(url);
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                return Err(BookingError::NotFound(url.to_string()));
            }
            if !status.is_success() {
                return Err(BookingError::InvalidResponse(format!(
                    "HTTP {status} for url={url}"
                )));
            }

            let body = response.text().await?;
            debug!("Backend response from {}: {} bytes", url, body.len());

            let envelope: Envelope<T> = serde_json::from_str(&body)
                .map_err(|e| BookingError::InvalidResponse(format!("{url}: {e}")))?;
            Ok(envelope.data)
        }
    }

    impl BookingBackend for HttpBackend {
        async fn booking_by_id(
            &self,
            id: &str,
            token: Option<&str>,
        ) -> Result<Option<BookingRecord>> {
            let url = format!("{}/booking/{}", self.base_url, urlencoding::encode(id));
            self.fetch_data(&url, token).await
        }

        async fn cab_type_by_id(&self, id: &str) -> Result<Option<CabType>> {
            let url = format!("{}/cab/type/{}", self.base_url, urlencoding::encode(id));
            self.fetch_data(&url, None).await
        }
    }

}
