//! HTTP access to the trees, orders and image-detection services.
//!
//! Every call is a single request: no retries and no client-side timeout.

use reqwest::{
    Client,
    multipart::{Form, Part},
};
use tracing::{debug, info, warn};

use crate::{
    config::Endpoints,
    errors::ApiError,
    orders::{OrderPayload, OrderResponse},
    trees::{StatusFilter, TreeRecord},
    upload::SelectedFile,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Posts an order.
    ///
    /// The HTTP status is not looked at: the orders API reports rejections in
    /// the body, so any JSON body comes back as an [`OrderResponse`].
    pub async fn place_order(&self, payload: &OrderPayload) -> Result<OrderResponse, ApiError> {
        debug!(url = %self.endpoints.orders, ?payload, "posting order");
        let body = self
            .http
            .post(&self.endpoints.orders)
            .json(payload)
            .send()
            .await?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Lists tree records for one status tab.
    pub async fn list_trees(&self, filter: StatusFilter) -> Result<Vec<TreeRecord>, ApiError> {
        let url = filter.url(&self.endpoints.trees);
        debug!(%url, %filter, "fetching trees");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "trees request rejected");
            return Err(ApiError::Status {
                status,
                context: "Failed to fetch trees",
            });
        }
        let body = resp.bytes().await?;
        let trees: Vec<TreeRecord> = serde_json::from_slice(&body)?;
        info!(%filter, count = trees.len(), "trees loaded");
        Ok(trees)
    }

    /// Sends one photo to the image-detection service as a multipart `file` field.
    pub async fn detect_image(
        &self,
        file: &SelectedFile,
        bytes: Vec<u8>,
    ) -> Result<serde_json::Value, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        debug!(url = %self.endpoints.detect, name = %file.name, size = file.size, "uploading photo");
        let resp = self
            .http
            .post(&self.endpoints.detect)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(url = %self.endpoints.detect, %status, "detection request rejected");
            return Err(ApiError::Status {
                status,
                context: "Image detection failed",
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
