//! `RenderingSurface` backed by a headless render service over HTTP.
//!
//! Service API:
//! - `POST   /documents`              `{html, widthMm}` → `{id}`
//! - `POST   /documents/:id/images`   → `{loaded, failed}` once all images settle
//! - `GET    /documents/:id/box`      → `{x, y, width, height}`
//! - `POST   /documents/:id/raster`   `{scale}` → raw RGB body, `x-raster-width`/`x-raster-height` headers
//! - `GET    /documents/:id/links`    → `[{href, rect}]`
//! - `DELETE /documents/:id`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::debug;

use crate::export::surface::{
    BoxRect, ImageLoadReport, LinkRegion, NodeId, Raster, RenderingSurface, SurfaceError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const WIDTH_HEADER: &str = "x-raster-width";
const HEIGHT_HEADER: &str = "x-raster-height";

#[derive(Clone)]
pub struct RemoteSurface {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct Mounted {
    id: String,
}

impl RemoteSurface {
    pub fn new(base_url: &str) -> Result<Self, SurfaceError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(response: Response) -> Result<Response, SurfaceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(SurfaceError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, SurfaceError> {
    Ok(check(response).await?.json::<T>().await?)
}

fn dimension(response: &Response, header: &str) -> Result<u32, SurfaceError> {
    response
        .headers()
        .get(header)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SurfaceError::InvalidResponse(format!("missing or invalid {header}")))
}

#[async_trait]
impl RenderingSurface for RemoteSurface {
    async fn mount(&self, html: &str, width_mm: f64) -> Result<NodeId, SurfaceError> {
        let response = self
            .client
            .post(self.url("/documents"))
            .json(&json!({ "html": html, "widthMm": width_mm }))
            .send()
            .await?;
        let mounted: Mounted = json_body(response).await?;
        debug!("Mounted off-screen document {}", mounted.id);
        Ok(NodeId(mounted.id))
    }

    async fn wait_for_images(&self, node: &NodeId) -> Result<ImageLoadReport, SurfaceError> {
        let response = self
            .client
            .post(self.url(&format!("/documents/{}/images", node.0)))
            .send()
            .await?;
        json_body(response).await
    }

    async fn measure(&self, node: &NodeId) -> Result<BoxRect, SurfaceError> {
        let response = self
            .client
            .get(self.url(&format!("/documents/{}/box", node.0)))
            .send()
            .await?;
        json_body(response).await
    }

    async fn rasterize(&self, node: &NodeId, scale: u32) -> Result<Raster, SurfaceError> {
        let response = self
            .client
            .post(self.url(&format!("/documents/{}/raster", node.0)))
            .json(&json!({ "scale": scale }))
            .send()
            .await?;
        let response = check(response).await?;
        let width = dimension(&response, WIDTH_HEADER)?;
        let height = dimension(&response, HEIGHT_HEADER)?;
        let rgb = response.bytes().await?.to_vec();

        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(SurfaceError::InvalidResponse(format!(
                "raster body is {} bytes, expected {expected} for {width}x{height}",
                rgb.len()
            )));
        }
        Ok(Raster { width, height, rgb })
    }

    async fn link_regions(&self, node: &NodeId) -> Result<Vec<LinkRegion>, SurfaceError> {
        let response = self
            .client
            .get(self.url(&format!("/documents/{}/links", node.0)))
            .send()
            .await?;
        json_body(response).await
    }

    async fn unmount(&self, node: &NodeId) -> Result<(), SurfaceError> {
        let response = self
            .client
            .delete(self.url(&format!("/documents/{}", node.0)))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
