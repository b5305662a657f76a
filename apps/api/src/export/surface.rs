//! The rendering primitives the export needs from a layout engine.
//!
//! Coordinates are CSS pixels in the surface's page space unless stated otherwise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("render service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("invalid response from render service: {0}")]
    InvalidResponse(String),
}

/// Handle to a mounted off-screen document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A clickable area and its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRegion {
    pub href: String,
    pub rect: BoxRect,
}

/// Packed 8-bit RGB pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Raster {
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 3
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLoadReport {
    pub loaded: u32,
    pub failed: u32,
}

#[async_trait]
pub trait RenderingSurface: Send + Sync {
    /// Mounts `html` off-screen with its page element forced to `width_mm`.
    async fn mount(&self, html: &str, width_mm: f64) -> Result<NodeId, SurfaceError>;

    /// Resolves once every image has either loaded or failed.
    async fn wait_for_images(&self, node: &NodeId) -> Result<ImageLoadReport, SurfaceError>;

    async fn measure(&self, node: &NodeId) -> Result<BoxRect, SurfaceError>;

    async fn rasterize(&self, node: &NodeId, scale: u32) -> Result<Raster, SurfaceError>;

    async fn link_regions(&self, node: &NodeId) -> Result<Vec<LinkRegion>, SurfaceError>;

    async fn unmount(&self, node: &NodeId) -> Result<(), SurfaceError>;
}
