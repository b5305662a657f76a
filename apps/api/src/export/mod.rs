//! Export Pipeline: turns a rendered CV into a downloadable PDF.
//!
//! Stages run in a fixed order: mount an off-screen copy at A4 width → wait for
//! images → settle → measure → rasterize at ×3 → collect link regions → unmount →
//! encode. The copy is unmounted on every path once it has been mounted.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::render::RenderedDocument;

pub mod pdf;
pub mod remote;
pub mod surface;

pub use pdf::{PdfEncoder, PdfError, RasterPdfEncoder};
pub use remote::RemoteSurface;
pub use surface::{BoxRect, LinkRegion, NodeId, Raster, RenderingSurface, SurfaceError};

pub const A4_WIDTH_MM: f64 = 210.0;
/// Supersampling factor for rasterization.
pub const SUPERSAMPLE: u32 = 3;
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Production pipeline type held in `AppState`.
pub type PdfExporter = ExportPipeline<RemoteSurface, RasterPdfEncoder>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("rendering surface unavailable")]
    SurfaceUnavailable,

    #[error("mounting the document failed: {0}")]
    Mount(#[source] SurfaceError),

    #[error("waiting for images failed: {0}")]
    Images(#[source] SurfaceError),

    #[error("measuring the document failed: {0}")]
    Measure(#[source] SurfaceError),

    #[error("document has no area ({width}x{height})")]
    EmptyDocument { width: f64, height: f64 },

    #[error("rasterization failed: {0}")]
    Rasterize(#[source] SurfaceError),

    #[error("raster is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    RasterSize {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("collecting links failed: {0}")]
    Links(#[source] SurfaceError),

    #[error("PDF encoding failed: {0}")]
    Encode(#[from] PdfError),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::ExternalService(format!("PDF export failed: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `<name>.pdf` where every char outside `[a-z0-9]` (after ASCII lowercasing) is `_`.
pub fn export_file_name(display_name: &str) -> String {
    let safe: String = display_name
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect();
    format!("{safe}.pdf")
}

/// Moves a link into raster pixel space: relative to the document box, times `scale`.
fn scale_region(link: LinkRegion, origin: &BoxRect, scale: u32) -> LinkRegion {
    let s = scale as f64;
    LinkRegion {
        href: link.href,
        rect: BoxRect {
            x: (link.rect.x - origin.x) * s,
            y: (link.rect.y - origin.y) * s,
            width: link.rect.width * s,
            height: link.rect.height * s,
        },
    }
}

pub struct ExportPipeline<S, E> {
    surface: S,
    encoder: E,
    settle: Duration,
}

impl<S: RenderingSurface, E: PdfEncoder> ExportPipeline<S, E> {
    pub fn new(surface: S, encoder: E) -> Self {
        Self {
            surface,
            encoder,
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub async fn export(&self, doc: &RenderedDocument) -> Result<ExportedPdf, ExportError> {
        let node = self
            .surface
            .mount(&doc.html, A4_WIDTH_MM)
            .await
            .map_err(ExportError::Mount)?;

        let captured = self.capture(&node).await;

        if let Err(e) = self.surface.unmount(&node).await {
            warn!("Failed to unmount export copy {}: {e}", node.0);
        }

        let (raster, links) = captured?;
        let bytes = self.encoder.encode(&raster, &links)?;
        let file_name = export_file_name(&doc.display_name);
        info!(
            "Exported {file_name} ({} bytes, {}x{} raster, {} links)",
            bytes.len(),
            raster.width,
            raster.height,
            links.len()
        );
        Ok(ExportedPdf { file_name, bytes })
    }

    /// Everything between mount and unmount.
    async fn capture(&self, node: &NodeId) -> Result<(Raster, Vec<LinkRegion>), ExportError> {
        let images = self
            .surface
            .wait_for_images(node)
            .await
            .map_err(ExportError::Images)?;
        if images.failed > 0 {
            warn!("{} image(s) failed to load before export", images.failed);
        }
        debug!("Images settled: {} loaded, {} failed", images.loaded, images.failed);

        tokio::time::sleep(self.settle).await;

        let rect = self
            .surface
            .measure(node)
            .await
            .map_err(ExportError::Measure)?;
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(ExportError::EmptyDocument {
                width: rect.width,
                height: rect.height,
            });
        }

        let raster = self
            .surface
            .rasterize(node, SUPERSAMPLE)
            .await
            .map_err(ExportError::Rasterize)?;
        let expected_width = (rect.width * SUPERSAMPLE as f64).round() as u32;
        let expected_height = (rect.height * SUPERSAMPLE as f64).round() as u32;
        if raster.width != expected_width || raster.height != expected_height {
            return Err(ExportError::RasterSize {
                expected_width,
                expected_height,
                actual_width: raster.width,
                actual_height: raster.height,
            });
        }

        let links = self
            .surface
            .link_regions(node)
            .await
            .map_err(ExportError::Links)?
            .into_iter()
            .map(|link| scale_region(link, &rect, SUPERSAMPLE))
            .collect();

        Ok((raster, links))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::export::surface::ImageLoadReport;
    use crate::render::{render_cv, PhotoOptions, Template};
    use crate::render::test_fixtures::{content, profile};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Stage {
        Mount,
        Images,
        Measure,
        Rasterize,
        Links,
        Unmount,
    }

    #[derive(Default)]
    struct FakeSurface {
        log: Mutex<Vec<Stage>>,
        fail_at: Option<Stage>,
        /// Overrides the raster width to simulate a size mismatch.
        raster_width: Option<u32>,
        mounted_width: Mutex<Option<f64>>,
        measured_at: Mutex<Option<Instant>>,
    }

    impl FakeSurface {
        fn failing_at(stage: Stage) -> Self {
            Self {
                fail_at: Some(stage),
                ..Default::default()
            }
        }

        fn enter(&self, stage: Stage) -> Result<(), SurfaceError> {
            self.log.lock().unwrap().push(stage);
            if self.fail_at == Some(stage) {
                Err(SurfaceError::Service {
                    status: 500,
                    message: format!("{stage:?} broke"),
                })
            } else {
                Ok(())
            }
        }

        fn stages(&self) -> Vec<Stage> {
            self.log.lock().unwrap().clone()
        }
    }

    const BOX: BoxRect = BoxRect {
        x: 100.0,
        y: 50.0,
        width: 40.0,
        height: 60.0,
    };

    #[async_trait]
    impl RenderingSurface for FakeSurface {
        async fn mount(&self, _html: &str, width_mm: f64) -> Result<NodeId, SurfaceError> {
            *self.mounted_width.lock().unwrap() = Some(width_mm);
            self.enter(Stage::Mount)?;
            Ok(NodeId("copy-1".to_string()))
        }

        async fn wait_for_images(&self, _node: &NodeId) -> Result<ImageLoadReport, SurfaceError> {
            self.enter(Stage::Images)?;
            Ok(ImageLoadReport { loaded: 1, failed: 1 })
        }

        async fn measure(&self, _node: &NodeId) -> Result<BoxRect, SurfaceError> {
            *self.measured_at.lock().unwrap() = Some(Instant::now());
            self.enter(Stage::Measure)?;
            Ok(BOX)
        }

        async fn rasterize(&self, _node: &NodeId, scale: u32) -> Result<Raster, SurfaceError> {
            self.enter(Stage::Rasterize)?;
            let width = self
                .raster_width
                .unwrap_or((BOX.width as u32) * scale);
            let height = (BOX.height as u32) * scale;
            Ok(Raster {
                width,
                height,
                rgb: vec![255; width as usize * height as usize * 3],
            })
        }

        async fn link_regions(&self, _node: &NodeId) -> Result<Vec<LinkRegion>, SurfaceError> {
            self.enter(Stage::Links)?;
            Ok(vec![LinkRegion {
                href: "https://jane.dev".to_string(),
                rect: BoxRect {
                    x: 110.0,
                    y: 60.0,
                    width: 20.0,
                    height: 5.0,
                },
            }])
        }

        async fn unmount(&self, _node: &NodeId) -> Result<(), SurfaceError> {
            self.enter(Stage::Unmount)
        }
    }

    /// Records what it was asked to encode.
    #[derive(Default)]
    struct RecordingEncoder {
        links: Mutex<Vec<LinkRegion>>,
    }

    impl PdfEncoder for RecordingEncoder {
        fn encode(&self, raster: &Raster, links: &[LinkRegion]) -> Result<Vec<u8>, PdfError> {
            *self.links.lock().unwrap() = links.to_vec();
            RasterPdfEncoder.encode(raster, links)
        }
    }

    fn document() -> RenderedDocument {
        render_cv(
            Template::Professional,
            &content(),
            &profile(),
            PhotoOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stages_run_in_order_and_settle_before_measuring() {
        let pipeline = ExportPipeline::new(FakeSurface::default(), RecordingEncoder::default());
        let started = Instant::now();

        let pdf = pipeline.export(&document()).await.unwrap();

        assert_eq!(
            pipeline.surface.stages(),
            vec![
                Stage::Mount,
                Stage::Images,
                Stage::Measure,
                Stage::Rasterize,
                Stage::Links,
                Stage::Unmount
            ]
        );
        let measured_at = pipeline.surface.measured_at.lock().unwrap().unwrap();
        assert!(measured_at - started >= DEFAULT_SETTLE);
        assert_eq!(*pipeline.surface.mounted_width.lock().unwrap(), Some(A4_WIDTH_MM));
        assert_eq!(pdf.file_name, "jane_o_brien_smith.pdf");
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_links_are_scaled_relative_to_copy_origin() {
        let pipeline = ExportPipeline::new(FakeSurface::default(), RecordingEncoder::default());
        pipeline.export(&document()).await.unwrap();

        let links = pipeline.encoder.links.lock().unwrap().clone();
        assert_eq!(
            links,
            vec![LinkRegion {
                href: "https://jane.dev".to_string(),
                rect: BoxRect {
                    x: 30.0,
                    y: 30.0,
                    width: 60.0,
                    height: 15.0,
                },
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_is_unmounted_after_every_failure() {
        for stage in [Stage::Images, Stage::Measure, Stage::Rasterize, Stage::Links] {
            let pipeline =
                ExportPipeline::new(FakeSurface::failing_at(stage), RasterPdfEncoder);
            assert!(pipeline.export(&document()).await.is_err(), "{stage:?}");
            let stages = pipeline.surface.stages();
            assert_eq!(stages.last(), Some(&Stage::Unmount), "{stage:?}");
            assert_eq!(stages.iter().filter(|s| **s == Stage::Unmount).count(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mount_skips_unmount() {
        let pipeline = ExportPipeline::new(FakeSurface::failing_at(Stage::Mount), RasterPdfEncoder);
        let err = pipeline.export(&document()).await.unwrap_err();
        assert!(matches!(err, ExportError::Mount(_)));
        assert_eq!(pipeline.surface.stages(), vec![Stage::Mount]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_failure_does_not_fail_export() {
        let pipeline =
            ExportPipeline::new(FakeSurface::failing_at(Stage::Unmount), RasterPdfEncoder);
        assert!(pipeline.export(&document()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_raster_size_mismatch_is_an_error() {
        let surface = FakeSurface {
            raster_width: Some(119),
            ..Default::default()
        };
        let pipeline = ExportPipeline::new(surface, RasterPdfEncoder);
        let err = pipeline.export(&document()).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::RasterSize {
                expected_width: 120,
                actual_width: 119,
                ..
            }
        ));
        assert_eq!(pipeline.surface.stages().last(), Some(&Stage::Unmount));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_settle_is_honoured() {
        let pipeline = ExportPipeline::new(FakeSurface::default(), RasterPdfEncoder)
            .with_settle(Duration::from_secs(2));
        let started = Instant::now();
        pipeline.export(&document()).await.unwrap();
        let measured_at = pipeline.surface.measured_at.lock().unwrap().unwrap();
        assert!(measured_at - started >= Duration::from_secs(2));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Jane O'Brien-Smith!"), "jane_o_brien_smith_.pdf");
        assert_eq!(export_file_name("Zoë 2"), "zo__2.pdf");
        assert_eq!(export_file_name("ABC123"), "abc123.pdf");
    }

    #[test]
    fn test_export_error_maps_to_external_service() {
        let err: AppError = ExportError::SurfaceUnavailable.into();
        assert!(matches!(
            err,
            AppError::ExternalService(ref m) if m == "PDF export failed: rendering surface unavailable"
        ));
    }
}
