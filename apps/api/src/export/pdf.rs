//! PDF encoding for raster documents.
//!
//! The raster is scaled to the A4 page width and cut into page-height slices. Each
//! slice becomes one page holding a single Flate-compressed RGB image. Link regions,
//! given in raster pixels, become URI annotations on every page they overlap.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::export::surface::{LinkRegion, Raster};

pub const A4_WIDTH_PT: f64 = 595.28;
pub const A4_HEIGHT_PT: f64 = 841.89;

const IMAGE_NAME: &str = "Im0";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error("raster buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("compressing page image failed: {0}")]
    Compress(#[from] std::io::Error),

    #[error("writing PDF failed: {0}")]
    Write(String),
}

pub trait PdfEncoder: Send + Sync {
    fn encode(&self, raster: &Raster, links: &[LinkRegion]) -> Result<Vec<u8>, PdfError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterPdfEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slice {
    top: u32,
    rows: u32,
}

/// Pixel rows that fit on one page once the raster is scaled to page width.
fn rows_per_page(raster_width: u32) -> u32 {
    let pt_per_px = A4_WIDTH_PT / raster_width as f64;
    ((A4_HEIGHT_PT / pt_per_px).floor() as u32).max(1)
}

fn slices(height: u32, per_page: u32) -> Vec<Slice> {
    (0..height)
        .step_by(per_page as usize)
        .map(|top| Slice {
            top,
            rows: per_page.min(height - top),
        })
        .collect()
}

/// Annotation rectangle `[x1 y1 x2 y2]` in page points for the part of `link`
/// inside `slice`, or `None` if they do not overlap.
fn link_rect_on_page(link: &LinkRegion, slice: Slice, pt_per_px: f64) -> Option<[f64; 4]> {
    let top = link.rect.y.max(slice.top as f64);
    let bottom = (link.rect.y + link.rect.height).min((slice.top + slice.rows) as f64);
    if bottom <= top || link.rect.width <= 0.0 {
        return None;
    }
    let x1 = link.rect.x * pt_per_px;
    let x2 = (link.rect.x + link.rect.width) * pt_per_px;
    // PDF y grows upwards from the bottom edge.
    let y_top = A4_HEIGHT_PT - (top - slice.top as f64) * pt_per_px;
    let y_bottom = A4_HEIGHT_PT - (bottom - slice.top as f64) * pt_per_px;
    Some([x1, y_bottom, x2, y_top])
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn image_xobject(raster: &Raster, slice: Slice) -> Result<Stream, PdfError> {
    let start = slice.top as usize * raster.row_bytes();
    let end = start + slice.rows as usize * raster.row_bytes();
    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(raster.width as i64),
            "Height" => Object::Integer(slice.rows as i64),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "FlateDecode",
        },
        deflate(&raster.rgb[start..end])?,
    ))
}

/// Draws the slice image across the page width, anchored to the top edge.
fn page_content(drawn_height: f64) -> Result<Stream, PdfError> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(A4_WIDTH_PT),
                    Object::Integer(0),
                    Object::Integer(0),
                    real(drawn_height),
                    Object::Integer(0),
                    real(A4_HEIGHT_PT - drawn_height),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let bytes = content
        .encode()
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(Stream::new(dictionary! {}, bytes))
}

fn link_annotation(href: &str, [x1, y1, x2, y2]: [f64; 4]) -> Object {
    Object::Dictionary(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![real(x1), real(y1), real(x2), real(y2)],
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
        "A" => dictionary! {
            "Type" => "Action",
            "S" => "URI",
            "URI" => Object::string_literal(href),
        },
    })
}

impl PdfEncoder for RasterPdfEncoder {
    fn encode(&self, raster: &Raster, links: &[LinkRegion]) -> Result<Vec<u8>, PdfError> {
        if raster.width == 0 || raster.height == 0 {
            return Err(PdfError::EmptyRaster {
                width: raster.width,
                height: raster.height,
            });
        }
        let expected = raster.row_bytes() * raster.height as usize;
        if raster.rgb.len() != expected {
            return Err(PdfError::BufferSize {
                expected,
                actual: raster.rgb.len(),
            });
        }

        let pt_per_px = A4_WIDTH_PT / raster.width as f64;
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<ObjectId> = Vec::new();

        for slice in slices(raster.height, rows_per_page(raster.width)) {
            let image_id = doc.add_object(image_xobject(raster, slice)?);
            let content_id = doc.add_object(page_content(slice.rows as f64 * pt_per_px)?);

            let annots: Vec<Object> = links
                .iter()
                .filter_map(|link| {
                    link_rect_on_page(link, slice, pt_per_px)
                        .map(|rect| doc.add_object(link_annotation(&link.href, rect)).into())
                })
                .collect();

            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(A4_WIDTH_PT),
                    real(A4_HEIGHT_PT),
                ],
                "Resources" => dictionary! {
                    "XObject" => dictionary! { IMAGE_NAME => image_id },
                },
                "Contents" => content_id,
            };
            if !annots.is_empty() {
                page.set("Annots", annots);
            }
            kids.push(doc.add_object(page));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.into_iter().map(Object::from).collect::<Vec<_>>(),
                "Count" => Object::Integer(count),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;
    use lopdf::Dictionary;

    use super::*;
    use crate::export::surface::BoxRect;

    fn white(width: u32, height: u32) -> Raster {
        Raster {
            width,
            height,
            rgb: vec![255; width as usize * height as usize * 3],
        }
    }

    fn load(pdf: &[u8]) -> Document {
        Document::load_mem(pdf).unwrap()
    }

    fn page_dicts(doc: &Document) -> Vec<&Dictionary> {
        doc.get_pages()
            .values()
            .map(|id| doc.get_object(*id).unwrap().as_dict().unwrap())
            .collect()
    }

    fn page_image<'a>(doc: &'a Document, page: &Dictionary) -> &'a Stream {
        let image_ref = page
            .get(b"Resources")
            .and_then(Object::as_dict)
            .and_then(|r| r.get(b"XObject"))
            .and_then(Object::as_dict)
            .and_then(|x| x.get(IMAGE_NAME.as_bytes()))
            .and_then(Object::as_reference)
            .unwrap();
        doc.get_object(image_ref).unwrap().as_stream().unwrap()
    }

    fn link_uris(doc: &Document, page: &Dictionary) -> Vec<String> {
        let Ok(annots) = page.get(b"Annots").and_then(Object::as_array) else {
            return Vec::new();
        };
        annots
            .iter()
            .map(|annot| {
                let dict = doc
                    .get_object(annot.as_reference().unwrap())
                    .unwrap()
                    .as_dict()
                    .unwrap();
                let action = dict.get(b"A").and_then(Object::as_dict).unwrap();
                match action.get(b"URI").unwrap() {
                    Object::String(bytes, _) => String::from_utf8(bytes.clone()).unwrap(),
                    other => panic!("URI is not a string: {other:?}"),
                }
            })
            .collect()
    }

    #[test]
    fn test_single_page_document() {
        let pdf = RasterPdfEncoder.encode(&white(300, 200), &[]).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        let doc = load(&pdf);
        let pages = page_dicts(&doc);
        assert_eq!(pages.len(), 1);

        let media_box = pages[0].get(b"MediaBox").and_then(Object::as_array).unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width as f64 - A4_WIDTH_PT).abs() < 0.01);
        assert!((height as f64 - A4_HEIGHT_PT).abs() < 0.01);
    }

    #[test]
    fn test_page_image_is_flate_compressed_rgb() {
        let mut raster = white(40, 30);
        raster.rgb[0..3].copy_from_slice(&[12, 34, 56]);
        let doc = load(&RasterPdfEncoder.encode(&raster, &[]).unwrap());
        let pages = page_dicts(&doc);
        let image = page_image(&doc, pages[0]);

        assert_eq!(image.dict.get(b"Filter").and_then(Object::as_name).unwrap(), b"FlateDecode");
        assert_eq!(image.dict.get(b"Width").and_then(Object::as_i64).unwrap(), 40);
        assert_eq!(image.dict.get(b"Height").and_then(Object::as_i64).unwrap(), 30);
        assert!(image.content.len() < raster.rgb.len());

        let mut decoded = Vec::new();
        ZlibDecoder::new(image.content.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, raster.rgb);
    }

    #[test]
    fn test_tall_raster_is_sliced_into_pages() {
        // 100 px wide → 141 rows per page; 300 rows need three pages.
        assert_eq!(rows_per_page(100), 141);
        assert_eq!(
            slices(300, 141),
            vec![
                Slice { top: 0, rows: 141 },
                Slice { top: 141, rows: 141 },
                Slice { top: 282, rows: 18 },
            ]
        );
        let doc = load(&RasterPdfEncoder.encode(&white(100, 300), &[]).unwrap());
        let heights: Vec<i64> = page_dicts(&doc)
            .into_iter()
            .map(|page| {
                page_image(&doc, page)
                    .dict
                    .get(b"Height")
                    .and_then(Object::as_i64)
                    .unwrap()
            })
            .collect();
        assert_eq!(heights, vec![141, 141, 18]);
    }

    #[test]
    fn test_link_annotation_flips_y_axis() {
        let link = LinkRegion {
            href: "https://jane.dev".to_string(),
            rect: BoxRect {
                x: 10.0,
                y: 20.0,
                width: 30.0,
                height: 5.0,
            },
        };
        let slice = Slice { top: 0, rows: 141 };
        let [x1, y1, x2, y2] = link_rect_on_page(&link, slice, 2.0).unwrap();
        assert_eq!((x1, x2), (20.0, 80.0));
        assert!((y2 - (A4_HEIGHT_PT - 40.0)).abs() < 1e-9);
        assert!((y1 - (A4_HEIGHT_PT - 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_link_spanning_page_break_is_annotated_on_both_pages() {
        let link = LinkRegion {
            href: "mailto:jane@example.com".to_string(),
            rect: BoxRect {
                x: 0.0,
                y: 135.0,
                width: 50.0,
                height: 12.0,
            },
        };
        let doc = load(
            &RasterPdfEncoder
                .encode(&white(100, 300), std::slice::from_ref(&link))
                .unwrap(),
        );
        let pages = page_dicts(&doc);
        assert_eq!(link_uris(&doc, pages[0]), vec!["mailto:jane@example.com"]);
        assert_eq!(link_uris(&doc, pages[1]), vec!["mailto:jane@example.com"]);
        assert!(link_uris(&doc, pages[2]).is_empty());

        let off_page = Slice { top: 282, rows: 18 };
        assert!(link_rect_on_page(&link, off_page, 1.0).is_none());
    }

    #[test]
    fn test_buffer_size_mismatch_rejected() {
        let raster = Raster {
            width: 10,
            height: 10,
            rgb: vec![0; 10],
        };
        assert!(matches!(
            RasterPdfEncoder.encode(&raster, &[]),
            Err(PdfError::BufferSize { expected: 300, actual: 10 })
        ));
    }

    #[test]
    fn test_empty_raster_rejected() {
        assert!(matches!(
            RasterPdfEncoder.encode(&white(0, 10), &[]),
            Err(PdfError::EmptyRaster { width: 0, height: 10 })
        ));
    }
}
