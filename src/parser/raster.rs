//! Default page rasterizer for scanned PDFs.
//!
//! A scanned page is an image XObject drawn over the page; the largest such
//! image is the scan. It is decoded, resampled to the requested resolution
//! using the page's MediaBox, and re-encoded as PNG for OCR. Pages with only
//! vector content have nothing to rasterize and report a page error.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::CapabilityError;
use crate::model::{Document, Page};

use super::backend::{Bitmap, CapabilityResult, PageRasterizer};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Refuse to resample beyond this many pixels per side.
const MAX_SIDE: u32 = 20_000;

/// Extracts the embedded scan image of a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageRasterizer;

impl EmbeddedImageRasterizer {
    /// Create a new rasterizer.
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for EmbeddedImageRasterizer {
    fn rasterize_page(
        &self,
        document: &Document<'_>,
        page: Page,
        dpi: u32,
    ) -> CapabilityResult<Bitmap> {
        let doc = LopdfDocument::load_mem(document.bytes())?;

        let pages = doc.get_pages();
        let page_id = *pages.get(&page.number()).ok_or_else(|| {
            CapabilityError::page(
                page.number(),
                format!("out of range (document has {} pages)", pages.len()),
            )
        })?;

        let fail = |message: String| CapabilityError::page(page.number(), message);

        let image = largest_page_image(&doc, page_id)
            .map_err(fail)?
            .ok_or_else(|| fail("no embedded image on page".to_string()))?;

        let image = match target_size(&doc, page_id, dpi) {
            Some((width, height)) if (width, height) != (image.width(), image.height()) => {
                image.resize_exact(width, height, FilterType::Triangle)
            }
            _ => image,
        };

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageOutputFormat::Png)
            .map_err(|e| fail(format!("PNG encode failed: {}", e)))?;

        log::debug!(
            "rasterized {} at {} dpi: {}x{}",
            page,
            dpi,
            image.width(),
            image.height()
        );

        Ok(Bitmap {
            png: png.into_inner(),
            width: image.width(),
            height: image.height(),
            dpi,
        })
    }
}

/// Pixel size of the page at `dpi`, from its (possibly inherited) MediaBox.
fn target_size(doc: &LopdfDocument, page_id: ObjectId, dpi: u32) -> Option<(u32, u32)> {
    let media_box = match resolve(doc, inherited(doc, page_id, b"MediaBox")?) {
        Object::Array(values) => values,
        _ => return None,
    };
    let numbers: Vec<f32> = media_box
        .iter()
        .filter_map(|o| super::layout::get_number(resolve(doc, o)))
        .collect();
    let [x0, y0, x1, y1] = numbers[..] else {
        return None;
    };

    let scale = dpi as f32 / POINTS_PER_INCH;
    let width = ((x1 - x0).abs() * scale).round() as u32;
    let height = ((y1 - y0).abs() * scale).round() as u32;
    (width > 0 && height > 0 && width <= MAX_SIDE && height <= MAX_SIDE)
        .then_some((width, height))
}

/// Look up a page attribute, following the /Parent chain.
fn inherited<'a>(doc: &'a LopdfDocument, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    // Page trees are shallow; the bound guards against /Parent cycles.
    for _ in 0..32 {
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode the largest image XObject of a page.
fn largest_page_image(
    doc: &LopdfDocument,
    page_id: ObjectId,
) -> Result<Option<DynamicImage>, String> {
    let Some(resources) = inherited(doc, page_id, b"Resources") else {
        return Ok(None);
    };
    let Ok(resources) = resolve(doc, resources).as_dict() else {
        return Ok(None);
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
    else {
        return Ok(None);
    };

    let mut largest: Option<&Stream> = None;
    for (_name, obj) in xobjects.iter() {
        let Object::Stream(stream) = resolve(doc, obj) else {
            continue;
        };
        if !is_image(&stream.dict) {
            continue;
        }
        let area = |s: &Stream| {
            get_int(&s.dict, b"Width").saturating_mul(get_int(&s.dict, b"Height"))
        };
        if largest.map_or(true, |prev| area(stream) > area(prev)) {
            largest = Some(stream);
        }
    }

    largest.map(|stream| decode_image(doc, stream)).transpose()
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image")
}

/// A non-negative integer entry; missing or negative values read as 0.
fn get_int(dict: &Dictionary, key: &[u8]) -> u64 {
    dict.get(key)
        .and_then(Object::as_i64)
        .map_or(0, |v| v.max(0) as u64)
}

fn has_filter(dict: &Dictionary, name: &[u8]) -> bool {
    match dict.get(b"Filter") {
        Ok(Object::Name(n)) => n == name,
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(n) if n == name)),
        _ => false,
    }
}

/// Decode an image stream: encoded files (JPEG, PNG, TIFF) directly, raw
/// samples from /Width, /Height, /BitsPerComponent and /ColorSpace.
fn decode_image(doc: &LopdfDocument, stream: &Stream) -> Result<DynamicImage, String> {
    if has_filter(&stream.dict, b"DCTDecode") {
        // DCT data is a complete JPEG file; lopdf leaves it encoded.
        return image::load_from_memory(&stream.content)
            .map_err(|e| format!("JPEG decode failed: {}", e));
    }

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    if let Ok(image) = image::load_from_memory(&content) {
        return Ok(image);
    }

    let (raw_width, raw_height) = (
        get_int(&stream.dict, b"Width"),
        get_int(&stream.dict, b"Height"),
    );
    let (Ok(width), Ok(height)) = (u32::try_from(raw_width), u32::try_from(raw_height)) else {
        return Err(format!("image too large: {}x{}", raw_width, raw_height));
    };
    if width == 0 || height == 0 {
        return Err("image has no pixels".to_string());
    }
    let bpc = match stream.dict.get(b"BitsPerComponent") {
        Ok(_) => get_int(&stream.dict, b"BitsPerComponent"),
        Err(_) => 8,
    };
    if bpc != 8 {
        return Err(format!("unsupported {} bits per component", bpc));
    }

    let channels = channels(doc, &stream.dict);
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or_else(|| format!("image too large: {}x{}", width, height))?;
    if content.len() < expected {
        return Err(format!(
            "raw pixel buffer too small: {} bytes, expected {} ({}x{}x{})",
            content.len(),
            expected,
            width,
            height,
            channels
        ));
    }
    let pixels = content[..expected].to_vec();

    let image = match channels {
        1 => image::GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        3 => image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        // CMYK read as RGBA; OCR only needs the luminance contrast.
        4 => image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
        n => return Err(format!("unsupported channel count: {}", n)),
    };
    image.ok_or_else(|| "invalid image dimensions".to_string())
}

/// Color channels of an image from its /ColorSpace.
fn channels(doc: &LopdfDocument, dict: &Dictionary) -> u32 {
    let Ok(color_space) = dict.get(b"ColorSpace") else {
        return 3;
    };

    match resolve(doc, color_space) {
        Object::Name(n) => match n.as_slice() {
            b"DeviceGray" | b"CalGray" => 1,
            b"DeviceCMYK" => 4,
            _ => 3,
        },
        Object::Array(parts) => match parts.first() {
            Some(Object::Name(n)) if n == b"ICCBased" => parts
                .get(1)
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_stream().ok())
                .map(|s| get_int(&s.dict, b"N"))
                .filter(|n| matches!(n, 1 | 3 | 4))
                .map(|n| n as u32)
                .unwrap_or(3),
            Some(Object::Name(n)) if n == b"Indexed" => 1,
            _ => 3,
        },
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn assert_send_sync<T: Send + Sync>() {}

    fn make_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([128u8, 128, 128]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, ImageOutputFormat::Jpeg(85))
            .unwrap();
        bytes.into_inner()
    }

    /// One-page PDF, 72x144 points, optionally carrying an image XObject.
    fn make_pdf(image: Option<Stream>) -> Vec<u8> {
        make_pdf_with_images(image.into_iter().collect())
    }

    #[test]
    fn test_send_sync() {
        assert_send_sync::<EmbeddedImageRasterizer>();
    }

    #[test]
    fn test_jpeg_scan_resampled_to_dpi() {
        let jpeg = make_jpeg(40, 80);
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(40),
                "Height" => Object::Integer(80),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            jpeg,
        );
        stream.allows_compression = false;
        let bytes = make_pdf(Some(stream));

        let bitmap = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 200)
            .unwrap();

        // 1in x 2in at 200 dpi
        assert_eq!((bitmap.width, bitmap.height), (200, 400));
        assert_eq!(bitmap.dpi, 200);
        assert_eq!(&bitmap.png[1..4], b"PNG");
    }

    #[test]
    fn test_raw_gray_scan() {
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(4),
                "Height" => Object::Integer(2),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            },
            vec![0, 255, 0, 255, 255, 0, 255, 0],
        );
        stream.allows_compression = false;
        let bytes = make_pdf(Some(stream));

        let bitmap = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 72)
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (72, 144));
    }

    fn gray_image(width: i64, height: i64, pixels: Vec<u8>) -> Stream {
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(width),
                "Height" => Object::Integer(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            },
            pixels,
        );
        stream.allows_compression = false;
        stream
    }

    /// One-page PDF, 72x144 points, carrying every given image XObject.
    fn make_pdf_with_images(images: Vec<Stream>) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut xobjects = Dictionary::new();
        for (i, stream) in images.into_iter().enumerate() {
            let image_id = doc.add_object(Object::Stream(stream));
            xobjects.set(format!("Im{}", i), Object::Reference(image_id));
        }

        let content_id = doc.add_object(Stream::new(dictionary! {}, b"/Im0 Do".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
            "MediaBox" => vec![0.into(), 0.into(), 72.into(), 144.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_oversized_image_dimensions_are_a_page_error() {
        let bytes = make_pdf_with_images(vec![
            gray_image(4_000_000_000, 4_000_000_000, vec![0; 16]),
            gray_image(4_000_000_000, 4_000_000_000, vec![0; 16]),
        ]);

        let err = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 200)
            .unwrap_err();
        assert!(matches!(err, CapabilityError::Page { page: 1, .. }));
    }

    #[test]
    fn test_dimensions_beyond_u32_are_a_page_error() {
        let bytes = make_pdf_with_images(vec![gray_image(i64::MAX, i64::MAX, vec![0; 16])]);

        let err = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 200)
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::page(
                1,
                format!("image too large: {}x{}", i64::MAX, i64::MAX)
            )
        );
    }

    #[test]
    fn test_negative_dimensions_are_a_page_error() {
        let bytes = make_pdf_with_images(vec![gray_image(-8, 16, vec![0; 16])]);

        let err = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 200)
            .unwrap_err();
        assert_eq!(err, CapabilityError::page(1, "image has no pixels"));
    }

    #[test]
    fn test_largest_image_wins() {
        let bytes = make_pdf_with_images(vec![
            gray_image(2, 2, vec![0; 4]),
            gray_image(4, 8, vec![255; 32]),
        ]);

        let bitmap = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 72)
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (72, 144));
    }

    #[test]
    fn test_page_without_image() {
        let bytes = make_pdf(None);
        let err = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(&bytes), Page::new(1), 200)
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::page(1, "no embedded image on page")
        );
    }

    #[test]
    fn test_unreadable_document() {
        let err = EmbeddedImageRasterizer::new()
            .rasterize_page(&Document::new(b"not a pdf"), Page::new(1), 200)
            .unwrap_err();
        assert!(err.is_document_level());
    }
}
