use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use super::{DocumentAssembler, DocumentLayout};
use crate::rendering::RasterImage;
use crate::{Error, Result};

/// Points per millimetre
const PT_PER_MM: f64 = 72.0 / 25.4;

const IMAGE_NAME: &[u8] = b"Im1";

/// Writes one PDF page per [`crate::paginate::PageSpec`], each drawing the
/// same embedded image at its offset.
#[derive(Debug, Clone, Copy)]
pub struct PdfAssembler {
    /// zlib level used for image and content streams
    pub compression: u8,
}

impl PdfAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self { compression: 6 }
    }
}

impl DocumentAssembler for PdfAssembler {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn assemble(&self, layout: &DocumentLayout, image: &RasterImage) -> Result<Vec<u8>> {
        if layout.pages.is_empty() {
            return Err(Error::AssemblyError("document has no pages".into()));
        }
        let t0 = std::time::Instant::now();

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        let catalog_id = alloc();
        let pages_id = alloc();
        let image_id = alloc();

        let pixels = image.pixels();
        let (w, h) = (image.width() as i32, image.height() as i32);
        let rgb: Vec<u8> = pixels.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();
        let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb, self.compression);

        // only emit a soft mask when some pixel is not fully opaque
        let smask_id = if pixels.pixels().any(|p| p[3] < 255) {
            let alpha: Vec<u8> = pixels.pixels().map(|p| p[3]).collect();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&alpha, self.compression);
            let mask_id = alloc();
            let mut mask = pdf.image_xobject(mask_id, &compressed);
            mask.filter(Filter::FlateDecode);
            mask.width(w);
            mask.height(h);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            Some(mask_id)
        } else {
            None
        };

        {
            let mut xobj = pdf.image_xobject(image_id, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w);
            xobj.height(h);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_id) = smask_id {
                xobj.s_mask(mask_id);
            }
        }

        let page_w = (layout.page_size.width * PT_PER_MM) as f32;
        let page_h = (layout.page_size.height * PT_PER_MM) as f32;
        let image_h = layout.image_height * PT_PER_MM;

        let n = layout.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (i, spec) in layout.pages.iter().enumerate() {
            // PDF y grows upwards: the image bottom sits at
            // page_h - (offset + image_h) measured from the page top.
            let bottom = page_h as f64 - (spec.offset * PT_PER_MM + image_h);
            let mut content = Content::new();
            content.save_state();
            content.transform([page_w, 0.0, 0.0, image_h as f32, 0.0, bottom as f32]);
            content.x_object(Name(IMAGE_NAME));
            content.restore_state();

            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), self.compression);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, page_w, page_h))
                .parent(pages_id)
                .contents(content_ids[i]);
            page.resources().x_objects().pair(Name(IMAGE_NAME), image_id);
        }

        let bytes = pdf.finish();
        log::info!(
            "Assembled {} page PDF ({} bytes) in {:.1}ms",
            n,
            bytes.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(bytes)
    }
}
