//! Signature marks and the summary page

use crate::resolver::{resolve_in, GlobalPoint, PageGeometry};
use crate::sizing::size_for;
use crate::{MarkerConfig, Result, SigningError};
use pdf_core::{Align, PageSize, PdfDocument, PdfError, Rect, StandardFont};
use serde::{Deserialize, Serialize};

/// Drawing surface for signature marks
///
/// Pages are addressed by 0-based index; coordinates are page-local points
/// from the top-left corner.
pub trait SignatureCanvas: PageGeometry {
    /// Decode an image without drawing it, returning its natural size
    fn load_image(&mut self, data: &[u8]) -> Result<(f64, f64)>;

    /// Draw an image with its top-left corner at (x, y)
    ///
    /// A missing side keeps the aspect ratio; with neither side the image
    /// is drawn one point per pixel. Returns the drawn (width, height).
    fn draw_image(
        &mut self,
        page_index: usize,
        data: &[u8],
        x: f64,
        y: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<(f64, f64)>;

    /// Draw left-aligned text with the top of the text at y
    fn draw_text(
        &mut self,
        page_index: usize,
        text: &str,
        x: f64,
        y: f64,
        font: StandardFont,
        size: f32,
    ) -> Result<()>;

    fn draw_border(&mut self, page_index: usize, rect: Rect, line_width: f64) -> Result<()>;

    /// Append a page, returning its index
    fn append_page(&mut self, size: PageSize) -> Result<usize>;
}

impl SignatureCanvas for PdfDocument {
    fn load_image(&mut self, data: &[u8]) -> Result<(f64, f64)> {
        let (width, height) = pdf_core::image_size(data)?;
        Ok((width as f64, height as f64))
    }

    fn draw_image(
        &mut self,
        page_index: usize,
        data: &[u8],
        x: f64,
        y: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<(f64, f64)> {
        Ok(self.insert_image(data, page_index + 1, x, y, width, height)?)
    }

    fn draw_text(
        &mut self,
        page_index: usize,
        text: &str,
        x: f64,
        y: f64,
        font: StandardFont,
        size: f32,
    ) -> Result<()> {
        let (previous_font, previous_size) = (self.current_font(), self.current_font_size());

        self.set_font(font.family, size);
        self.set_font_style(font.style);
        let drawn = self.insert_text(text, page_index + 1, x, y, Align::Left);

        self.set_font(previous_font.family, previous_size);
        self.set_font_style(previous_font.style);
        Ok(drawn?)
    }

    fn draw_border(&mut self, page_index: usize, rect: Rect, line_width: f64) -> Result<()> {
        Ok(self.draw_rectangle(page_index + 1, rect, line_width, pdf_core::Color::black())?)
    }

    fn append_page(&mut self, size: PageSize) -> Result<usize> {
        Ok(self.add_page(size)? - 1)
    }
}

/// What a signature looks like on the page
#[derive(Debug, Clone, PartialEq)]
pub enum Graphic {
    /// JPEG or PNG bytes; see [`SignatureCanvas::draw_image`] for sizing
    Image {
        data: Vec<u8>,
        width: Option<f64>,
        height: Option<f64>,
    },
    /// A name rendered as text
    Name(String),
}

/// One signature to place
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub signer_id: String,
    pub signer_name: String,
    /// Address the signature was made from, e.g. the client IP
    pub origin: String,
    pub placement: GlobalPoint,
    pub graphic: Graphic,
}

/// Why a signature was not drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    /// The placement lies below the last page
    UnresolvedPlacement,
    /// The image could not be decoded
    MalformedGraphic { reason: String },
}

/// Result of placing one signature
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Applied {
        page_index: usize,
        /// Drawn box in page-local coordinates
        bounds: Rect,
    },
    Skipped(SkipReason),
}

/// Draws signature marks and summary pages
#[derive(Debug, Clone, Default)]
pub struct SignatureMarker {
    config: MarkerConfig,
}

impl SignatureMarker {
    pub fn new(config: MarkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Place one signature at its stacked coordinate
    ///
    /// Undecodable images and placements below the last page are skipped
    /// without drawing anything. Other failures are returned as errors.
    pub fn place<C>(&self, canvas: &mut C, signature: &Signature) -> Result<Placement>
    where
        C: SignatureCanvas + ?Sized,
    {
        if let Some(reason) = self.check_graphic(canvas, &signature.graphic)? {
            log::warn!(
                "signature of {} has an unreadable image: {}",
                signature.signer_id,
                reason
            );
            return Ok(Placement::Skipped(SkipReason::MalformedGraphic { reason }));
        }

        let point = signature.placement;
        let Some(position) = resolve_in(&*canvas, point.y)? else {
            log::warn!(
                "signature of {} at y={} is outside the document, skipping",
                signature.signer_id,
                point.y
            );
            return Ok(Placement::Skipped(SkipReason::UnresolvedPlacement));
        };

        let bounds = self.draw_mark(
            canvas,
            position.page_index,
            point.x,
            position.local_y,
            &signature.graphic,
        )?;
        log::debug!(
            "signature of {} placed on page {} at ({}, {})",
            signature.signer_id,
            position.page_index,
            point.x,
            position.local_y
        );
        Ok(Placement::Applied {
            page_index: position.page_index,
            bounds,
        })
    }

    /// Decode error of an image graphic, if any
    fn check_graphic<C>(&self, canvas: &mut C, graphic: &Graphic) -> Result<Option<String>>
    where
        C: SignatureCanvas + ?Sized,
    {
        let Graphic::Image { data, .. } = graphic else {
            return Ok(None);
        };
        match canvas.load_image(data) {
            Ok(_) => Ok(None),
            Err(SigningError::Pdf(PdfError::ImageError(reason))) => Ok(Some(reason)),
            Err(err) => Err(err),
        }
    }

    /// Append a page listing every signature in order
    ///
    /// Rows are never continued on another page; signatures past the bottom
    /// edge are drawn off-page. Returns the index of the new page.
    pub fn append_summary_page<C>(
        &self,
        canvas: &mut C,
        signatures: &[Signature],
    ) -> Result<usize>
    where
        C: SignatureCanvas + ?Sized,
    {
        let config = &self.config;
        let page_index = canvas.append_page(config.page_size())?;
        let label_font = StandardFont::new(config.label_family(), Default::default());

        canvas.draw_border(
            page_index,
            Rect::new(
                config.border_inset,
                config.border_inset,
                config.page_width,
                config.page_height,
            ),
            config.border_width,
        )?;
        canvas.draw_text(
            page_index,
            &config.heading,
            config.heading_x,
            config.heading_y,
            label_font,
            config.label_size,
        )?;

        let mut cursor = 0.0;
        for signature in signatures {
            let rows = [
                (
                    format!("{} {}", config.origin_label, signature.origin),
                    config.origin_offset,
                ),
                (
                    format!("{} {}", config.signer_label, signature.signer_name),
                    config.signer_offset,
                ),
                (config.signature_label.clone(), config.signature_label_offset),
            ];
            for (text, offset) in &rows {
                canvas.draw_text(
                    page_index,
                    text,
                    config.margin_x,
                    cursor + offset,
                    label_font,
                    config.label_size,
                )?;
            }

            self.draw_mark(
                canvas,
                page_index,
                config.margin_x,
                cursor + config.mark_offset,
                &signature.graphic,
            )?;
            cursor += config.row_height;
        }

        log::info!(
            "summary page {} added with {} signatures",
            page_index,
            signatures.len()
        );
        Ok(page_index)
    }

    /// Draw a graphic with its top-left corner at (x, y), returning its box
    fn draw_mark<C>(
        &self,
        canvas: &mut C,
        page_index: usize,
        x: f64,
        y: f64,
        graphic: &Graphic,
    ) -> Result<Rect>
    where
        C: SignatureCanvas + ?Sized,
    {
        match graphic {
            Graphic::Image {
                data,
                width,
                height,
            } => {
                let (width, height) = canvas.draw_image(page_index, data, x, y, *width, *height)?;
                Ok(Rect::new(x, y, width, height))
            }
            Graphic::Name(name) => {
                let font = self.config.name_font();
                let size = size_for(name);
                canvas.draw_text(page_index, name, x, y, font, size)?;
                Ok(Rect::new(
                    x,
                    y,
                    font.text_width(name, size),
                    font.ascent(size) - font.descent(size),
                ))
            }
        }
    }
}
