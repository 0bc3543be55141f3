//! PDF Document wrapper

use crate::font::{encode_text_hex, FontFamily, FontStyle, StandardFont};
use crate::geometry::{PageSize, Rect};
use crate::image::{display_size, generate_image_operators, ImageXObject};
use crate::redact::Redaction;
use crate::text::{
    calculate_x_offset, generate_line_operators, generate_rect_fill_operators,
    generate_rect_stroke_operators, generate_text_operators, TextRenderContext,
};
use crate::{Align, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF Document wrapper providing high-level operations
///
/// Pages are addressed by 1-indexed page numbers. All coordinates are in
/// points with the origin at the top-left corner of the page.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Current font (family and style)
    current_font: StandardFont,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Font dictionaries added to the document (base font -> object ID)
    embedded_fonts: HashMap<&'static str, ObjectId>,
    /// Page font resources (page number -> base font -> resource name)
    page_font_resources: HashMap<usize, HashMap<&'static str, String>>,
    /// Embedded images (data hash -> object ID, width, height)
    embedded_images: HashMap<u64, (ObjectId, u32, u32)>,
    /// Page image resources (page number -> object ID -> resource name)
    page_image_resources: HashMap<usize, HashMap<ObjectId, String>>,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
    /// Pages whose original content has been wrapped in q/Q
    isolated_pages: HashSet<usize>,
    /// Redactions waiting for `commit_redactions`
    pub(crate) pending_redactions: Vec<(usize, Redaction)>,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("contract.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::open_from_bytes(&data)
    }

    /// Open a PDF document from bytes
    ///
    /// Encrypted documents are decrypted with the empty user password, so
    /// owner-password-only files open. Anything that needs a user password
    /// is rejected with [`PdfError::PasswordProtected`].
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let mut inner =
            Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        if inner.trailer.get(b"Encrypt").is_ok() {
            inner.decrypt("").map_err(|e| {
                log::debug!("empty user password rejected: {e}");
                PdfError::PasswordProtected
            })?;
        }

        log::debug!("opened document with {} pages", inner.get_pages().len());

        Ok(Self {
            inner,
            current_font: StandardFont::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            page_content_buffer: HashMap::new(),
            isolated_pages: HashSet::new(),
            pending_redactions: Vec::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Object ID of a page (1-indexed)
    pub(crate) fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        if page == 0 {
            return Err(PdfError::InvalidPage(page, pages.len()));
        }
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get page size in points
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let [llx, lly, urx, ury] = self.page_box(page)?;
        Ok(PageSize::new(urx - llx, ury - lly))
    }

    /// Sizes of all pages in page order
    pub fn page_sizes(&self) -> Result<Vec<PageSize>> {
        (1..=self.page_count()).map(|page| self.page_size(page)).collect()
    }

    /// Normalized page box `[llx, lly, urx, ury]` in PDF user space
    pub(crate) fn page_box(&self, page: usize) -> Result<[f64; 4]> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;

        if media_box.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let mut values = [0.0; 4];
        for (slot, obj) in values.iter_mut().zip(&media_box) {
            *slot = number(obj)
                .ok_or_else(|| PdfError::ParseError("Invalid MediaBox entry".to_string()))?;
        }

        Ok([
            values[0].min(values[2]),
            values[1].min(values[3]),
            values[0].max(values[2]),
            values[1].max(values[3]),
        ])
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                return match self.resolve(media_box)? {
                    Object::Array(arr) => Ok(arr.clone()),
                    _ => Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                current_id = *parent_id;
                continue;
            }

            break;
        }

        // Fallback: assume A4 page size
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PageSize::A4.width as f32),
            Object::Real(PageSize::A4.height as f32),
        ])
    }

    /// Follow a reference to its object
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Effective Resources dictionary of a page (inherited and dereferenced)
    pub(crate) fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(self
                    .resolve(resources)?
                    .as_dict()
                    .map(|d| d.clone())
                    .unwrap_or_default());
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// Set the current font family and size
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font(FontFamily::Times, 12.0);
    /// doc.set_font_style(FontStyle::BOLD | FontStyle::UNDERLINE);
    /// ```
    pub fn set_font(&mut self, family: FontFamily, size: f32) {
        self.current_font.family = family;
        self.current_font_size = size;
    }

    /// Set the font style flags (keeps current family/size)
    pub fn set_font_style(&mut self, style: FontStyle) {
        self.current_font.style = style;
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    pub fn current_font(&self) -> StandardFont {
        self.current_font
    }

    pub fn current_font_size(&self) -> f32 {
        self.current_font_size
    }

    /// Width of `text` in points in the current font
    pub fn get_text_width(&self, text: &str) -> f64 {
        self.current_font.text_width(text, self.current_font_size)
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points; which end of the text depends on `align`
    /// * `y` - Top of the text box in points (from top of page)
    /// * `align` - Text alignment
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let (font, size, color) = (
            self.current_font,
            self.current_font_size,
            self.current_text_color,
        );
        self.draw_text(text, page, x, y, align, font, size, color)
    }

    /// Draw text with an explicit font, size and color
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn draw_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
        font: StandardFont,
        size: f32,
        color: Color,
    ) -> Result<()> {
        let [llx, _, _, ury] = self.page_box(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let font_resource_name = self.get_or_create_font_ref(font, page)?;
        let text_width = font.text_width(text, size);

        // Baseline sits one ascent below the top of the text box
        let pdf_x = llx + x;
        let pdf_y = ury - (y + font.ascent(size));

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size: size,
            text_width,
            color,
        };
        let operators = generate_text_operators(&encode_text_hex(text), pdf_x, pdf_y, align, &ctx);
        self.buffer_content(page, &operators);

        let start_x = pdf_x + calculate_x_offset(text_width, 0.0, align);
        let thickness = (size * 0.05) as f64;
        let size = size as f64;
        if font.style.contains(FontStyle::UNDERLINE) {
            let line_y = pdf_y - size * 0.1;
            let ops = generate_line_operators(
                start_x,
                line_y,
                start_x + text_width,
                line_y,
                thickness,
                color,
            );
            self.buffer_content(page, &ops);
        }
        if font.style.contains(FontStyle::STRIKEOUT) {
            let line_y = pdf_y + size * 0.25;
            let ops = generate_line_operators(
                start_x,
                line_y,
                start_x + text_width,
                line_y,
                thickness,
                color,
            );
            self.buffer_content(page, &ops);
        }

        Ok(())
    }

    /// Insert an image with its top-left corner at (x, y)
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the image top in points (from top)
    /// * `width`, `height` - Drawn size in points; a missing side keeps the
    ///   aspect ratio, both missing draws one point per pixel
    ///
    /// Returns the drawn (width, height) in points.
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<(f64, f64)> {
        let [llx, _, _, ury] = self.page_box(page)?;

        let (image_resource_name, pixel_width, pixel_height) =
            self.get_or_create_image_ref(data, page)?;
        let (width, height) = display_size((pixel_width, pixel_height), width, height);

        let operators = generate_image_operators(
            &image_resource_name,
            llx + x,
            ury - y - height,
            width,
            height,
        );
        self.buffer_content(page, &operators);

        Ok((width, height))
    }

    /// Draw a rectangle outline
    pub fn draw_rectangle(
        &mut self,
        page: usize,
        rect: Rect,
        line_width: f64,
        color: Color,
    ) -> Result<()> {
        let [llx, _, _, ury] = self.page_box(page)?;
        let operators = generate_rect_stroke_operators(
            llx + rect.x,
            ury - rect.bottom(),
            rect.width,
            rect.height,
            line_width,
            color,
        );
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Paint a filled rectangle
    pub fn fill_rectangle(&mut self, page: usize, rect: Rect, color: Color) -> Result<()> {
        let [llx, _, _, ury] = self.page_box(page)?;
        let operators = generate_rect_fill_operators(
            llx + rect.x,
            ury - rect.bottom(),
            rect.width,
            rect.height,
            color,
        );
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.prepare_for_save()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.prepare_for_save()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn prepare_for_save(&mut self) -> Result<()> {
        if !self.pending_redactions.is_empty() {
            log::warn!(
                "saving with {} uncommitted redactions; they are not applied",
                self.pending_redactions.len()
            );
        }
        self.flush_content_buffers()
    }

    /// Get or create a font reference for a specific page
    ///
    /// Returns the resource name (e.g., "SF1") for use in content streams.
    /// Names already used by the page are never reused.
    fn get_or_create_font_ref(&mut self, font: StandardFont, page: usize) -> Result<String> {
        let base_font = font.base_font();

        if let Some(resource_name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(base_font))
        {
            return Ok(resource_name.clone());
        }

        let font_id = match self.embedded_fonts.get(base_font) {
            Some(id) => *id,
            None => {
                let id = self.inner.add_object(font.to_pdf_dictionary());
                self.embedded_fonts.insert(base_font, id);
                id
            }
        };

        let resource_name = self.unused_resource_name(page, b"Font", "SF")?;
        self.add_to_page_resources(page, b"Font", &resource_name, font_id)?;

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(base_font, resource_name.clone());

        Ok(resource_name)
    }

    /// Image XObject for `data`, deduplicated by a hash of the bytes
    fn embed_image_object(&mut self, data: &[u8]) -> Result<(ObjectId, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(entry) = self.embedded_images.get(&data_hash) {
            return Ok(*entry);
        }

        let xobject = ImageXObject::from_bytes(data)
            .map_err(|e| PdfError::ImageError(format!("Failed to create image XObject: {e}")))?;

        let mut stream = xobject.to_pdf_stream();
        if let Some(mask) = xobject.soft_mask_stream() {
            let mask_id = self.inner.add_object(mask);
            stream.dict.set("SMask", Object::Reference(mask_id));
        }
        let object_id = self.inner.add_object(stream);

        let entry = (object_id, xobject.width, xobject.height);
        self.embedded_images.insert(data_hash, entry);
        Ok(entry)
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1") and original dimensions.
    /// Images are deduplicated by hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let (object_id, width, height) = self.embed_image_object(data)?;

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|images| images.get(&object_id))
        {
            return Ok((name.clone(), width, height));
        }

        let resource_name = self.unused_resource_name(page, b"XObject", "Im")?;
        self.add_to_page_resources(page, b"XObject", &resource_name, object_id)?;

        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(object_id, resource_name.clone());

        Ok((resource_name, width, height))
    }

    /// First `{prefix}{n}` not present in the page's resource category
    fn unused_resource_name(&self, page: usize, category: &[u8], prefix: &str) -> Result<String> {
        let resources = self.page_resources(self.page_id(page)?)?;
        let existing = match resources.get(category) {
            Ok(obj) => self.resolve(obj)?.as_dict().map(|d| d.clone()).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        let mut n = 1;
        loop {
            let name = format!("{prefix}{n}");
            if !existing.has(name.as_bytes()) {
                return Ok(name);
            }
            n += 1;
        }
    }

    /// Add an entry to one category (Font, XObject) of a page's Resources
    fn add_to_page_resources(
        &mut self,
        page: usize,
        category: &[u8],
        resource_name: &str,
        object_id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.page_resources(page_id)?;

        let mut entries = match resources.get(category) {
            Ok(obj) => self.resolve(obj)?.as_dict().map(|d| d.clone()).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };
        entries.set(resource_name.as_bytes(), Object::Reference(object_id));
        resources.set(category, Object::Dictionary(entries));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set(b"Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let mut pages: Vec<usize> = self.page_content_buffer.keys().copied().collect();
        pages.sort_unstable();

        for page in pages {
            self.flush_page(page)?;
        }

        Ok(())
    }

    /// Write one page's buffered operators into its content stream
    pub(crate) fn flush_page(&mut self, page: usize) -> Result<()> {
        match self.page_content_buffer.remove(&page) {
            Some(content) if !content.is_empty() => self.append_to_content_stream(page, &content),
            _ => Ok(()),
        }
    }

    /// Decompressed, concatenated content of a page
    pub(crate) fn page_content(&self, page: usize) -> Result<Vec<u8>> {
        let page_id = self.page_id(page)?;
        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => self.resolve(contents)?,
            Err(_) => return Ok(Vec::new()),
        };

        let streams: Vec<&Object> = match contents {
            Object::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };

        let mut combined = Vec::new();
        for obj in streams {
            if let Object::Stream(stream) = self.resolve(obj)? {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                combined.extend_from_slice(&data);
                combined.push(b'\n');
            }
        }

        Ok(combined)
    }

    /// Replace a page's content with a single new stream
    pub(crate) fn replace_page_content(&mut self, page: usize, content: Vec<u8>) -> Result<()> {
        let page_id = self.page_id(page)?;
        let stream_id = self.inner.add_object(Stream::new(Dictionary::new(), content));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// The first append wraps the existing content in `q`/`Q` so its
    /// graphics state cannot leak into the appended operators.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let existing = self.page_content(page)?;

        let mut new_content = Vec::with_capacity(existing.len() + content.len() + 8);
        if self.isolated_pages.insert(page) && !existing.is_empty() {
            new_content.extend_from_slice(b"q\n");
            new_content.extend_from_slice(&existing);
            new_content.extend_from_slice(b"Q\n");
        } else {
            new_content.extend_from_slice(&existing);
        }
        new_content.extend_from_slice(content);

        self.replace_page_content(page, new_content)
    }

    /// Add a blank page of the given size to the end of the document
    ///
    /// # Returns
    /// New page number (1-indexed)
    ///
    /// # Example
    /// ```ignore
    /// let mut doc = PdfDocument::open("single-page.pdf")?;
    /// let new_page = doc.add_page(PageSize::LETTER)?;
    /// assert_eq!(new_page, 2);
    /// ```
    pub fn add_page(&mut self, size: PageSize) -> Result<usize> {
        let page_count = self.page_count();

        let root = self
            .inner
            .trailer
            .get(b"Root")
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?
            .as_reference()
            .map_err(|_| PdfError::ParseError("Root is not a reference".to_string()))?;
        let pages_id = self
            .inner
            .get_object(root)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))?
            .get(b"Pages")
            .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))?
            .as_reference()
            .map_err(|_| PdfError::ParseError("Pages is not a reference".to_string()))?;

        let contents_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), Vec::new()));

        let mut page_dict = Dictionary::new();
        page_dict.set(b"Type", Object::Name(b"Page".to_vec()));
        page_dict.set(b"Parent", Object::Reference(pages_id));
        page_dict.set(
            b"MediaBox",
            Object::Array(vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(size.width as f32),
                Object::Real(size.height as f32),
            ]),
        );
        page_dict.set(b"Resources", Object::Dictionary(Dictionary::new()));
        page_dict.set(b"Contents", Object::Reference(contents_id));
        let new_page_id = self.inner.add_object(page_dict);

        let mut pages_dict = self
            .inner
            .get_object(pages_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?
            .clone();

        let mut kids = pages_dict
            .get(b"Kids")
            .and_then(Object::as_array)
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids.push(Object::Reference(new_page_id));

        let count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;

        pages_dict.set(b"Kids", Object::Array(kids));
        pages_dict.set(b"Count", Object::Integer(count + 1));
        self.inner.objects.insert(pages_id, pages_dict.into());

        log::debug!("appended page {} ({}x{})", page_count + 1, size.width, size.height);

        Ok(page_count + 1)
    }
}

/// Numeric value of an Integer or Real object
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
