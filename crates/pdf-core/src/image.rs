//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Size an image is drawn at, in points
///
/// Both sides given stretch the image to them; one side scales the other
/// to keep the aspect ratio; neither draws one point per pixel.
pub fn display_size(pixels: (u32, u32), width: Option<f64>, height: Option<f64>) -> (f64, f64) {
    let pixel_width = pixels.0.max(1) as f64;
    let pixel_height = pixels.1.max(1) as f64;
    match (width, height) {
        (Some(width), Some(height)) => (width, height),
        (Some(width), None) => (width, width * pixel_height / pixel_width),
        (None, Some(height)) => (height * pixel_width / pixel_height, height),
        (None, None) => (pixel_width, pixel_height),
    }
}

/// Natural size in pixels of a JPEG or PNG, decoding it without embedding
pub fn image_size(data: &[u8]) -> Result<(u32, u32)> {
    let xobject = ImageXObject::from_bytes(data)?;
    Ok((xobject.width, xobject.height))
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }

    // JPEG starts with FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray", "DeviceCMYK")
    pub color_space: &'static str,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" for PNG)
    pub filter: &'static str,
    /// Raw image data (compressed)
    pub data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, if the source had one
    pub soft_mask: Option<Vec<u8>>,
}

/// Get JPEG info including dimensions and color components
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    // Walk the segments until a SOFn marker:
    // marker (2) + length (2) + precision (1) + height (2) + width (2) + components (1)
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            return Ok(JpegInfo {
                width,
                height,
                num_components,
            });
        }

        if i + 4 < data.len() {
            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            if length < 2 {
                break;
            }
            i += 2 + length;
        } else {
            break;
        }
    }

    Err(PdfError::ImageError(
        "Could not parse JPEG info".to_string(),
    ))
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

impl ImageXObject {
    /// Create XObject from image bytes, dispatching on the magic number
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// Create XObject from JPEG data
    ///
    /// JPEG images are embedded directly with the DCTDecode filter.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;

        let color_space = match info.num_components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space,
            bits_per_component: 8,
            filter: "DCTDecode",
            data: data.to_vec(),
            soft_mask: None,
        })
    }

    /// Create XObject from PNG data
    ///
    /// Pixels are decoded and re-encoded with FlateDecode. An alpha channel is
    /// split off into a soft mask so transparent areas leave the page visible.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;

        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (raw_data, alpha, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), None, "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let mut gray = Vec::with_capacity((width * height) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray.push(pixel[0]);
                    alpha.push(pixel[1]);
                }
                (gray, Some(alpha), "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&[pixel[0], pixel[1], pixel[2]]);
                    alpha.push(pixel[3]);
                }
                (rgb, Some(alpha), "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), None, "DeviceRGB"),
        };

        // Fully opaque alpha needs no mask
        let soft_mask = match alpha {
            Some(alpha) if alpha.iter().any(|&a| a != 255) => Some(deflate(&alpha)?),
            _ => None,
        };

        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            filter: "FlateDecode",
            data: deflate(&raw_data)?,
            soft_mask,
        })
    }

    /// Convert to lopdf Stream object
    ///
    /// The `SMask` entry is left for the caller to link once the mask
    /// stream from [`ImageXObject::soft_mask_stream`] has an object id.
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = self.image_dict(self.color_space, self.bits_per_component, self.filter);
        Stream::new(dict, self.data.clone())
    }

    /// Soft mask image stream for the alpha channel, if any
    pub fn soft_mask_stream(&self) -> Option<Stream> {
        let mask = self.soft_mask.as_ref()?;
        let dict = self.image_dict("DeviceGray", 8, "FlateDecode");
        Some(Stream::new(dict, mask.clone()))
    }

    fn image_dict(&self, color_space: &str, bits: u8, filter: &str) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", bits as i64);
        dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
        dict
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
