//! Text and path rendering utilities

use crate::document::Color;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "SF1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Calculate X offset for text alignment inside a container
///
/// # Arguments
/// * `text_width` - Width of text in points
/// * `container_width` - Available width for alignment
/// * `align` - Desired alignment
pub fn calculate_x_offset(text_width: f64, container_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => (container_width - text_width) / 2.0,
        Align::Right => container_width - text_width,
    }
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) to render text
/// with its anchor at `x`.
///
/// # Arguments
/// * `text_hex` - Hex-encoded WinAnsi text (e.g., "<48656C6C6F>")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Baseline in points (PDF coordinates, from bottom)
/// * `align` - Which end of the text `x` refers to
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let mut ops = String::new();

    // `x` is the anchor, i.e. a zero-width container
    let final_x = x + calculate_x_offset(ctx.text_width, 0.0, align);

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Generate operators for a straight stroked line (underline, strikeout)
pub fn generate_line_operators(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    line_width: f64,
    color: Color,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{line_width} w\n{x1} {y1} m\n{x2} {y2} l\nS\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

/// Generate operators for a rectangle outline
///
/// `x`/`y` is the lower-left corner in PDF coordinates.
pub fn generate_rect_stroke_operators(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    line_width: f64,
    color: Color,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{line_width} w\n{x} {y} {width} {height} re\nS\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

/// Generate operators for a filled rectangle
///
/// `x`/`y` is the lower-left corner in PDF coordinates.
pub fn generate_rect_fill_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{x} {y} {width} {height} re\nf\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}
