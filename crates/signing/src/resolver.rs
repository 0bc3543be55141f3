//! Stacked coordinate resolution
//!
//! A [`GlobalPoint`] addresses the document as if its pages were stacked
//! top to bottom on one canvas: y = 0 is the top of the first page and y
//! keeps growing through every following page. x is always page-local.

use crate::Result;
use pdf_core::PdfDocument;
use serde::{Deserialize, Serialize};

/// Point in stacked document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalPoint {
    pub x: f64,
    pub y: f64,
}

impl GlobalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Page and in-page offset of a stacked y coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPosition {
    /// 0-based page index
    pub page_index: usize,
    /// Offset from the top of that page; negative for y above the first page
    pub local_y: f64,
}

/// Page heights of a document, in page order
pub trait PageGeometry {
    fn page_heights(&self) -> Result<Vec<f64>>;
}

impl PageGeometry for PdfDocument {
    fn page_heights(&self) -> Result<Vec<f64>> {
        Ok(self.page_sizes()?.into_iter().map(|size| size.height).collect())
    }
}

/// Resolve a stacked y coordinate against a list of page heights
///
/// The first page whose bottom edge is at or below `global_y` wins, so a
/// point exactly on the boundary belongs to the upper page. Returns `None`
/// when `global_y` lies below the last page.
pub fn resolve(page_heights: &[f64], global_y: f64) -> Option<ResolvedPosition> {
    let mut cumulative = 0.0;
    for (page_index, height) in page_heights.iter().enumerate() {
        if global_y <= cumulative + height {
            return Some(ResolvedPosition {
                page_index,
                local_y: global_y - cumulative,
            });
        }
        cumulative += height;
    }
    None
}

/// Resolve a stacked y coordinate against a document's pages
pub fn resolve_in<G>(geometry: &G, global_y: f64) -> Result<Option<ResolvedPosition>>
where
    G: PageGeometry + ?Sized,
{
    Ok(resolve(&geometry.page_heights()?, global_y))
}
