//! Page geometry
//!
//! All public coordinates are page-local points with the origin at the
//! top-left corner of the page and y growing downward.

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 (595.28 x 841.89 points)
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    /// US Letter (612 x 792 points)
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Axis-aligned rectangle in top-left page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangles share a region of positive area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when the point lies inside or on the edge
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Centre point
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_union() {
        let a = Rect::new(10.0, 10.0, 20.0, 5.0);
        let b = Rect::new(25.0, 8.0, 10.0, 4.0);
        assert_eq!(a.union(&b), Rect::new(10.0, 8.0, 25.0, 7.0));
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges do not overlap
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(0.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_contains_point() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains_point(10.0, 10.0));
        assert!(!a.contains_point(10.1, 5.0));
    }

    #[test]
    fn test_page_size_default_is_a4() {
        assert_eq!(PageSize::default(), PageSize::A4);
    }
}
