use crate::types::{Array, Object};

/// A rectangle, written as a four-number array `[x1 y1 x2 y2]` with
/// `(x1, y1)` the lower-left and `(x2, y2)` the upper-right corner.
///
/// Construction normalizes the corners, so `left <= right` and
/// `bottom <= top` hold regardless of input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl Rectangle {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            left: x1.min(x2),
            bottom: y1.min(y2),
            right: x1.max(x2),
            top: y1.max(y2),
        }
    }

    /// A page-sized rectangle anchored at the origin.
    pub fn with_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// The array form the file carries.
    pub fn to_array(self) -> Array {
        Array::from([
            Object::from(self.left),
            Object::from(self.bottom),
            Object::from(self.right),
            Object::from(self.top),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let rectangle = Rectangle::new(100.0, 80.0, 10.0, 20.0);

        assert_eq!(rectangle.left(), 10.0);
        assert_eq!(rectangle.bottom(), 20.0);
        assert_eq!(rectangle.right(), 100.0);
        assert_eq!(rectangle.top(), 80.0);
        assert_eq!(rectangle.width(), 90.0);
        assert_eq!(rectangle.height(), 60.0);
    }

    #[test]
    fn array_round_trip() {
        let rectangle = Rectangle::with_size(612.0, 792.0);
        let array = rectangle.to_array();

        assert_eq!(array.len(), 4);
        assert_eq!(array.rectangle().unwrap(), rectangle);
    }
}
