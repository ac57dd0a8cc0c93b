/// Numeric values as defined by the PDF 2.0 specification.
///
/// PDF distinguishes integer and real numbers. Integers are stored as
/// 64-bit signed values, which also covers the "long" range some
/// producers rely on; reals are IEEE double-precision.
///
/// # Examples
/// 42              // Integer
/// -17             // Negative integer
/// 3.14            // Real number
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Numeric {
    /// A whole number. ISO 32000 only guarantees the 32-bit range, but
    /// i64 keeps byte offsets and stream lengths representable.
    Integer(i64),
    /// A real number. Serialized in fixed-point form with at most five
    /// fractional digits.
    Real(f64),
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Real(value)
    }
}
