use snafu::{ensure, ResultExt, Snafu};

pub mod rectangle;

use crate::types::Object;

pub use rectangle::Rectangle;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// A PDF array: an ordered collection of objects written between square
/// brackets. Elements may be of any object kind, including nested arrays
/// and dictionaries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Array {
    data: Vec<Object>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: Object) {
        self.data.push(object);
    }

    /// Reads the array as a rectangle.
    ///
    /// # Errors
    /// Anything other than exactly four numeric elements is a format
    /// error.
    pub fn rectangle(&self) -> Result<Rectangle> {
        ensure!(
            self.data.len() == 4,
            error::InvalidRectangleFormat {
                expected: 4usize,
                got: self.data.len()
            }
        );

        let mut coordinates = [0.0f64; 4];
        for (slot, object) in coordinates.iter_mut().zip(self.data.iter()) {
            *slot = object.as_float().context(error::InvalidCoordinate)?;
        }

        Ok(Rectangle::new(
            coordinates[0],
            coordinates[1],
            coordinates[2],
            coordinates[3],
        ))
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Wrong rectangle arity. Expected = {expected}; Got = {got}"))]
        InvalidRectangleFormat { expected: usize, got: usize },

        #[snafu(display("Rectangle coordinate is not numeric"))]
        InvalidCoordinate { source: crate::types::ObjectError },
    }
}

impl std::ops::Deref for Array {
    type Target = Vec<Object>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for Array {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl From<Vec<Object>> for Array {
    fn from(value: Vec<Object>) -> Self {
        Self { data: value }
    }
}

impl<const N: usize> From<[Object; N]> for Array {
    fn from(value: [Object; N]) -> Self {
        Self {
            data: value.to_vec(),
        }
    }
}

impl FromIterator<Object> for Array {
    fn from_iter<I: IntoIterator<Item = Object>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}
