use snafu::{OptionExt, Snafu};

use crate::types::{Array, Dictionary, IndirectReference, Name, Numeric, PdfString, Stream};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// All fundamental object kinds defined by the PDF 2.0 specification.
///
/// The variant set is closed and exhaustive: every value a PDF file can
/// carry is one of the kinds below, so serialization and equality are
/// dispatched by plain pattern matching.
///
/// # Examples
/// true                       // Boolean
/// 42                         // Numeric (Integer)
/// 3.14                       // Numeric (Real)
/// (Hello World)              // String (Literal)
/// <48656C6C6F>               // String (Hexadecimal)
/// /Type                      // Name
/// null                       // Null
/// [1 2 3]                    // Array
/// << /Key /Value >>          // Dictionary
/// << /Length 10 >> stream ... endstream // Stream
/// 1 0 R                      // Reference
#[derive(Debug, PartialEq, Clone)]
pub enum Object {
    /// `true` or `false` literal
    Boolean(bool),
    /// Integer or real number
    Numeric(Numeric),
    /// Literal `(string)` or hexadecimal `<ffffaa>` string
    String(PdfString),
    /// Name, written with a leading `/`
    Name(Name),
    /// The `null` literal
    Null,
    /// Ordered collection of objects
    Array(Array),
    /// Name-keyed collection of objects
    Dictionary(Dictionary),
    /// Dictionary plus raw byte payload
    Stream(Stream),
    /// Reference to an indirect object defined elsewhere
    Reference(IndirectReference),
}

impl Object {
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Attempts to read the object as an integer of type `T`.
    ///
    /// # Errors
    /// `UnexpectedObjectType` if the object is not an integer;
    /// `TypeConversion` if the value does not fit in `T`.
    pub fn as_integer<T>(&self) -> Result<T>
    where
        T: TryFrom<i64>,
    {
        match self {
            Object::Numeric(Numeric::Integer(data)) => Ok(TryInto::try_into(*data)
                .ok()
                .with_context(|| error::TypeConversion {
                    object: self.clone(),
                })?),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Integer",
                got: self.clone(),
            }
            .into()),
        }
    }

    /// Attempts to read the object as a floating-point number. Integers
    /// widen losslessly.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Object::Numeric(Numeric::Integer(data)) => Ok(*data as f64),
            Object::Numeric(Numeric::Real(data)) => Ok(*data),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Real",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Object::Boolean(data) => Ok(*data),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Boolean",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_name(&self) -> Result<&str> {
        match self {
            Object::Name(name) => Ok(name.as_str()),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Name",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_string(&self) -> Result<&PdfString> {
        match self {
            Object::String(data) => Ok(data),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "String",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Object::Array(data) => Ok(data),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Array",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_dictionary(&self) -> Result<&Dictionary> {
        match self {
            Object::Dictionary(data) => Ok(data),
            Object::Stream(stream) => Ok(&stream.dictionary),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Dictionary",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream> {
        match self {
            Object::Stream(stream) => Ok(stream),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Stream",
                got: self.clone(),
            }
            .into()),
        }
    }

    pub fn as_reference(&self) -> Result<&IndirectReference> {
        match self {
            Object::Reference(id) => Ok(id),
            _ => Err(error::Error::UnexpectedObjectType {
                expected: "Indirect reference",
                got: self.clone(),
            }
            .into()),
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Numeric(Numeric::Integer(value))
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Numeric(Numeric::Real(value))
    }
}

impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Object::Name(value)
    }
}

impl From<PdfString> for Object {
    fn from(value: PdfString) -> Self {
        Object::String(value)
    }
}

impl From<Array> for Object {
    fn from(value: Array) -> Self {
        Object::Array(value)
    }
}

impl From<Dictionary> for Object {
    fn from(value: Dictionary) -> Self {
        Object::Dictionary(value)
    }
}

impl From<Stream> for Object {
    fn from(value: Stream) -> Self {
        Object::Stream(value)
    }
}

impl From<IndirectReference> for Object {
    fn from(value: IndirectReference) -> Self {
        Object::Reference(value)
    }
}

mod error {
    use snafu::Snafu;

    use super::Object;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Unexpected object type. Expected = {expected}. Got = {got:?}"))]
        UnexpectedObjectType { expected: &'static str, got: Object },

        #[snafu(display("Can't convert into Rust type. Object = {object:?}"))]
        TypeConversion { object: Object },
    }
}
