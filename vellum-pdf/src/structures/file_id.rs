use crate::types::{Array, Object, PdfString};

/// The two-part file identifier carried in the trailer's `/ID` array.
///
/// The first half is fixed when the file is first written; the second
/// half changes on every save, so a pair with differing halves marks an
/// incrementally updated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileId {
    pub initial: [u8; 16],
    pub current: [u8; 16],
}

impl FileId {
    /// A fresh identifier for a first write, both halves equal. The
    /// digest folds in the current time and caller-supplied seed bytes
    /// (typically the output path and a length estimate).
    pub fn generate(seed: &[u8]) -> Self {
        let mut context = md5::Context::new();
        context.consume(chrono::Utc::now().timestamp_micros().to_be_bytes());
        context.consume(seed);

        let digest = context.finalize().0;

        Self {
            initial: digest,
            current: digest,
        }
    }

    pub fn from_parts(initial: [u8; 16], current: [u8; 16]) -> Self {
        Self { initial, current }
    }

    /// The identifier a re-save of this file carries: same first half,
    /// fresh second half.
    pub fn updated(&self, seed: &[u8]) -> Self {
        Self {
            initial: self.initial,
            current: Self::generate(seed).current,
        }
    }

    /// The `/ID` array value: two hexadecimal strings.
    pub fn to_object(self) -> Object {
        Object::from(Array::from([
            Object::from(PdfString::Hexadecimal(self.initial.to_vec())),
            Object::from(PdfString::Hexadecimal(self.current.to_vec())),
        ]))
    }
}
