use crate::structures::FileId;
use crate::types::{Dictionary, IndirectReference, Object};

/// The end-of-file dictionary locating the document's entry points.
///
/// `prev` points at the previous cross-reference section when the file
/// is an incremental update chain.
#[derive(Debug, Default, Clone)]
pub struct Trailer {
    pub size: i64,
    pub root: IndirectReference,
    pub info: Option<IndirectReference>,
    pub encrypt: Option<IndirectReference>,
    pub file_id: Option<FileId>,
    pub prev: Option<u64>,
}

impl Trailer {
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dictionary = Dictionary::from([
            ("Size", Object::from(self.size)),
            ("Root", Object::from(self.root)),
        ]);

        if let Some(info) = self.info {
            dictionary.set("Info", Object::from(info));
        }
        if let Some(encrypt) = self.encrypt {
            dictionary.set("Encrypt", Object::from(encrypt));
        }
        if let Some(file_id) = self.file_id {
            dictionary.set("ID", file_id.to_object());
        }
        if let Some(prev) = self.prev {
            dictionary.set("Prev", Object::from(prev as i64));
        }

        dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_entries_appear_only_when_set() {
        let trailer = Trailer {
            size: 12,
            root: IndirectReference::new(3, 0),
            ..Trailer::default()
        };
        let dictionary = trailer.to_dictionary();

        assert_eq!(dictionary.get("Size"), Some(&Object::from(12i64)));
        assert_eq!(
            dictionary.get("Root"),
            Some(&Object::from(IndirectReference::new(3, 0)))
        );
        assert!(dictionary.get("Info").is_none());
        assert!(dictionary.get("Prev").is_none());

        let trailer = Trailer {
            info: Some(IndirectReference::new(4, 0)),
            prev: Some(1024),
            ..trailer
        };
        let dictionary = trailer.to_dictionary();

        assert_eq!(
            dictionary.get("Info"),
            Some(&Object::from(IndirectReference::new(4, 0)))
        );
        assert_eq!(dictionary.get("Prev"), Some(&Object::from(1024i64)));
    }
}
