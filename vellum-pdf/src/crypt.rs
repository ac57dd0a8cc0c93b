/// Seam for document encryption.
///
/// Key derivation (RC4/AES key schedules, password hashing) lives in an
/// external component; the writer only needs the ability to transform
/// the raw bytes of strings and stream payloads under the key of the
/// indirect object currently being emitted.
pub trait ObjectCrypt {
    /// Transforms `data` under the key derived for `(id, gen_id)`. The
    /// output length may differ from the input length.
    fn transform(&self, id: i64, gen_id: u16, data: &[u8]) -> Vec<u8>;
}

/// An [`ObjectCrypt`] bound to one indirect object's identity for the
/// duration of its emission.
#[derive(Clone, Copy)]
pub struct CryptBinding<'a> {
    pub crypt: &'a dyn ObjectCrypt,
    pub id: i64,
    pub gen_id: u16,
}

impl CryptBinding<'_> {
    pub fn transform(&self, data: &[u8]) -> Vec<u8> {
        self.crypt.transform(self.id, self.gen_id, data)
    }
}
