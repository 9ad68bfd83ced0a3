/// Cryptographically secure token used to correlate a login callback with the
/// attempt that started it, preventing CSRF'd callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CsrfToken {
    csrf_token: String,
}

impl CsrfToken {
    /// Generate a new cryptographically secure CSRF token, using 32 bytes of cryptographically
    /// secure random data, base64 url encoded as a 43 character string.
    pub(crate) fn new() -> Self {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        use rand::Rng;

        let mut rng = rand::rng();
        let bytes: [u8; 32] = rng.random();
        let csrf_token = URL_SAFE_NO_PAD.encode(bytes);

        Self { csrf_token }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.csrf_token
    }
}

impl Default for CsrfToken {
    fn default() -> Self {
        Self::new()
    }
}
