/// PKCE code verifier as of [RFC 7636](https://datatracker.ietf.org/doc/html/rfc7636):
/// 32 bytes of cryptographically secure random data, base64 url encoded into a
/// 43 character string.
///
/// The verifier is a per-login-attempt secret. It only ever travels inside an
/// `HttpOnly` cookie and in the final token exchange request body. Its `Debug`
/// representation is redacted so it cannot end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct CodeVerifier {
    code_verifier: String,
}

impl CodeVerifier {
    pub(crate) fn generate() -> Self {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        use rand::Rng;

        let mut rng = rand::rng();
        let bytes: [u8; 32] = rng.random();
        let code_verifier = URL_SAFE_NO_PAD.encode(bytes);

        Self { code_verifier }
    }

    /// Wraps a verifier previously handed to the browser, read back from its cookie.
    pub(crate) fn from_stored(code_verifier: String) -> Self {
        Self { code_verifier }
    }

    pub(crate) fn to_code_challenge(&self) -> CodeChallenge {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        use sha2::Digest;

        let mut hasher = sha2::Sha256::new();
        hasher.update(self.code_verifier.as_bytes());
        let digest = hasher.finalize();

        let code_challenge = URL_SAFE_NO_PAD.encode(digest);

        CodeChallenge {
            code_challenge,
            code_challenge_method: CodeChallengeMethod::S256,
        }
    }

    pub(crate) fn code_verifier(&self) -> &str {
        self.code_verifier.as_str()
    }
}

impl std::fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeVerifier")
            .field("code_verifier", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodeChallengeMethod {
    S256,
}

impl CodeChallengeMethod {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            CodeChallengeMethod::S256 => "S256",
        }
    }
}

/// The value derived from a [`CodeVerifier`] that is safe to expose in the
/// authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeChallenge {
    code_challenge: String,
    code_challenge_method: CodeChallengeMethod,
}

impl CodeChallenge {
    pub(crate) fn code_challenge(&self) -> &str {
        self.code_challenge.as_str()
    }

    pub(crate) fn code_challenge_method(&self) -> CodeChallengeMethod {
        self.code_challenge_method
    }
}
