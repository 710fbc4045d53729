use reqwest::RequestBuilder;
use std::fmt;

/// Bearer credentials attached to admin calls. Tokens are issued elsewhere;
/// this only carries one.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    pub fn from_token(token: Option<String>) -> Self {
        Self { token: token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) }
    }

    pub fn is_anonymous(&self) -> bool { self.token.is_none() }

    /// Header pairs for an authenticated call; empty when no token is configured.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match &self.token {
            Some(t) => vec![("Authorization", format!("Bearer {t}"))],
            None => Vec::new(),
        }
    }

    pub(crate) fn apply(&self, mut rb: RequestBuilder) -> RequestBuilder {
        for (name, value) in self.headers() { rb = rb.header(name, value); }
        if self.is_anonymous() { tracing::debug!("admin call without credentials"); }
        rb
    }
}

// Never print the token itself.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &self.token.as_ref().map(|_| "<redacted>")).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_when_token_present() {
        let c = Credentials::from_token(Some(" tok123 ".into()));
        assert_eq!(c.headers(), vec![("Authorization", "Bearer tok123".to_string())]);
        assert!(!format!("{c:?}").contains("tok123"));
    }

    #[test]
    fn blank_token_is_anonymous() {
        assert!(Credentials::from_token(Some("   ".into())).is_anonymous());
        assert!(Credentials::from_token(None).headers().is_empty());
    }

    #[test]
    fn apply_sets_authorization() {
        let c = Credentials::from_token(Some("t".into()));
        let req = c.apply(reqwest::Client::new().get("http://localhost/api/articles")).build().unwrap();
        assert_eq!(req.headers().get("authorization").unwrap(), "Bearer t");
    }
}
