use thiserror::Error;
use url::Url;

/// Absolute `http(s)` URL of the remote reading service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiBaseUrl(Url);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BaseUrlError {
    #[error("invalid base URL: {0}")]
    Invalid(String),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl ApiBaseUrl {
    /// Parse and validate a base URL.
    ///
    /// # Errors
    ///
    /// Returns `BaseUrlError` if the value does not parse or is not `http`/`https`.
    pub fn parse(raw: &str) -> Result<Self, BaseUrlError> {
        let url = Url::parse(raw.trim()).map_err(|_| BaseUrlError::Invalid(raw.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(BaseUrlError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Join a relative path onto the base, tolerating a missing trailing slash.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let base = ApiBaseUrl::parse("https://readwise.io/").unwrap();
        assert_eq!(base.endpoint("/api/v3/list/"), "https://readwise.io/api/v3/list/");
        let base = ApiBaseUrl::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(base.endpoint("api/v3/list/"), "http://127.0.0.1:8080/api/v3/list/");
    }

    #[test]
    fn rejects_garbage_and_other_schemes() {
        assert!(matches!(
            ApiBaseUrl::parse("not a url"),
            Err(BaseUrlError::Invalid(_))
        ));
        assert_eq!(
            ApiBaseUrl::parse("ftp://example.com"),
            Err(BaseUrlError::UnsupportedScheme("ftp".into()))
        );
    }
}
