use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("address could not be resolved: {address}")]
    AddressUnresolved { address: String },

    #[error("service unavailable at {url}: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl Error {
    pub fn unavailable<U: Into<String>, R: ToString>(url: U, reason: R) -> Self {
        Self::UpstreamUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed<U: Into<String>, R: ToString>(url: U, reason: R) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_pick_the_right_kind() {
        let err = Error::unavailable("https://api.weather.gov/points/1,2", "HTTP 503");
        assert!(matches!(err, Error::UpstreamUnavailable { .. }));
        assert_eq!(
            err.to_string(),
            "service unavailable at https://api.weather.gov/points/1,2: HTTP 503"
        );

        let err = Error::malformed("u", "missing `properties.forecast`");
        assert!(matches!(err, Error::MalformedResponse { .. }));
        assert!(err.to_string().contains("properties.forecast"));
    }
}
