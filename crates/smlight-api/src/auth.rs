use secrecy::{ExposeSecret, SecretString};

/// HTTP Basic credentials for devices with web-UI authentication enabled.
///
/// SLZB-06x firmware only supports Basic auth; the credentials are sent
/// on every request once configured.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Attach these credentials to a request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}
