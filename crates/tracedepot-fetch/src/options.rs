use std::time::Duration;

use url::Url;

/// Default attempt budget for one logical download.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default base delay for exponential backoff between attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// How a fetch authenticates against the object store.
///
/// The modes are mutually exclusive by construction. With a federation
/// endpoint configured, the JWT is exchanged for temporary credentials and
/// every request is signed; with a bare token, requests carry a `Bearer`
/// header; otherwise requests are anonymous.
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        token: String,
    },
    Federation(FederationConfig),
}

/// Web-identity federation parameters.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    /// STS-style endpoint the JWT is exchanged at.
    pub endpoint: Url,
    /// The web-identity token to exchange.
    pub jwt: String,
    /// Session name reported to the federation endpoint.
    pub role_session_name: String,
    /// Bucket name, part of the signed resource path.
    pub bucket: String,
}

/// Configuration for one [`ArtifactCache`](crate::ArtifactCache).
///
/// Supplied once at construction and read-only during a fetch; there is no
/// process-wide mutable state behind it.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Re-download and re-verify even when a valid local copy exists.
    pub force: bool,

    /// Attempt budget per download; transient failures are absorbed until
    /// it is spent. Total requests issued for a download never exceed this.
    pub retries: u32,

    /// Base delay for exponential backoff; attempt N waits `base * 2^N`.
    pub retry_backoff: Duration,

    /// Remote base the relative artifact path is appended to. `None` means
    /// the cache is offline-only: present files are trusted, missing files
    /// are a fatal configuration error.
    pub base_url: Option<Url>,

    /// Authentication material for remote requests.
    pub auth: AuthConfig,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            force: false,
            retries: DEFAULT_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            base_url: None,
            auth: AuthConfig::None,
        }
    }
}

impl FetchOptions {
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Absolute address of a relative artifact path.
    pub(crate) fn remote_url(&self, relative_path: &str) -> Option<String> {
        self.base_url.as_ref().map(|base| {
            let mut url = base.as_str().to_string();
            if !url.ends_with('/') {
                url.push('/');
            }
            url.push_str(relative_path);
            url
        })
    }
}
