use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use url::Url;

use crate::paths::path_to_url;
use crate::paths::url_to_path;

/// Well-known resource schemes.
pub mod schemes {
    pub const FILE: &str = "file";
    pub const UNTITLED: &str = "untitled";
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("invalid resource '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },
    #[error("path '{0}' cannot be expressed as a file resource")]
    NotAbsolute(Utf8PathBuf),
}

/// A resource locator: the thing an editor shows.
///
/// Wraps a [`Url`]. Equality is exact; use [`UriIdentity`](crate::UriIdentity)
/// for "same location" comparisons.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource(Url);

impl Resource {
    pub fn parse(input: &str) -> Result<Self, ResourceError> {
        Url::parse(input)
            .map(Self)
            .map_err(|source| ResourceError::Parse {
                input: input.to_string(),
                source,
            })
    }

    #[must_use]
    pub fn from_url(url: Url) -> Self {
        Self(url)
    }

    pub fn file(path: impl AsRef<Utf8Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        path_to_url(path)
            .map(Self)
            .ok_or_else(|| ResourceError::NotAbsolute(path.to_path_buf()))
    }

    /// An `untitled:` resource for a buffer with the given name.
    pub fn untitled(name: &str) -> Result<Self, ResourceError> {
        Self::parse(&format!("{}:{name}", schemes::UNTITLED))
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    #[must_use]
    pub fn authority(&self) -> &str {
        self.0.authority()
    }

    /// The percent-encoded path component.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.path()
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.scheme() == schemes::FILE
    }

    #[must_use]
    pub fn is_untitled(&self) -> bool {
        self.scheme() == schemes::UNTITLED
    }

    #[must_use]
    pub fn to_file_path(&self) -> Option<Utf8PathBuf> {
        url_to_path(&self.0)
    }

    /// Last path segment, percent-decoded.
    #[must_use]
    pub fn basename(&self) -> String {
        let last = self
            .path()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        percent_encoding::percent_decode_str(last)
            .decode_utf8_lossy()
            .into_owned()
    }

    /// A copy of this resource with its path replaced.
    #[must_use]
    pub fn with_path(&self, path: &str) -> Self {
        let mut url = self.0.clone();
        url.set_path(path);
        Self(url)
    }

    /// Append a `/`-separated relative path.
    #[must_use]
    pub fn join(&self, relative: &str) -> Self {
        let base = self.path().trim_end_matches('/');
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            return self.clone();
        }
        self.with_path(&format!("{base}/{relative}"))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource({})", self.0.as_str())
    }
}

impl FromStr for Resource {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Url> for Resource {
    fn from(url: Url) -> Self {
        Self(url)
    }
}
