//! Failures reported by the device's collaborators (network, clock sync,
//! rendering resources). None of these are fatal: the scheduler converts each
//! one into a degraded screen or a default value and tries again next tick.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a usable response
    #[error("Error fetching `{url}`: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },
    /// We got a response, but it isn't the structure we expected
    #[error("Error decoding {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: BoxError,
    },
    /// A local resource (e.g. a bitmap file) couldn't be loaded
    #[error("Error loading resource `{path}`: {source}")]
    ResourceLoad {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl FetchError {
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn decode(
        what: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Decode {
            what: what.into(),
            source: source.into(),
        }
    }

    pub fn resource_load(
        path: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ResourceLoad {
            path: path.into(),
            source: source.into(),
        }
    }
}
