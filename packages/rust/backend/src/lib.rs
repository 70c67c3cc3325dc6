//! Pluggable fetch backends: the `FetchBackend` trait (C5), a registry of
//! named backends with match criteria (C3), and a scorer that picks the
//! best backend for a given URL/content-type pair (C4).

pub mod backend;
pub mod criteria;
pub mod registry;
pub mod selector;

pub mod backends {
    pub mod archive;
    pub mod file;
    pub mod http;

    #[cfg(feature = "headless")]
    pub mod headless;
}

pub use backend::{BackendCapabilities, FetchBackend, FetchConfig, FetchRequest, FetchResponse};
pub use backends::archive::ArchiveBackend;
pub use backends::file::LocalFileBackend;
pub use backends::http::HttpBackend;
#[cfg(feature = "headless")]
pub use backends::headless::HeadlessBackend;
pub use criteria::{BackendCriteria, ContentTypePattern, UrlPattern};
pub use registry::BackendRegistry;
pub use selector::BackendSelector;
