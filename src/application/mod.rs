//! Application layer - use cases that coordinate feeds, the catalog and the runtime.
//!
//! Commands call into this layer; it never prints.

mod download;
mod search;

pub use download::{
    DownloadAction, DownloadedPackage, NoPackageFoundError, SelectionPolicy, artifact_file_name,
    download_url, select_for_download,
};
pub use search::{DEFAULT_CONCURRENCY, SearchAction};
