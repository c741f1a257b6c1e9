pub mod album;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod record;
pub mod search;
pub mod service;
pub mod store;
pub mod track;
pub mod utils;

#[cfg(test)]
mod testing;

pub use album::{Album, AlbumData, AlbumForm};
pub use app::{App, AppError};
pub use error::{ServiceError, TransportError};
pub use form::ValidationError;
pub use http::{ApiClient, LogObserver, NoopObserver, RequestObserver, Transport, UreqTransport};
pub use record::{Id, Resource, Stored};
pub use service::{AlbumService, ResourceService, TrackService};
pub use store::{AlbumCollection, Collection, CollectionState, TrackCollection};
pub use track::{Track, TrackData, TrackForm};
