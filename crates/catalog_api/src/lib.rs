//! Client for the external movie metadata API (TMDB v3 contract).
//!
//! The crate covers the consumed side of the API only: typed records with explicitly optional
//! fields, request construction for list/search/discover/detail endpoints, a transport seam with a
//! `reqwest` implementation and a scripted in-memory one, the error taxonomy surfaced to views,
//! and the small pieces of request bookkeeping views need (stale-request gating, page
//! accumulation, isolated parallel section loads).

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod client;
mod config;
mod error;
pub mod freshness;
pub mod images;
mod models;
pub mod paging;
mod request;
pub mod sections;
pub mod transport;

pub use client::{validate_api_key, ApiKeyValidation, CatalogClient};
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use freshness::{RequestGate, RequestTicket};
pub use images::{backdrop_url, poster_url, BackdropSize, PosterSize};
pub use models::{
    genre_names, pick_trailer, Genre, MovieBundle, MovieDetail, MoviePage, MovieSummary, Video,
};
pub use paging::{page_count, paginate, PageAccumulator};
pub use request::{
    CatalogQuery, CatalogRequest, DiscoverFilters, Endpoint, SortKey, QUICK_GENRES,
};
pub use sections::{home_sections, load_sections, SectionResult};
pub use transport::{
    CatalogTransport, MemoryTransport, RecordedRequest, ReqwestTransport, TransportFuture,
    TransportResponse,
};
