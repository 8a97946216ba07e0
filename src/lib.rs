// Client library for the Tripffer hotel booking API

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod media;
pub mod models;
pub mod pages;
pub mod resources;
pub mod routes;
pub mod token_store;
pub mod transport;
pub mod validate;
pub mod widgets;

#[cfg(test)]
mod mock;

// Re-export key types for convenience
pub use cache::{CacheConfig, CacheStatsReport, Invalidation, QueryCache, QueryKey, Resource};
pub use client::{Mutation, Query, TripfferClient};
pub use config::{ClientConfig, RetryConfig};
pub use error::{ApiError, ClientError, ErrorCategory, FieldErrors};
pub use forms::{Form, FormController, FormErrors, FormPhase};
pub use http::ClientStats;
pub use models::{Booking, BookingStatus, FavoriteHotel, Hotel, Review, Role, Room, RoomType, User};
pub use pages::{PageState, View};
pub use routes::{Access, Route, SearchQuery};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
