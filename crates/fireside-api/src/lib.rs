// fireside-api: Async Rust client for the Firefly III REST API (/api/v1/)

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod models;
pub mod paginate;
pub mod resources;
pub mod transport;

pub use auth::Credentials;
pub use client::{ApiClient, ClientHandle};
pub use envelope::{Envelope, Meta, Pagination, Resource, Single};
pub use error::Error;
pub use paginate::fetch_all_pages;
pub use resources::DateRange;
pub use resources::accounts::AccountFilter;
pub use resources::transactions::TransactionFilter;
pub use transport::{TlsMode, TransportConfig};
