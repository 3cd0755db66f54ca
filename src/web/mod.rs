//! Local dashboard server for Axum.
//!
//! Serves the login handshake, the gated dashboard page, and a small JSON API
//! the page calls for automation jobs.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fls_dashboard::{Config, FileStore};
//!
//! let config = Config::from_env()?;
//! let storage = Arc::new(FileStore::open(".fls-dashboard/storage.json")?);
//! let app = fls_dashboard::web::router(config, storage);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! | Route | Access |
//! |---|---|
//! | `GET /login`, `GET /login/start`, `/logout` | public |
//! | `GET /` | gated, redirects to `/login` |
//! | `/api/*` | gated, `401` JSON notice |
//! | anything else | `404` page |

mod error;
mod extractor;
mod pages;
mod routes;
mod state;

pub use error::{Notice, WebError};
pub use routes::router;
