//! Data access for clients and their phone numbers stored in PostgreSQL.
//!
//! ```no_run
//! # async fn run() -> client_db::RepoResult<()> {
//! use client_db::ClientRepository;
//!
//! let mut repo = ClientRepository::connect("clients", "postgres", "secret", "localhost").await?;
//! repo.initialize_schema().await?;
//!
//! let added = repo
//!     .add_client("Vasily", "Sidorov", Some("v.sidorov@mail.com"), ["+1-111-111-1111"])
//!     .await?;
//! let found = repo.find_client("phone", "+1-111-111-1111").await?;
//! assert_eq!(found[0].client_id, added.client_id);
//!
//! repo.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use db::{ClientRepository, SearchField};
pub use error::{RepoResult, RepositoryError};
pub use models::{Client, ClientSummary, NewClient, Phone, PhoneOutcome};
