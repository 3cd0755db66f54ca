#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod handshake;
pub mod pkce;
pub mod session;
pub mod storage;
pub mod types;
#[cfg(feature = "web")]
pub mod web;

// Re-exports for convenient access
pub use client::{BackendClient, RequestBody};
pub use config::Config;
pub use error::Error;
pub use gate::{AccessGate, GateDecision};
pub use handshake::{HandshakeState, LoginFlow};
pub use pkce::{ProofChallenge, generate_code_challenge, generate_code_verifier};
pub use session::SessionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::{AccessCheck, AuthorizationResult, Identity, JobStatus, Session, UserId};
