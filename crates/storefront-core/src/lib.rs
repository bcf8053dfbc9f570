//! # Storefront Core
//!
//! Platform-independent library for hybrid product search.
//!
//! This crate provides the ranking engine behind product discovery: lexical
//! scoring of product names, a semantic stage backed by an external vector
//! search service, and weighted reciprocal rank fusion of the two lists.
//! It is an in-process library; HTTP routing, persistence and embedding
//! generation live elsewhere and are reached through the collaborator traits.
//!
//! ## Modules
//!
//! - [`search`] - Hybrid search (query analysis + keyword scoring + semantic stage + RRF fusion)
//! - [`catalog`] - Inventory collaborator trait and in-memory catalog
//! - [`semantic`] - Vector search collaborator trait and a static hit index
//! - [`config`] - Ranking constants and engine configuration
//! - [`error`] - Error types for the external collaborators
//! - [`metrics`] - Search latency metrics with rolling averages

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod search;
pub mod semantic;
