//! flight-search-mcp: MCP server for AI-assisted flight search
//!
//! This library exposes a flight-data provider (Amadeus) to AI assistants
//! through the Model Context Protocol: tools for searching flights, airports,
//! airlines and cheap dates, plus a handful of prompt templates.
//!
//! # Pipeline
//!
//! Every tool call goes through the same steps:
//!
//! 1. **Validation**: arguments are checked and normalised, collecting every
//!    violation; nothing reaches the network on failure
//! 2. **Provider call**: wrapped in exponential-backoff retry for transient
//!    failures
//! 3. **Formatting**: the provider payload is reduced to a compact,
//!    price-sorted summary of at most 10 entries
//!
//! # Modules
//!
//! - [`config`]: Environment configuration loading and validation
//! - [`error`]: Error types
//! - [`validation`]: Collecting argument validator
//! - [`retry`]: Retry policy and backoff
//! - [`provider`]: Provider trait and the Amadeus HTTP client
//! - [`flights`]: Typed requests, formatter and the flight service
//! - [`mcp`]: MCP protocol, tools, prompts and transports

pub mod config;
pub mod error;
pub mod flights;
pub mod mcp;
pub mod provider;
pub mod retry;
pub mod validation;
