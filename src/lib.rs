//! Piata MCP - tool servers, dispatch gateway and orchestration for the
//! Piata.ro marketplace.
//!
//! Five tool servers (ads, database, stock, content, stealth) expose their
//! catalogs over a JSON-RPC `tools/call` envelope. Large results are offloaded
//! to artifact files, geocoding falls back across providers, and an
//! orchestrator composes calls into listing workflows.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
