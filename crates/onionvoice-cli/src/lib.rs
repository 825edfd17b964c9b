//! # onionvoice-cli
//!
//! Command-line front end for onionvoice.
//!
//! ## Features
//!
//! - **Provisioning**: `init`, `provision` and `install-server` prepare a
//!   client directory for one onion server
//! - **Inspection**: `fingerprint`, `resolve`, `encode` and `decode` expose
//!   the building blocks on their own
//! - **Key material**: `generate` mints a client certificate without
//!   touching any client file
//! - **Output formats**: pretty text or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
