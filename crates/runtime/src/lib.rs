//! rollcall runtime - the automation backend.
//!
//! This crate owns everything that talks to the automation server:
//!
//! - **Backend contract**: [`Backend`] (one live session) and [`SessionFactory`]
//! - **Errors**: a typed taxonomy with [`FailureKind`] for dispatch
//! - **Transport**: [`WebDriverClient`], W3C WebDriver commands over HTTP
//! - **Appium**: [`AppiumSession`] / [`AppiumSessionFactory`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   rollcall   │  Guardian, query layer, traversal
//! └──────┬───────┘
//!        │ Backend / SessionFactory
//! ┌──────▼───────┐
//! │   runtime    │  This crate
//! │  ┌────────┐  │
//! │  │ Appium │  │  Session commands
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │  HTTP  │  │  Envelope + error mapping
//! │  └────────┘  │
//! └──────────────┘
//! ```

pub mod appium;
pub mod backend;
pub mod error;
pub mod http;

pub use appium::{AppiumSession, AppiumSessionFactory};
pub use backend::{Backend, BoxFuture, SessionFactory};
pub use error::{Error, FailureKind, Result};
pub use http::{DEFAULT_ENDPOINT, WebDriverClient};
