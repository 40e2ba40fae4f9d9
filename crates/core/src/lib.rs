//! rollcall - resilient contact-list traversal for mobile automation.
//!
//! Walks a sectioned contact list in a mobile app through an automation
//! backend and, per contact, sends messages or removes the contact, while
//! surviving stale element handles and crashed sessions.
//!
//! # Layers
//!
//! ```text
//! Traversal          sections -> contacts -> decide, with a rewinding cursor
//!   DecisionPolicy   classify from chat header, send or remove
//!   SectionEnumerator
//! ResilientQuery     stale / transient retries, one repair per call
//!   SessionGuardian  owns the live session, replaces it on backend failure
//! Backend            rollcall-runtime
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rollcall::{EngineConfig, Traversal};
//! use rollcall_runtime::{AppiumSessionFactory, WebDriverClient};
//!
//! let factory = AppiumSessionFactory::new(WebDriverClient::new("http://127.0.0.1:4723/")?, Default::default());
//! let mut traversal = Traversal::connect(Arc::new(factory), EngineConfig::default()).await?;
//! traversal.bootstrap().await?;
//! let report = traversal.run().await;
//! traversal.close().await?;
//! ```

pub mod anchor;
pub mod config;
pub mod decision;
pub mod enumerator;
pub mod error;
pub mod guardian;
pub mod locators;
pub mod navigation;
pub mod policy;
pub mod query;
pub mod removal;
pub mod scroll;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timings;
pub mod traversal;

pub use anchor::{Anchor, ElementPath};
pub use config::EngineConfig;
pub use decision::DecisionPolicy;
pub use enumerator::SectionEnumerator;
pub use error::{Error, Result};
pub use guardian::SessionGuardian;
pub use locators::Locators;
pub use policy::{Classification, ConnectionHeuristic, HeaderSignals, Outcome, PolicyConfig};
pub use query::ResilientQuery;
pub use removal::RemovalPath;
pub use scroll::SafeBand;
pub use timings::Timings;
pub use traversal::{ContactRecord, Cursor, Phase, RunReport, Traversal};
