//! Agent System
//!
//! A single agent drives each interaction:
//!
//! ```text
//! Upload (name + bytes)
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Extractor  │  → table + text dump, or plain text
//! └─────────────┘
//!      │
//!      ├──────────────────────┐
//!      ▼                      ▼
//! ┌─────────────┐      ┌─────────────┐
//! │   Answer    │      │    Chart    │  → keyword rules over the table
//! │   Service   │      │  Selector   │
//! └─────────────┘      └─────────────┘
//!      │                      │
//!      ▼                      ▼
//!  Answer / error        SVG / warning
//! ```

pub mod analyst;

pub use analyst::{AnswerOutcome, DataAnalystAgent, InteractionReport, Preview};
