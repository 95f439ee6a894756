//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → span.rs (`request` span, enriched with method/url/request id)
//!     → access log event inside that span
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
pub mod span;
