//! Typed payloads for realtime events.
//!
//! Only the realtime envelope is modeled here; the deep per-business
//! schemas (agent rosters, city statuses, HTML table mining) belong to the
//! reporting layer, not the transport.

pub mod breaks;
pub mod lines;

pub use breaks::{
    AuthMessage, BreakLineData, PageData, SimpleBreakLineData, SimplePageData, UserBreaks,
};
pub use lines::{AuthRoles, Incident, IncidentStat, RawIncidents};
