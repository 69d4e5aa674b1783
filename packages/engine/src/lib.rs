//! Access-entitlement and content-gating engine for stored media artifacts.
//!
//! A user earns a time-limited entitlement either by completing an external
//! unlock action or by accumulating enough referrals. The engine answers, for
//! any (user, access code) pair, whether the artifact may be delivered right
//! now, and processes unlock grants, referral credit, privileged uploads and
//! statistics queries.
//!
//! Message transport, binary blob delivery and UI rendering live outside this
//! crate: a front-end feeds normalized [`models::GateRequest`] values into
//! [`engine::EntitlementEngine::handle`] and renders the returned
//! [`models::Decision`] through its delivery gateway.

pub mod clock;
pub mod codes;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod limiter;
pub mod links;
pub mod models;
pub mod referral;
pub mod state;
pub mod store;
