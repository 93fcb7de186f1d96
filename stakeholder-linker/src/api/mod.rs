//! Dynamics 365 Web API access
//!
//! Read access goes through the [`WebApi`] trait so the services can be driven
//! by an in-memory store in tests; [`DynamicsClient`] is the real thing.

pub mod auth;
pub mod client;
pub mod pluralization;
pub mod query;
pub mod workflow;

pub use auth::{AuthManager, TokenSource};
pub use client::{DynamicsClient, WebApi};
pub use query::{FetchXml, Filter, FilterValue, Query, QueryBuilder};
pub use workflow::{HttpWorkflowInvoker, WorkflowInvoker};
