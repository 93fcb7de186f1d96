//! Query construction for the Dataverse Web API
//!
//! OData options (`$filter`, `$select`) cover simple lookups; FetchXML covers
//! anything that needs a join.

pub mod builder;
pub mod fetchxml;
pub mod filters;

pub use builder::{Query, QueryBuilder};
pub use fetchxml::{
    Condition, ConditionOperator, FetchXml, FilterGroup, FilterKind, LinkEntity, LinkType,
};
pub use filters::{Filter, FilterValue};
