//! Link Dynamics 365 stakeholders to an opportunity
//!
//! Lists the stakeholders that are not linked to an opportunity yet (via a
//! FetchXML anti-join), lets the user filter and pick from them, and links the
//! picked ones by calling a Power Automate flow whose URL is kept in a
//! Dataverse environment variable.

pub mod api;
pub mod config;
pub mod services;
