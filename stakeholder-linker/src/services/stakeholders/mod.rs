// Stakeholder linking service
//
// Finds the stakeholders not yet linked to an opportunity, filters and
// sorts them for display, tracks the user's selection and links the
// selection through the association workflow.

pub mod association;
pub mod controller;
pub mod filter;
pub mod gateway;
pub mod models;
pub mod query;
pub mod selection;

#[cfg(test)]
pub(crate) mod testing;

pub use association::{AssociationOrchestrator, AssociationOutcome, AssociationStage};
pub use controller::{LinkController, LoadTicket, ViewState};
pub use filter::filter_and_sort;
pub use gateway::{ReadOutcome, RecordGateway};
pub use models::{AssociationRequest, Stakeholder};
pub use query::build_unlinked_stakeholder_query;
pub use selection::SelectionTracker;
