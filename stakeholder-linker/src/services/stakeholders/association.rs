//! Linking selected stakeholders to the parent through the workflow
//!
//! The flow URL lives in a Dataverse environment variable and is resolved on
//! every attempt. The workflow is trusted: a 2xx answer counts as success even
//! though nothing here can confirm the links were created.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::gateway::RecordGateway;
use super::models::{AssociationRequest, Stakeholder};
use crate::api::WorkflowInvoker;
use crate::config::WorkflowConfig;

/// Where an association attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationStage {
    /// Resolving the workflow URL from the environment variable
    ConfigResolution,
    /// Calling the workflow itself
    WorkflowCall,
}

impl fmt::Display for AssociationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigResolution => f.write_str("configuration"),
            Self::WorkflowCall => f.write_str("workflow call"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssociationOutcome {
    /// Nothing selected; no request was made
    NoSelection,
    Associated { member_count: usize, response: Value },
    Failed { stage: AssociationStage, error: String },
}

impl AssociationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Associated { .. })
    }
}

#[derive(Clone)]
pub struct AssociationOrchestrator {
    gateway: RecordGateway,
    invoker: Arc<dyn WorkflowInvoker>,
    workflow: WorkflowConfig,
}

impl AssociationOrchestrator {
    pub fn new(gateway: RecordGateway, invoker: Arc<dyn WorkflowInvoker>, workflow: WorkflowConfig) -> Self {
        Self {
            gateway,
            invoker,
            workflow,
        }
    }

    pub async fn associate_selected(&self, parent_id: &str, selection: &[Stakeholder]) -> AssociationOutcome {
        if selection.is_empty() {
            log::warn!("No row is selected; nothing to link");
            return AssociationOutcome::NoSelection;
        }

        let member_ids: Vec<String> = selection
            .iter()
            .map(|s| s.id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        log::info!("Linking {} stakeholders to {}", member_ids.len(), parent_id);
        log::debug!("Selected stakeholder ids: {:?}", member_ids);

        let url = match self.gateway.fetch_config_value(&self.workflow.endpoint_variable).await {
            Ok(url) => url,
            Err(e) => {
                log::error!("Failed to resolve the association workflow URL: {:#}", e);
                return AssociationOutcome::Failed {
                    stage: AssociationStage::ConfigResolution,
                    error: format!("{:#}", e),
                };
            }
        };

        let request = AssociationRequest {
            parent_id: parent_id.to_string(),
            member_ids,
        };
        let payload = request.to_payload(&self.workflow.parent_field, &self.workflow.member_field);

        match self.invoker.invoke(&url, &payload).await {
            Ok(response) => {
                log::info!("Workflow accepted {} stakeholders", request.member_ids.len());
                log::debug!("Workflow response: {}", response);
                AssociationOutcome::Associated {
                    member_count: request.member_ids.len(),
                    response,
                }
            }
            Err(e) => {
                log::error!("Failed to link stakeholders: {:#}", e);
                AssociationOutcome::Failed {
                    stage: AssociationStage::WorkflowCall,
                    error: format!("{:#}", e),
                }
            }
        }
    }
}
