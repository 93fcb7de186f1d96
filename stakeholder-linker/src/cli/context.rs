//! Wiring config into a ready-to-use controller

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use stakeholder_linker::api::{DynamicsClient, HttpWorkflowInvoker};
use stakeholder_linker::config::Config;
use stakeholder_linker::services::stakeholders::{
    AssociationOrchestrator, LinkController, RecordGateway,
};

pub fn build_controller(config: &Config, parent_id: &str) -> Result<LinkController> {
    let client = Arc::new(DynamicsClient::from_config(config)?);
    let invoker = Arc::new(HttpWorkflowInvoker::new(Duration::from_secs(
        config.workflow.timeout_secs,
    ))?);

    let gateway = RecordGateway::new(client, config.schema.clone());
    let orchestrator = AssociationOrchestrator::new(gateway.clone(), invoker, config.workflow.clone());

    Ok(LinkController::new(
        gateway,
        orchestrator,
        parent_id,
        config.view.preserve_selection_on_empty_click,
    ))
}
