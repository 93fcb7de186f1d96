//! In-memory doubles for the Web API and the workflow endpoint
//!
//! `FakeStore` actually evaluates the FetchXML it receives (outer joins and
//! null conditions included) and the simple `field eq value` OData filters,
//! so tests exercise the real query text rather than canned answers.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::query::{Condition, ConditionOperator, FetchXml};
use crate::api::{WebApi, WorkflowInvoker};

const STAKEHOLDERS: &str = "crff8_stakeholder";
const LINKS: &str = "crff8_stakeholder_opportunity";
const DEFINITIONS: &str = "environmentvariabledefinition";
const VALUES: &str = "environmentvariablevalue";

pub fn stakeholder_row(id: &str, name: &str, contact: &str) -> Value {
    json!({
        "crff8_stakeholderid": id,
        "crff8_name": name,
        "crff8_contactinfo": contact,
    })
}

pub fn link(stakeholder_id: &str, parent_id: &str) -> Value {
    json!({
        "crff8_stakeholderid": stakeholder_id,
        "opportunityid": parent_id,
    })
}

#[derive(Default)]
pub struct FakeStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn add_stakeholders(&self, rows: Vec<Value>) {
        self.insert(STAKEHOLDERS, rows);
    }

    pub fn add_links(&self, rows: Vec<Value>) {
        self.insert(LINKS, rows);
    }

    pub fn define_variable(&self, schema_name: &str, definition_id: &str, value: Option<&str>) {
        self.insert(
            DEFINITIONS,
            vec![json!({
                "schemaname": schema_name,
                "environmentvariabledefinitionid": definition_id,
            })],
        );
        if let Some(value) = value {
            self.insert(
                VALUES,
                vec![json!({
                    "_environmentvariabledefinitionid_value": definition_id,
                    "schemaname": schema_name,
                    "value": value,
                })],
            );
        }
    }

    pub fn fail_entity(&self, entity: &str) {
        self.failing.lock().unwrap().insert(entity.to_string());
    }

    pub fn recover_entity(&self, entity: &str) {
        self.failing.lock().unwrap().remove(entity);
    }

    pub fn requested_entities(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn insert(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    fn table(&self, name: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(name).cloned().unwrap_or_default()
    }

    fn run_fetchxml(&self, query: &FetchXml) -> Result<Vec<Value>> {
        let mut results = Vec::new();

        for row in self.table(&query.entity) {
            // one entry per join combination: alias -> matched link row (None = outer null)
            let mut combinations: Vec<HashMap<String, Option<Value>>> = vec![HashMap::new()];

            for link in &query.links {
                let alias = link.alias.clone().unwrap_or_else(|| link.name.clone());
                let matches: Vec<Value> = self
                    .table(&link.name)
                    .into_iter()
                    .filter(|l| l.get(&link.from).is_some() && l.get(&link.from) == row.get(&link.to))
                    .filter(|l| {
                        link.filter
                            .as_ref()
                            .is_none_or(|f| f.conditions.iter().all(|c| condition_holds(c, Some(l))))
                    })
                    .collect();

                let mut next = Vec::new();
                for combo in &combinations {
                    if matches.is_empty() {
                        if link.link_type == crate::api::query::LinkType::Outer {
                            let mut c = combo.clone();
                            c.insert(alias.clone(), None);
                            next.push(c);
                        }
                    } else {
                        for m in &matches {
                            let mut c = combo.clone();
                            c.insert(alias.clone(), Some(m.clone()));
                            next.push(c);
                        }
                    }
                }
                combinations = next;
            }

            for combo in combinations {
                let keep = query.filter.as_ref().is_none_or(|f| {
                    f.conditions.iter().all(|c| match &c.entity_name {
                        Some(alias) => condition_holds(c, combo.get(alias).and_then(Option::as_ref)),
                        None => condition_holds(c, Some(&row)),
                    })
                });
                if keep {
                    results.push(project(&row, &query.attributes));
                }
            }
        }

        Ok(results)
    }

    fn run_odata(&self, entity: &str, options: &str) -> Result<Vec<Value>> {
        let mut rows = self.table(entity);

        for pair in options.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| anyhow!("Bad option '{}'", pair))?;
            let value = urlencoding::decode(value).context("Bad option encoding")?;
            if key != "$filter" {
                continue;
            }
            let mut parts = value.splitn(3, ' ');
            let (field, op, literal) = match (parts.next(), parts.next(), parts.next()) {
                (Some(f), Some(o), Some(l)) => (f, o, l),
                _ => bail!("Unsupported filter '{}'", value),
            };
            if op != "eq" {
                bail!("Unsupported filter operator '{}'", op);
            }
            let expected = match literal.strip_prefix('\'').and_then(|l| l.strip_suffix('\'')) {
                Some(quoted) => quoted.replace("''", "'"),
                None => literal.to_string(),
            };
            rows.retain(|r| r.get(field).and_then(Value::as_str) == Some(expected.as_str()));
        }

        Ok(rows)
    }
}

fn condition_holds(condition: &Condition, row: Option<&Value>) -> bool {
    let actual = row
        .and_then(|r| r.get(&condition.attribute))
        .filter(|v| !v.is_null());
    match condition.operator {
        ConditionOperator::Null => actual.is_none(),
        ConditionOperator::NotNull => actual.is_some(),
        ConditionOperator::Eq => actual.and_then(Value::as_str) == condition.value.as_deref(),
        ConditionOperator::Ne => actual.and_then(Value::as_str) != condition.value.as_deref(),
    }
}

fn project(row: &Value, attributes: &[String]) -> Value {
    if attributes.is_empty() {
        return row.clone();
    }
    let mut out = serde_json::Map::new();
    for attribute in attributes {
        if let Some(v) = row.get(attribute) {
            out.insert(attribute.clone(), v.clone());
        }
    }
    Value::Object(out)
}

#[async_trait]
impl WebApi for FakeStore {
    async fn retrieve_multiple(&self, entity: &str, options: &str) -> Result<Vec<Value>> {
        self.requests.lock().unwrap().push(entity.to_string());

        if self.failing.lock().unwrap().contains(entity) {
            bail!("503 Service Unavailable");
        }

        match options.strip_prefix("?fetchXml=") {
            Some(encoded) => {
                let query = FetchXml::decode(encoded)?;
                if query.entity != entity {
                    bail!("FetchXML entity '{}' does not match '{}'", query.entity, entity);
                }
                self.run_fetchxml(&query)
            }
            None => self.run_odata(entity, options),
        }
    }
}

/// Records every invocation and answers with a fixed result
pub struct FakeInvoker {
    response: Mutex<Result<Value, String>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeInvoker {
    pub fn succeeding(response: Value) -> Self {
        Self {
            response: Mutex::new(Ok(response)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            response: Mutex::new(Err(error.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowInvoker for FakeInvoker {
    async fn invoke(&self, url: &str, payload: &Value) -> Result<Value> {
        self.calls.lock().unwrap().push((url.to_string(), payload.clone()));
        match &*self.response.lock().unwrap() {
            Ok(value) => Ok(value.clone()),
            Err(error) => Err(anyhow!(error.clone())),
        }
    }
}
