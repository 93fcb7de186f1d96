//! The "not yet linked" stakeholder query
//!
//! `link.parent ne P` would return stakeholders linked to *other* parents,
//! so this is an anti-join instead: outer-join the intersect rows for P and
//! keep the stakeholders where that join produced nothing.

use crate::api::query::{Condition, FetchXml, FilterGroup, LinkEntity, LinkType};
use crate::config::SchemaConfig;

/// Stakeholders with no intersect row pointing at `parent_id`.
///
/// An empty `parent_id` is embedded as-is; no intersect row matches it, so
/// the query returns every stakeholder.
pub fn build_unlinked_stakeholder_query(parent_id: &str, schema: &SchemaConfig) -> FetchXml {
    let mut query = FetchXml::new(&schema.stakeholder_entity);
    query.attributes = vec![
        schema.stakeholder_id.clone(),
        schema.stakeholder_name.clone(),
        schema.stakeholder_contact_info.clone(),
    ];
    query.links.push(LinkEntity {
        name: schema.link_entity.clone(),
        from: schema.link_from.clone(),
        to: schema.link_to.clone(),
        link_type: LinkType::Outer,
        alias: Some(schema.link_alias.clone()),
        filter: Some(FilterGroup::and(vec![Condition::eq(
            &schema.link_parent_attribute,
            parent_id,
        )])),
    });
    query.filter = Some(FilterGroup::and(vec![
        Condition::is_null(&schema.link_parent_attribute).on(&schema.link_alias),
    ]));
    query
}
