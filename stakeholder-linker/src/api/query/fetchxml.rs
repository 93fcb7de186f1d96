//! Structured FetchXML queries
//!
//! A [`FetchXml`] value is rendered to the XML template Dataverse expects and
//! percent-encoded for the `?fetchXml=` option. Decoding and parsing with
//! roxmltree gives back the same structure.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::escape::escape;
use std::fmt::Write as _;

/// Root of a FetchXML query: one entity with attributes, links and a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchXml {
    pub entity: String,
    pub attributes: Vec<String>,
    pub links: Vec<LinkEntity>,
    pub filter: Option<FilterGroup>,
}

/// `<link-entity>` join to a related entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntity {
    pub name: String,
    pub from: String,
    pub to: String,
    pub link_type: LinkType,
    pub alias: Option<String>,
    pub filter: Option<FilterGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Inner,
    Outer,
}

impl LinkType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "inner",
            Self::Outer => "outer",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "inner" => Ok(Self::Inner),
            "outer" => Ok(Self::Outer),
            other => bail!("Unsupported link-type '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    And,
    Or,
}

impl FilterKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// `<filter>` with its conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    pub kind: FilterKind,
    pub conditions: Vec<Condition>,
}

impl FilterGroup {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            kind: FilterKind::And,
            conditions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Eq,
    Ne,
    Null,
    NotNull,
}

impl ConditionOperator {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Null => "null",
            Self::NotNull => "not-null",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "null" => Ok(Self::Null),
            "not-null" => Ok(Self::NotNull),
            other => bail!("Unsupported condition operator '{}'", other),
        }
    }

    /// Whether the operator carries a `value` attribute
    pub fn takes_value(&self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }
}

/// `<condition>`; `entity_name` points at a link alias when set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub entity_name: Option<String>,
    pub attribute: String,
    pub operator: ConditionOperator,
    pub value: Option<String>,
}

impl Condition {
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity_name: None,
            attribute: attribute.into(),
            operator: ConditionOperator::Eq,
            value: Some(value.into()),
        }
    }

    pub fn is_null(attribute: impl Into<String>) -> Self {
        Self {
            entity_name: None,
            attribute: attribute.into(),
            operator: ConditionOperator::Null,
            value: None,
        }
    }

    /// Scope the condition to a linked entity alias
    pub fn on(mut self, alias: impl Into<String>) -> Self {
        self.entity_name = Some(alias.into());
        self
    }
}

impl FetchXml {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            attributes: Vec::new(),
            links: Vec::new(),
            filter: None,
        }
    }

    /// Render the query as FetchXML text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<fetch>");
        let _ = write!(out, "<entity name='{}'>", escape(&self.entity));
        for attribute in &self.attributes {
            let _ = write!(out, "<attribute name='{}' />", escape(attribute));
        }
        for link in &self.links {
            let _ = write!(
                out,
                "<link-entity name='{}' from='{}' to='{}' link-type='{}'",
                escape(&link.name),
                escape(&link.from),
                escape(&link.to),
                link.link_type.as_str()
            );
            if let Some(alias) = &link.alias {
                let _ = write!(out, " alias='{}'", escape(alias));
            }
            out.push('>');
            if let Some(filter) = &link.filter {
                write_filter(&mut out, filter);
            }
            out.push_str("</link-entity>");
        }
        if let Some(filter) = &self.filter {
            write_filter(&mut out, filter);
        }
        out.push_str("</entity></fetch>");
        out
    }

    /// Percent-encoded query text, ready for the `fetchXml` option
    pub fn encode(&self) -> String {
        urlencoding::encode(&self.to_xml()).into_owned()
    }

    /// Retrieve-multiple options string carrying this query
    pub fn to_options(&self) -> String {
        format!("?fetchXml={}", self.encode())
    }

    /// Inverse of [`FetchXml::encode`]
    pub fn decode(encoded: &str) -> Result<Self> {
        let xml = urlencoding::decode(encoded).context("FetchXML is not valid percent-encoded UTF-8")?;
        Self::parse(&xml)
    }

    /// Parse FetchXML text into the structured form
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml).context("Failed to parse FetchXML")?;
        let root = doc.root_element();
        if root.tag_name().name() != "fetch" {
            bail!("Expected <fetch> root, found <{}>", root.tag_name().name());
        }

        let entity_node = root
            .children()
            .find(|n| n.has_tag_name("entity"))
            .ok_or_else(|| anyhow!("FetchXML has no <entity> element"))?;

        let mut fetch = FetchXml::new(required_attr(&entity_node, "name")?);

        for child in entity_node.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "attribute" => fetch.attributes.push(required_attr(&child, "name")?),
                "link-entity" => fetch.links.push(parse_link(&child)?),
                "filter" => fetch.filter = Some(parse_filter(&child)?),
                other => bail!("Unsupported element <{}> inside <entity>", other),
            }
        }

        Ok(fetch)
    }
}

fn write_filter(out: &mut String, filter: &FilterGroup) {
    let _ = write!(out, "<filter type='{}'>", filter.kind.as_str());
    for condition in &filter.conditions {
        out.push_str("<condition");
        if let Some(entity) = &condition.entity_name {
            let _ = write!(out, " entityname='{}'", escape(entity));
        }
        let _ = write!(
            out,
            " attribute='{}' operator='{}'",
            escape(&condition.attribute),
            condition.operator.as_str()
        );
        if let Some(value) = &condition.value {
            let _ = write!(out, " value='{}'", escape(value));
        }
        out.push_str(" />");
    }
    out.push_str("</filter>");
}

fn parse_link(node: &roxmltree::Node) -> Result<LinkEntity> {
    let link_type = match node.attribute("link-type") {
        Some(value) => LinkType::parse(value)?,
        None => LinkType::Inner,
    };

    let mut filter = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "filter" => filter = Some(parse_filter(&child)?),
            other => bail!("Unsupported element <{}> inside <link-entity>", other),
        }
    }

    Ok(LinkEntity {
        name: required_attr(node, "name")?,
        from: required_attr(node, "from")?,
        to: required_attr(node, "to")?,
        link_type,
        alias: node.attribute("alias").map(str::to_string),
        filter,
    })
}

fn parse_filter(node: &roxmltree::Node) -> Result<FilterGroup> {
    let kind = match node.attribute("type").unwrap_or("and") {
        "and" => FilterKind::And,
        "or" => FilterKind::Or,
        other => bail!("Unsupported filter type '{}'", other),
    };

    let mut conditions = Vec::new();
    for child in node.children().filter(|n| n.is_element()) {
        if !child.has_tag_name("condition") {
            bail!("Unsupported element <{}> inside <filter>", child.tag_name().name());
        }
        conditions.push(Condition {
            entity_name: child.attribute("entityname").map(str::to_string),
            attribute: required_attr(&child, "attribute")?,
            operator: ConditionOperator::parse(&required_attr(&child, "operator")?)?,
            value: child.attribute("value").map(str::to_string),
        });
    }

    Ok(FilterGroup { kind, conditions })
}

fn required_attr(node: &roxmltree::Node, name: &str) -> Result<String> {
    node.attribute(name)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("<{}> is missing the '{}' attribute", node.tag_name().name(), name))
}
