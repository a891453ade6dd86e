//! Code → config index over a [`Config`], shared by the schema and data
//! validators. Where codes are duplicated the first declaration wins; the
//! duplicate itself is reported by the schema validator.

use std::collections::{HashMap, HashSet};

use formcheck_core::Type;

use crate::model::{Attribute, CompositeTypeConfig, Config, LookupConfig};

#[derive(Debug, Clone)]
pub struct SchemaIndex<'a> {
    lookups: HashMap<&'a str, &'a LookupConfig>,
    composites: HashMap<&'a str, &'a CompositeTypeConfig>,
    top_level: HashSet<&'a str>,
}

impl<'a> SchemaIndex<'a> {
    pub fn new(config: &'a Config) -> Self {
        let mut lookups = HashMap::new();
        for lookup in &config.lookup_configs {
            lookups.entry(lookup.code.as_str()).or_insert(lookup);
        }
        let mut composites = HashMap::new();
        for composite in &config.composite_type_configs {
            composites.entry(composite.code.as_str()).or_insert(composite);
        }
        let top_level = config.attributes.iter().map(|a| a.code.as_str()).collect();
        Self {
            lookups,
            composites,
            top_level,
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&'a LookupConfig> {
        self.lookups.get(code).copied()
    }

    pub fn composite(&self, code: &str) -> Option<&'a CompositeTypeConfig> {
        self.composites.get(code).copied()
    }

    /// Whether `code` names a top-level attribute.
    pub fn is_top_level(&self, code: &str) -> bool {
        self.top_level.contains(code)
    }

    /// Resolve a dot path (`address.postcode`) against the attributes of the
    /// composite `composite_code`.
    ///
    /// Every segment but the last must name a single (non-list) COMPOSITE
    /// attribute whose own composite resolves. Returns the attribute the
    /// final segment names.
    pub fn resolve_field(&self, composite_code: &str, field: &str) -> Option<&'a Attribute> {
        let mut attributes = &self.composite(composite_code)?.attributes;
        let mut segments = field.split('.').peekable();
        while let Some(segment) = segments.next() {
            let attribute = attributes.iter().find(|a| a.code == segment)?;
            if segments.peek().is_none() {
                return Some(attribute);
            }
            let nested = attribute
                .ty
                .filter(|ty| ty.extends(Type::Composite) && !attribute.list)
                .and(attribute.composite_ref())?;
            attributes = &self.composite(nested)?.attributes;
        }
        None
    }
}
