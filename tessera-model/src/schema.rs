//! Declarative mapping metadata
//!
//! A [`ClassSchema`] is the startup-time-built mapping table for one native
//! type: its ontology class IRI, optional named-graph policy, supertype
//! names, namespace declarations, and one [`FieldSchema`] per mapped
//! accessor. Applications construct these however they like (config files,
//! code, generated tables); everything here is plain immutable data.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Declared native kind of a field value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Boolean scalar
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 16-bit integer
    Short,
    /// 64-bit float
    Double,
    /// 32-bit float
    Float,
    /// Single character
    Char,
    /// UTF-8 string
    String,
    /// Calendar date (xsd:date)
    Date,
    /// Timestamp with offset (xsd:dateTime)
    DateTime,
    /// Resource reference held as a plain URI string
    Uri,
    /// Nested mapped entity of the named type
    Object(Arc<str>),
}

impl FieldKind {
    /// Check if a string value can be delivered into this kind without loss
    pub fn accepts_string(&self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Uri | FieldKind::Char)
    }
}

/// Declared container kind for a multi-valued field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Container {
    /// Single-valued accessor
    #[default]
    Single,
    /// Ordered list, duplicates allowed
    List,
    /// Insertion-ordered set, duplicates removed
    Set,
    /// Set ordered by term order
    SortedSet,
}

impl Container {
    /// Check if this is a multi-valued container kind
    pub fn is_multi(&self) -> bool {
        !matches!(self, Container::Single)
    }
}

/// Per-field, per-operation-kind cascade flags
///
/// Absence of a flag means "do not cascade this operation through this
/// field": persisting an entity never implicitly persists its related
/// entities unless declared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePolicy {
    /// Cascade persist through this field
    pub persist: bool,
    /// Cascade merge through this field
    pub merge: bool,
    /// Cascade remove through this field
    pub remove: bool,
}

impl CascadePolicy {
    /// No cascading (the default)
    pub fn none() -> Self {
        Self::default()
    }

    /// Cascade every operation kind
    pub fn all() -> Self {
        Self {
            persist: true,
            merge: true,
            remove: true,
        }
    }
}

/// Mapping of one field/accessor onto a predicate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name on the native type
    pub name: Arc<str>,
    /// Predicate IRI (expanded by the registry at registration time)
    pub predicate: Arc<str>,
    /// Declared native kind
    pub kind: FieldKind,
    /// Container kind for multi-valued fields
    pub container: Container,
    /// Emit/consume the values as an RDF list structure instead of one
    /// triple per element
    pub rdf_list: bool,
    /// Defer loading of the referenced entity until first access
    pub lazy: bool,
    /// Excluded from serialization entirely
    pub transient: bool,
    /// Designated identity source: a non-null value here derives the
    /// subject identifier when none was assigned
    pub identity: bool,
    /// Store a Uri value as an xsd:anyURI literal instead of a resource
    pub any_uri_literal: bool,
    /// Language tag applied to string literals of this field
    pub language: Option<Arc<str>>,
    /// Cascade flags
    pub cascade: CascadePolicy,
}

impl FieldSchema {
    /// Create a single-valued, non-cascading field mapping
    pub fn new(name: impl AsRef<str>, predicate: impl AsRef<str>, kind: FieldKind) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            predicate: Arc::from(predicate.as_ref()),
            kind,
            container: Container::Single,
            rdf_list: false,
            lazy: false,
            transient: false,
            identity: false,
            any_uri_literal: false,
            language: None,
            cascade: CascadePolicy::none(),
        }
    }

    /// Set the container kind
    pub fn container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Use RDF list structure for the values
    pub fn rdf_list(mut self) -> Self {
        self.rdf_list = true;
        self
    }

    /// Defer loading until first access
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Exclude from serialization
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Mark as the identity source field
    pub fn identity_source(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Store Uri values as xsd:anyURI literals
    pub fn any_uri_literal(mut self) -> Self {
        self.any_uri_literal = true;
        self
    }

    /// Apply a language tag to string literals
    pub fn language(mut self, lang: impl AsRef<str>) -> Self {
        self.language = Some(Arc::from(lang.as_ref()));
        self
    }

    /// Set the cascade flags
    pub fn cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }
}

/// Mapping table for one native type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Native type name (registry key)
    pub name: Arc<str>,
    /// Primary ontology class IRI (mandatory)
    pub class_iri: Arc<str>,
    /// Additional rdf:type values this type asserts
    pub extra_types: Vec<Arc<str>>,
    /// Named-graph policy: triples of this type live in the named graph
    pub graph: Option<Arc<str>>,
    /// Names of declared supertypes (registry keys)
    pub supers: Vec<Arc<str>>,
    /// Abstract/interface type: needs a concrete factory to instantiate
    pub is_abstract: bool,
    /// (prefix, namespace IRI) declarations carried by this type
    pub namespaces: Vec<(Arc<str>, Arc<str>)>,
    /// Mapped fields
    pub fields: Vec<FieldSchema>,
}

impl ClassSchema {
    /// Create a schema with no fields
    pub fn new(name: impl AsRef<str>, class_iri: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            class_iri: Arc::from(class_iri.as_ref()),
            extra_types: Vec::new(),
            graph: None,
            supers: Vec::new(),
            is_abstract: false,
            namespaces: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Add a field mapping
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a supertype by registry name
    pub fn with_super(mut self, name: impl AsRef<str>) -> Self {
        self.supers.push(Arc::from(name.as_ref()));
        self
    }

    /// Assert an additional rdf:type value
    pub fn with_extra_type(mut self, iri: impl AsRef<str>) -> Self {
        self.extra_types.push(Arc::from(iri.as_ref()));
        self
    }

    /// Scope this type's triples to a named graph
    pub fn with_graph(mut self, iri: impl AsRef<str>) -> Self {
        self.graph = Some(Arc::from(iri.as_ref()));
        self
    }

    /// Declare a namespace prefix
    pub fn with_namespace(mut self, prefix: impl AsRef<str>, iri: impl AsRef<str>) -> Self {
        self.namespaces
            .push((Arc::from(prefix.as_ref()), Arc::from(iri.as_ref())));
        self
    }

    /// Mark as abstract/interface
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name.as_ref() == name)
    }

    /// Find a field by predicate IRI
    pub fn field_by_predicate(&self, predicate: &str) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|f| f.predicate.as_ref() == predicate)
    }

    /// The designated identity-source field, if any
    pub fn identity_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.identity)
    }

    /// All rdf:type IRIs this type asserts (primary first)
    pub fn asserted_types(&self) -> impl Iterator<Item = &Arc<str>> {
        std::iter::once(&self.class_iri).chain(self.extra_types.iter())
    }
}
