//! MSBuild project element names
//!
//! Element names are resolved once per document against the namespace the root
//! declares, so every lookup and every created element agree on the namespace.

use crate::document::ProjectDocument;

/// Element holding a build setting group
pub const PROPERTY_GROUP: &str = "PropertyGroup";
/// Item element for files that are part of the project but not compiled
pub const NONE: &str = "None";
/// Path attribute of item elements
pub const INCLUDE: &str = "Include";
/// Compiler language version setting
pub const LANG_VERSION: &str = "LangVersion";
/// Value given to a freshly created `LangVersion` before a request is applied
pub const DEFAULT_LANG_VERSION: &str = "9.0";

/// An expanded element name: namespace plus local name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    namespace: Option<String>,
    pub local: &'static str,
}

impl QualifiedName {
    pub fn new(namespace: Option<&str>, local: &'static str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// The qualified names used when reconciling a particular document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsBuildSchema {
    pub none: QualifiedName,
    pub property_group: QualifiedName,
    pub lang_version: QualifiedName,
}

impl MsBuildSchema {
    /// Names in the given namespace
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            none: QualifiedName::new(namespace, NONE),
            property_group: QualifiedName::new(namespace, PROPERTY_GROUP),
            lang_version: QualifiedName::new(namespace, LANG_VERSION),
        }
    }

    /// Names in the namespace declared by the document root
    pub fn for_document(document: &ProjectDocument) -> Self {
        Self::new(document.root_namespace())
    }

    /// The namespace all names are resolved in
    pub fn namespace(&self) -> Option<&str> {
        self.lang_version.namespace()
    }

    /// `Include` values of `None` items ending with `suffix`
    pub fn none_includes_ending_with<'a>(
        &'a self,
        document: &'a ProjectDocument,
        suffix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        document
            .elements_named(&self.none)
            .filter_map(|el| el.attribute(INCLUDE))
            .filter(move |include| include.ends_with(suffix))
    }
}
