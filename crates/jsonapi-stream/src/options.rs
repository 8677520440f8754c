use crate::naming::FieldNaming;

/// How resource-valued attributes are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedResources {
    /// Render through the envelope encoder; the depth rule reduces them to linkage
    #[default]
    Linkage,
    /// Leave resource-valued attributes out of the attributes block entirely
    Skip,
}

/// Which writer carries the relationships of a top-level resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationshipMode {
    /// Relationships are written in place as they are encoded
    #[default]
    Inline,
    /// Relationships are captured and written as one section on flush
    Buffered,
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Indent output (default: compact)
    pub pretty: bool,
    /// Indentation size when `pretty` is set (default: 2 spaces, at most 16)
    pub indent: usize,
    /// Naming convention applied to attribute field names
    pub field_naming: FieldNaming,
    pub nested_resources: NestedResources,
    pub relationships: RelationshipMode,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_field_naming(mut self, naming: FieldNaming) -> Self {
        self.field_naming = naming;
        self
    }

    pub fn with_nested_resources(mut self, nested: NestedResources) -> Self {
        self.nested_resources = nested;
        self
    }

    pub fn with_relationships(mut self, mode: RelationshipMode) -> Self {
        self.relationships = mode;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
            field_naming: FieldNaming::default(),
            nested_resources: NestedResources::default(),
            relationships: RelationshipMode::default(),
        }
    }
}
