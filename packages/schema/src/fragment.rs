use crate::command::CommandSpec;
use crate::definition::{GlobalAttributes, TypeDefinition};
use crate::feature::Feature;

/// What loading one extension produces
#[derive(Debug, Clone, Default)]
pub struct SchemaFragment {
    /// Name of the extension that produced the fragment
    pub name: String,
    pub definitions: Vec<TypeDefinition>,
    pub global_attributes: Vec<GlobalAttributes>,
    /// Commands not owned by any type
    pub commands: Vec<CommandSpec>,
    pub features: Vec<Feature>,
}

impl SchemaFragment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_definition(mut self, definition: TypeDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_global_attributes(mut self, global: GlobalAttributes) -> Self {
        self.global_attributes.push(global);
        self
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }
}
