//! Routing table shared by the tool surface and the legacy method surface.
//!
//! Every operation is listed once; its tool name, legacy method name and descriptor all derive
//! from that single entry so the two surfaces cannot drift apart.

use directive_knowledge::TemplateKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Naming and result-shaping convention a request arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Flat methods (`directive.file.get`); results are returned as-is.
    Legacy,
    /// `tools/call` by tool name; results are wrapped in a text-content envelope.
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListFiles,
    ReadFile,
    Bundle(TemplateKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub surface: Surface,
    pub operation: Operation,
}

/// Arguments of `directive/file.get` / `directive.file.get`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub(crate) struct FileGetArgs {
    /// Path under directive/ (e.g., directive/agent_context.md)
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::ListFiles,
        Self::ReadFile,
        Self::Bundle(TemplateKind::Spec),
        Self::Bundle(TemplateKind::Impact),
        Self::Bundle(TemplateKind::Tdr),
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            Self::ListFiles => "directive/files.list",
            Self::ReadFile => "directive/file.get",
            Self::Bundle(TemplateKind::Spec) => "directive/spec.template",
            Self::Bundle(TemplateKind::Impact) => "directive/impact.template",
            Self::Bundle(TemplateKind::Tdr) => "directive/tdr.template",
        }
    }

    pub fn legacy_method(self) -> &'static str {
        match self {
            Self::ListFiles => "directive.files.list",
            Self::ReadFile => "directive.file.get",
            Self::Bundle(TemplateKind::Spec) => "spec.template",
            Self::Bundle(TemplateKind::Impact) => "impact.template",
            Self::Bundle(TemplateKind::Tdr) => "tdr.template",
        }
    }

    pub fn name_on(self, surface: Surface) -> &'static str {
        match surface {
            Surface::Legacy => self.legacy_method(),
            Surface::Tool => self.tool_name(),
        }
    }

    pub fn lookup(surface: Surface, name: &str) -> Option<Route> {
        Self::ALL
            .into_iter()
            .find(|op| op.name_on(surface) == name)
            .map(|operation| Route { surface, operation })
    }

    fn title(self) -> &'static str {
        match self {
            Self::ListFiles => "List Directive Files",
            Self::ReadFile => "Read Directive File",
            Self::Bundle(TemplateKind::Spec) => "Spec Template Bundle",
            Self::Bundle(TemplateKind::Impact) => "Impact Template Bundle",
            Self::Bundle(TemplateKind::Tdr) => "TDR Template Bundle",
        }
    }

    fn description(self) -> String {
        match self {
            Self::ListFiles => {
                "List all files under the repository's directive/ directory (context and templates)."
                    .to_string()
            }
            Self::ReadFile => {
                "Read a file under directive/ by path and return its full contents verbatim."
                    .to_string()
            }
            Self::Bundle(kind) => {
                let article = if kind == TemplateKind::Impact { "an" } else { "a" };
                let subject = if kind == TemplateKind::Spec {
                    "a new Spec".to_string()
                } else {
                    format!("{article} {}", kind.document())
                };
                format!(
                    "Return Agent Operating Procedure, Agent Context, and the {} template, plus a concise Primer for drafting {subject}.",
                    template_label(kind)
                )
            }
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::ReadFile => compact_schema(
                serde_json::to_value(schemars::schema_for!(FileGetArgs)).unwrap_or_default(),
            ),
            Self::ListFiles | Self::Bundle(_) => empty_object_schema(),
        }
    }

    pub fn descriptor(self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.tool_name(),
            title: self.title(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

fn template_label(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Spec => "Spec",
        TemplateKind::Impact => "Impact",
        TemplateKind::Tdr => "TDR",
    }
}

fn empty_object_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {},
    })
}

/// Drops generator metadata so the schema is plain draft-07 shape.
fn compact_schema(mut schema: Value) -> Value {
    if let Some(map) = schema.as_object_mut() {
        map.remove("$schema");
        map.remove("title");
        map.remove("description");
        map.entry("type").or_insert_with(|| json!("object"));
    }
    schema
}

/// Static tool catalog, in routing-table order.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    Operation::ALL.into_iter().map(Operation::descriptor).collect()
}
