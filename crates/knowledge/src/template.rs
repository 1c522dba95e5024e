use serde::{Deserialize, Serialize};

/// The fixed allow-list of drafting templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Spec,
    Impact,
    Tdr,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [Self::Spec, Self::Impact, Self::Tdr];

    /// File name under `directive/reference/templates/`.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Spec => "spec_template.md",
            Self::Impact => "impact_template.md",
            Self::Tdr => "tdr_template.md",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.file_name() == name)
    }

    /// Short label used in method and tool names (`spec`, `impact`, `tdr`).
    pub fn slug(self) -> &'static str {
        match self {
            Self::Spec => "spec",
            Self::Impact => "impact",
            Self::Tdr => "tdr",
        }
    }

    /// Human name of the document drafted from this template.
    pub fn document(self) -> &'static str {
        match self {
            Self::Spec => "Spec",
            Self::Impact => "Impact analysis",
            Self::Tdr => "Technical Design Review",
        }
    }
}
