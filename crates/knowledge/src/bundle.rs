use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::error::{KnowledgeError, Result};
use crate::reader::{read_contained, FileContent};
use crate::root::DirectiveRoot;
use crate::{CONTEXT_FILE, OPERATING_PROCEDURE_FILE, TEMPLATES_DIR};

/// Everything an agent needs to start drafting from one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBundle {
    pub primer: String,
    pub agent_operating_procedure: FileContent,
    pub agent_context: FileContent,
    pub template: FileContent,
}

/// Leading sentence of the operating procedure: everything up to and including the first `.`,
/// trimmed. Without a period the whole trimmed text is used.
pub fn derive_primer(procedure: &str) -> String {
    let sentence = match procedure.find('.') {
        Some(end) => &procedure[..=end],
        None => procedure,
    };
    sentence.trim().to_string()
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(|c| c == '/' || c == '\\')
}

/// Builds the bundle for `template_name` (a file under `directive/reference/templates/`).
///
/// All three files are read fresh; any failure aborts the whole bundle. A template that is not on
/// disk fails with [`KnowledgeError::MissingTemplate`].
pub fn build_bundle(root: &DirectiveRoot, template_name: &str) -> Result<TemplateBundle> {
    if !is_plain_file_name(template_name) {
        return Err(KnowledgeError::invalid_path(
            template_name,
            "template name must be a plain file name",
        ));
    }

    let agent_operating_procedure = read_contained(
        root,
        &root.display_path(OPERATING_PROCEDURE_FILE),
        "agent operating procedure",
    )?;
    let agent_context = read_contained(root, &root.display_path(CONTEXT_FILE), "agent context")?;

    let template_path = root.display_path(&format!("{TEMPLATES_DIR}/{template_name}"));
    let template = match read_contained(root, &template_path, "template") {
        Ok(file) => file,
        Err(KnowledgeError::NotFound { .. }) => {
            return Err(KnowledgeError::MissingTemplate {
                path: template_path,
            })
        }
        Err(err) => return Err(err),
    };

    let primer = derive_primer(&agent_operating_procedure.content);
    log::debug!("Built bundle for {template_name}");

    Ok(TemplateBundle {
        primer,
        agent_operating_procedure,
        agent_context,
        template,
    })
}
