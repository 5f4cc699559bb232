use crate::extract::{END_MARKER, START_MARKER};

/// Where the output-format instructions go relative to template and sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstructionPlacement {
    First,
    #[default]
    Last,
}

/// One labeled input document, rendered as `=== <label> ===` followed by its content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDoc {
    pub label: String,
    pub content: String,
}

impl SourceDoc {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// Boilerplate asking the generator to wrap its answer between the markers.
pub fn marker_instructions() -> String {
    format!(
        "Please format your answer as follows:\n{START_MARKER}\n[your analysis here]\n{END_MARKER}\n\n"
    )
}

#[derive(Clone, Debug, Default)]
pub struct PromptBuilder {
    placement: InstructionPlacement,
    template: Option<String>,
    sources: Vec<SourceDoc>,
}

impl PromptBuilder {
    pub fn new(placement: InstructionPlacement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn source(mut self, doc: SourceDoc) -> Self {
        self.sources.push(doc);
        self
    }

    pub fn sources(mut self, docs: impl IntoIterator<Item = SourceDoc>) -> Self {
        self.sources.extend(docs);
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        if self.placement == InstructionPlacement::First {
            out.push_str(&marker_instructions());
        }
        if let Some(t) = &self.template {
            out.push_str(t);
            out.push_str("\n\n");
        }
        for doc in &self.sources {
            out.push_str(&format!("=== {} ===\n", doc.label));
            out.push_str(&doc.content);
            out.push_str("\n\n");
        }
        if self.placement == InstructionPlacement::Last {
            out.push_str(&marker_instructions());
        }
        out
    }
}

/// Prompt followed by one `=== room ===` block per fetched chat log.
pub fn compose_gathered(prompt: &str, blocks: &[SourceDoc]) -> String {
    let data = blocks
        .iter()
        .map(|b| format!("=== {} ===\n{}\n", b.label, b.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n{prompt}\n\nChat data:\n{data}\n")
}
