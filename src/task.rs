//! Task construction: the instruction string handed to the engine.

use serde::Serialize;

/// An opaque instruction for the automation engine. Immutable once built;
/// consumed by exactly one run.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    description: String,
}

impl Task {
    /// A task from a bare instruction.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// A task augmented with extracted feature-usage instructions.
    /// With no instructions this is just the original task.
    pub fn with_usage_instructions(description: &str, instructions: Option<&str>) -> Self {
        let description = match instructions {
            Some(instructions) if !instructions.is_empty() => {
                format!(
                    "{}\n\nFeature Usage Instructions:\n{}",
                    description, instructions
                )
            }
            _ => description.to_string(),
        };
        Self { description }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
