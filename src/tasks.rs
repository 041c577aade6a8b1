use serde::{Deserialize, Serialize};

/// One classification target: where its manifest lives, which column holds
/// the label and where its CSV goes. Paths are relative to the manifest and
/// output directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub manifest: String,
    pub label_column: String,
    pub output: String,
}

impl TaskSpec {
    fn new(name: &str, manifest: &str, label_column: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            manifest: manifest.to_string(),
            label_column: label_column.to_string(),
            output: output.to_string(),
        }
    }
}

pub fn builtin_tasks() -> Vec<TaskSpec> {
    vec![
        TaskSpec::new(
            "er",
            "er_status_samples.txt",
            "er_status_by_ihc",
            "er_task_data.csv",
        ),
        TaskSpec::new(
            "pr",
            "pr_status_samples.txt",
            "pr_status_by_ihc",
            "pr_task_data.csv",
        ),
        TaskSpec::new(
            "her2",
            "her2_status_samples.txt",
            "HER2_status",
            "her2_task_data.csv",
        ),
        TaskSpec::new(
            "tn",
            "tn_status_samples.txt",
            "Triple_negative_status",
            "tn_task_data.csv",
        ),
    ]
}
