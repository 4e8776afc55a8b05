use std::process::ExitStatus;

pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Command failed: {command}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Unsupported variable in {template}: {key}")]
    UnsupportedVariable { template: String, key: String },

    #[error("failed to parse {template}: {source}")]
    TemplateParse {
        template: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Tag {tag} doesn't exist in {image}. Available tags are: {available:?}")]
    UnknownTag {
        image: String,
        tag: String,
        available: Vec<String>,
    },

    #[error("discovery failed: {0}")]
    Discovery(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
