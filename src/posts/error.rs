use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml_edit::de::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Date parsing error: {0}")]
    DateParseError(String),

    #[error("Invalid post format: {0}")]
    InvalidFormat(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),
}
