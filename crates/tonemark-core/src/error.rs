pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid config JSON: {message}")]
    InvalidConfigJson { message: String },

    #[error("Invalid config value at `{path}`: {message}")]
    InvalidConfig { path: String, message: String },
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidConfigJson {
            message: value.to_string(),
        }
    }
}
