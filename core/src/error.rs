#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("url {url} has not been indexed")]
    NotIndexed { url: String },

    #[error("malformed count {value:?} for field {field:?} of {key}")]
    MalformedCount { key: String, field: String, value: String },

    #[error("operation against a key holding the wrong kind of value: {key}")]
    WrongType { key: String },

    #[error("invalid store spec {0:?}, expected memory, sled:<path> or redis://...")]
    InvalidStoreSpec(String),

    #[error(transparent)]
    Sled(#[from] sled::Error),

    #[error("store backend {0} is not compiled in")]
    BackendUnavailable(&'static str),

    #[cfg(feature = "redis")]
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
