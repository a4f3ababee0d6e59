pub mod config;
pub mod error;
pub mod index;
pub mod store;
pub mod term_counter;
pub mod tokenizer;

pub use config::{IndexConfig, StoreConfig};
pub use error::{Error, Result};
pub use index::{term_counter_key, url_set_key, Index};
pub use store::{MemoryStore, SledStore, Store, Transaction};
pub use term_counter::TermCounter;
pub use tokenizer::CounterOptions;
