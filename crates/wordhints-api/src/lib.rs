pub mod handlers;
pub mod lexicon;
pub mod rate_limit;
pub mod remote;

pub use handlers::{AppState, DEFAULT_DIFFICULTY, SUPPORTED_LANGUAGE, router};
pub use lexicon::WordNetDictionary;
pub use remote::{RemoteParser, RemoteSenseClassifier};
