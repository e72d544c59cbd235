//! studyquiz-client: Service and store backends.
//!
//! Implements `QuizService` over HTTP and `ProfileStore` over Firestore
//! REST or local JSON files, plus the configuration that selects them.

pub mod config;
pub mod error;
pub mod file_store;
pub mod firestore;
pub mod http;
pub mod mock;

pub use config::{create_service, create_store, load_config, StoreConfig, StudyquizConfig};
pub use error::StoreError;
pub use file_store::JsonFileStore;
pub use firestore::FirestoreStore;
pub use http::HttpQuizService;
pub use mock::MockQuizService;
