//! docqa: single-page document question answering.
//!
//! Upload a PDF or text file, extract its text, and ask a question answered
//! either by a local model process or by a cloud API model.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AnswerError, AppError, AppResult, ExtractionError};
pub use state::AppState;
