pub mod backend;
pub mod extractor;
pub mod session;

pub use backend::{
    AnswerBackend, AnswerRequest, AnswerResult, Backends, CloudApiBackend, LocalProcessBackend,
    CONTEXT_CHAR_LIMIT,
};
pub use extractor::{extract, ExtractionResult};
pub use session::{AnswerReady, Session, SessionState};
