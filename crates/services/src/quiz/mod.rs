//! Upload → review → configure → quiz → results, as explicit services over
//! a shared [`QuizContext`].

mod context;
mod creation;
mod results;
mod taking;

pub use context::QuizContext;
pub use creation::{QuizCreationService, SAMPLE_TEXT};
pub use results::ResultsService;
pub use taking::QuizTakingService;
