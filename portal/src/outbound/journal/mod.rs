//! Submission journal adapters.

mod file_journal;

pub use file_journal::FileSubmissionJournal;
