//! Voice onboarding interview: collects name, age and disability category
//! with spoken confirmation, takes a photo and issues the QR payload.

pub mod extract;
pub mod interview;
pub mod model;
pub mod prompts;
pub mod runner;
pub mod state;

pub use extract::{FieldExtractor, KeywordExtractor};
pub use interview::Interview;
pub use model::{Disability, OnboardingRecord, QrPayload};
pub use runner::InterviewRunner;
pub use state::{Field, InterviewStep};
