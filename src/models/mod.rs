pub mod record;
pub mod verdict;

pub use record::CriterionRecord;
pub use verdict::{AnalyzeRequest, Verdict, Violation};
