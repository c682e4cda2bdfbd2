pub mod credentials;
pub mod evaluation_service;
pub mod exchange_log;
pub mod rubric_prompt;

pub use credentials::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use evaluation_service::{EvaluationService, Evaluator};
pub use exchange_log::{ExchangeLogger, ExchangeRecord, FormExchangeLogger, NoopExchangeLogger};
