// アプリケーション層
// ユースケースを実装し、ドメイン層をオーケストレーションする

pub mod error;
pub mod service;

pub use error::ApplicationError;
