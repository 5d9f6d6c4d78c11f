// ドメイン層
// ビジネスルールとドメインモデルを定義する

pub mod error;
pub mod model;
pub mod port;
pub mod service;
