// 原材料発注管理システム
// ヘキサゴナルアーキテクチャによる店舗在庫予約エンジン

pub mod adapter;
pub mod application;
pub mod domain;
