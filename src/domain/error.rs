use crate::domain::model::MaterialId;

/// 在庫不足の明細
/// 不足している原材料ごとに要求量と利用可能量を保持する
#[derive(Debug, Clone, PartialEq)]
pub struct StockShortage {
    pub material_id: MaterialId,
    pub name: String,
    /// 要求された数量（明細の新しい合計数量）
    pub requested: u32,
    /// この要求が確保しえた最大数量
    /// 発注作成時は現在の利用可能在庫。発注編集時はそれに
    /// 当該発注が既に予約済みの数量を加えた値（自身の予約は再利用できるため）
    pub available: u32,
}

/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 利用可能在庫の不足（不足している全原材料を列挙する）
    InsufficientStock(Vec<StockShortage>),
    /// 実在庫が負になる操作（例: 手動調整後の納品確定）
    NegativeStock {
        name: String,
        stock: u32,
        requested: u32,
    },
    /// 無効な発注状態（例: Pendingの発注を納品しようとした）
    InvalidOrderState(String),
    /// 無効な数量（例: 0の数量）
    InvalidQuantity,
    /// 発注の検証失敗（例: 明細が空）
    OrderValidation(String),
    /// 発注停止中の原材料を発注しようとした
    InactiveMaterial(String),
    /// 原材料が見つからない
    MaterialNotFound(String),
    /// 発注が見つからない
    OrderNotFound(String),
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値
    InvalidValue(String),
    /// 永続化層のエラー
    RepositoryError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InsufficientStock(shortages) => {
                write!(f, "Insufficient stock:")?;
                for shortage in shortages {
                    write!(
                        f,
                        " raw material {}: requested {}, available {};",
                        shortage.name, shortage.requested, shortage.available
                    )?;
                }
                Ok(())
            }
            DomainError::NegativeStock {
                name,
                stock,
                requested,
            } => write!(
                f,
                "Delivery would make stock negative for raw material {}: stock {}, requested {}",
                name, stock, requested
            ),
            DomainError::InvalidOrderState(msg) => write!(f, "Invalid order state: {}", msg),
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::OrderValidation(msg) => write!(f, "Order validation failed: {}", msg),
            DomainError::InactiveMaterial(name) => {
                write!(f, "Raw material {} is not available for ordering", name)
            }
            DomainError::MaterialNotFound(id) => write!(f, "Raw material not found: {}", id),
            DomainError::OrderNotFound(id) => write!(f, "Material order not found: {}", id),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<crate::domain::port::RepositoryError> for DomainError {
    fn from(e: crate::domain::port::RepositoryError) -> Self {
        DomainError::RepositoryError(e.to_string())
    }
}
