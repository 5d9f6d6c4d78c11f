use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 発注の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// 新しい一意のOrderIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから OrderId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からOrderIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// 原材料の一意識別子
/// 複数材料の行ロックを昇順で取得できるようOrdを実装する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(Uuid);

impl MaterialId {
    /// 新しい一意のMaterialIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから MaterialId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からMaterialIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for MaterialId {
    fn default() -> Self {
        Self::new()
    }
}

/// 店舗（アウトレット）の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutletId(Uuid);

impl OutletId {
    /// 新しい一意のOutletIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから OutletId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からOutletIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OutletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for OutletId {
    fn default() -> Self {
        Self::new()
    }
}

/// 発注者（スタッフ）の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(Uuid);

impl StaffId {
    /// 新しい一意のStaffIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから StaffId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からStaffIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// インドネシアルピア
    #[allow(clippy::upper_case_acronyms)]
    IDR,
}

/// 金額を表す値オブジェクト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "IDR" => Currency::IDR,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// ルピアの金額を作成
    pub fn idr(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::IDR,
        }
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::IDR => "IDR".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }
}

/// 支払い方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// 現金払い
    Cash,
    /// 銀行振込
    Transfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method_str = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Transfer => "Transfer",
        };
        write!(f, "{}", method_str)
    }
}

impl PaymentMethod {
    /// 文字列からPaymentMethodを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "Transfer" => Ok(PaymentMethod::Transfer),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な支払い方法: {}",
                s
            ))),
        }
    }
}

/// 発注のステータス
/// キャンセルは行削除として表現されるため、終端ステータスは存在しない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// 保留中（作成直後、在庫予約済み）
    Pending,
    /// 承認済み（予約は維持されたまま）
    Approved,
    /// 納品完了（予約が実在庫の減算に変換済み）
    Delivered,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Approved => "Approved",
            OrderStatus::Delivered => "Delivered",
        };
        write!(f, "{}", status_str)
    }
}

impl OrderStatus {
    /// 文字列からOrderStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Approved" => Ok(OrderStatus::Approved),
            "Delivered" => Ok(OrderStatus::Delivered),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な発注ステータス: {}",
                s
            ))),
        }
    }
}

/// 発注明細を表す値オブジェクト
/// 単価は発注時点の原材料価格のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    material_id: MaterialId,
    quantity: u32,
    price_per_unit: Money,
}

impl OrderItem {
    /// 新しい発注明細を作成
    /// 数量は1以上である必要がある
    pub fn new(
        material_id: MaterialId,
        quantity: u32,
        price_per_unit: Money,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            material_id,
            quantity,
            price_per_unit,
        })
    }

    /// 原材料IDを取得
    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 単価を取得
    pub fn price_per_unit(&self) -> Money {
        self.price_per_unit
    }

    /// 小計を計算（単価 × 数量）
    pub fn subtotal(&self) -> Money {
        self.price_per_unit.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_creation() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2, "Each OrderId should be unique");
    }

    #[test]
    fn test_material_id_ordering_is_total() {
        let mut ids = vec![MaterialId::new(), MaterialId::new(), MaterialId::new()];
        ids.sort();
        assert!(ids[0] <= ids[1] && ids[1] <= ids[2]);
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::idr(10_000);
        let money2 = Money::idr(5_000);
        let result = money1.add(&money2).unwrap();
        assert_eq!(result.amount(), 15_000);
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::idr(100);
        let result = money.multiply(5);
        assert_eq!(result.amount(), 500);
    }

    #[test]
    fn test_money_unsupported_currency() {
        let result = Money::new(100, "USD".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_order_item_creation() {
        let material_id = MaterialId::new();
        let price = Money::idr(1000);
        let item = OrderItem::new(material_id, 2, price).unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.subtotal().amount(), 2000);
    }

    #[test]
    fn test_order_item_invalid_quantity() {
        let material_id = MaterialId::new();
        let price = Money::idr(1000);
        let result = OrderItem::new(material_id, 0, price);
        assert!(result.is_err());
    }

    #[test]
    fn test_payment_method_from_string() {
        assert_eq!(
            PaymentMethod::from_string("Cash").unwrap(),
            PaymentMethod::Cash
        );
        assert_eq!(
            PaymentMethod::from_string("Transfer").unwrap(),
            PaymentMethod::Transfer
        );
        assert!(PaymentMethod::from_string("Bitcoin").is_err());
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Approved,
            OrderStatus::Delivered,
        ] {
            let parsed = OrderStatus::from_string(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_status_invalid_string() {
        assert!(OrderStatus::from_string("Cancelled").is_err());
        assert!(OrderStatus::from_string("pending").is_err()); // 大文字小文字が違う
        assert!(OrderStatus::from_string("").is_err());
    }
}
