use crate::domain::error::DomainError;
use crate::domain::model::{MaterialId, Money};

/// 原材料在庫集約
/// 実在庫（stock）と予約済み在庫（reserved_stock）を管理する
/// 不変条件: コミットされた遷移の後は常に 0 <= reserved_stock <= stock
#[derive(Debug, Clone, PartialEq)]
pub struct RawMaterial {
    id: MaterialId,
    name: String,
    unit: String,
    price: Money,
    stock: u32,
    reserved_stock: u32,
    is_active: bool,
}

impl RawMaterial {
    /// 新しい原材料を作成
    /// 予約済み在庫は0、発注可能な状態で開始する
    ///
    /// # Arguments
    /// * `id` - 原材料ID
    /// * `name` - 原材料名
    /// * `unit` - 表示単位（kg、リットルなど）
    /// * `price` - 単価
    /// * `stock` - 初期在庫数
    pub fn new(id: MaterialId, name: String, unit: String, price: Money, stock: u32) -> Self {
        Self {
            id,
            name,
            unit,
            price,
            stock,
            reserved_stock: 0,
            is_active: true,
        }
    }

    /// データベースから取得したデータで原材料を再構築
    /// リポジトリでの使用を想定
    pub fn reconstruct(
        id: MaterialId,
        name: String,
        unit: String,
        price: Money,
        stock: u32,
        reserved_stock: u32,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name,
            unit,
            price,
            stock,
            reserved_stock,
            is_active,
        }
    }

    /// 原材料IDを取得
    pub fn id(&self) -> MaterialId {
        self.id
    }

    /// 原材料名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 表示単位を取得
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// 単価を取得
    pub fn price(&self) -> Money {
        self.price
    }

    /// 実在庫数を取得
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// 予約済み在庫数を取得
    pub fn reserved_stock(&self) -> u32 {
        self.reserved_stock
    }

    /// 発注可能かどうかを取得
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// 利用可能在庫数を取得（実在庫 − 予約済み在庫）
    pub fn available_stock(&self) -> u32 {
        self.stock.saturating_sub(self.reserved_stock)
    }

    /// 指定された数量の在庫が予約可能かチェック
    pub fn can_reserve(&self, quantity: u32) -> bool {
        quantity <= self.available_stock()
    }

    /// 在庫を予約する
    /// 利用可能数量の検証は呼び出し側（ReservationCoordinator）の責務であり、
    /// このメソッド自体は境界チェックを行わない
    pub fn reserve(&mut self, quantity: u32) {
        self.reserved_stock += quantity;
    }

    /// 予約を解放する（キャンセル・編集時など）
    /// 予約済み在庫は0でクランプされ、クランプされた不足分を返す
    /// （0以外の戻り値は予約会計のドリフトを意味する）
    pub fn release(&mut self, quantity: u32) -> u32 {
        let shortfall = quantity.saturating_sub(self.reserved_stock);
        self.reserved_stock = self.reserved_stock.saturating_sub(quantity);
        shortfall
    }

    /// 納品を確定する（予約を実在庫の減算に変換）
    /// 実在庫が負になる場合は状態を変更せずに失敗する
    ///
    /// # Returns
    /// * `Ok(())` - 確定成功
    /// * `Err(DomainError::NegativeStock)` - 実在庫が不足している
    pub fn commit_delivery(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity > self.stock {
            return Err(DomainError::NegativeStock {
                name: self.name.clone(),
                stock: self.stock,
                requested: quantity,
            });
        }
        self.stock -= quantity;
        self.reserved_stock = self.reserved_stock.saturating_sub(quantity);
        Ok(())
    }

    /// 実在庫を手動調整する（棚卸しなど）
    /// 予約済み在庫には一切触れない独立した経路
    pub fn adjust_stock(&mut self, new_stock: u32) {
        self.stock = new_stock;
    }

    /// 予約済み在庫を直接設定する
    /// 整合性修復（reconcile）専用であり、通常の業務フローからは使用しない
    pub fn set_reserved_stock(&mut self, quantity: u32) {
        self.reserved_stock = quantity;
    }

    /// 発注を無効化する
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// 発注を有効化する
    pub fn activate(&mut self) {
        self.is_active = true;
    }
}
