use crate::domain::error::DomainError;
use crate::domain::model::{
    Money, OrderId, OrderItem, OrderStatus, OutletId, PaymentMethod, StaffId,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::domain::model::MaterialId;

/// 原材料発注集約
/// 発注のライフサイクルを管理し、ステータス遷移のビジネスルールを適用する
/// 明細は集約に排他的に所有され、作成・編集時に一括で差し替えられる
#[derive(Debug, Clone)]
pub struct MaterialOrder {
    id: OrderId,
    outlet_id: OutletId,
    created_by: StaffId,
    status: OrderStatus,
    payment_method: PaymentMethod,
    notes: Option<String>,
    items: Vec<OrderItem>,
    created_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}

impl MaterialOrder {
    /// 新しい発注を作成
    /// 初期ステータスはPending
    /// 明細は1件以上である必要がある
    ///
    /// # Arguments
    /// * `id` - 発注ID
    /// * `outlet_id` - 発注元店舗ID
    /// * `created_by` - 発注者ID
    /// * `payment_method` - 支払い方法
    /// * `notes` - 備考（任意）
    /// * `items` - 発注明細
    pub fn new(
        id: OrderId,
        outlet_id: OutletId,
        created_by: StaffId,
        payment_method: PaymentMethod,
        notes: Option<String>,
        items: Vec<OrderItem>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::OrderValidation(
                "発注明細が空です。少なくとも1つの原材料を追加してください".to_string(),
            ));
        }

        Ok(Self {
            id,
            outlet_id,
            created_by,
            status: OrderStatus::Pending,
            payment_method,
            notes,
            items,
            created_at: Utc::now(),
            approved_at: None,
            delivered_at: None,
        })
    }

    /// データベースから取得したデータで発注を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: OrderId,
        outlet_id: OutletId,
        created_by: StaffId,
        status: OrderStatus,
        payment_method: PaymentMethod,
        notes: Option<String>,
        items: Vec<OrderItem>,
        created_at: DateTime<Utc>,
        approved_at: Option<DateTime<Utc>>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            outlet_id,
            created_by,
            status,
            payment_method,
            notes,
            items,
            created_at,
            approved_at,
            delivered_at,
        }
    }

    /// 発注IDを取得
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// 店舗IDを取得
    pub fn outlet_id(&self) -> OutletId {
        self.outlet_id
    }

    /// 発注者IDを取得
    pub fn created_by(&self) -> StaffId {
        self.created_by
    }

    /// ステータスを取得
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// 支払い方法を取得
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// 備考を取得
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// 発注明細のリストを取得
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// 作成日時を取得
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 承認日時を取得
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// 納品日時を取得
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// 合計金額を計算（全明細の小計の合算）
    /// 導出値として計算するため「合計 = 明細小計の和」の不変条件は構築上常に成立する
    pub fn total_amount(&self) -> Money {
        self.items
            .iter()
            .map(|item| item.subtotal())
            .fold(Money::idr(0), |acc, amount| acc.add(&amount).unwrap_or(acc))
    }

    /// 原材料ごとの数量を集計する
    /// 同一原材料の明細が複数ある場合は合算される（編集時のデルタ計算の基礎）
    pub fn quantities_by_material(&self) -> BTreeMap<MaterialId, u32> {
        let mut quantities = BTreeMap::new();
        for item in &self.items {
            *quantities.entry(item.material_id()).or_insert(0) += item.quantity();
        }
        quantities
    }

    /// ステータス遷移の唯一の入口
    /// 合法な遷移は Pending→Approved と Approved→Delivered のみで、
    /// それ以外はすべてInvalidOrderStateとして拒否する
    ///
    /// # Arguments
    /// * `target` - 遷移先ステータス
    /// * `now` - タイムスタンプに使用する現在時刻
    pub fn transition_to(
        &mut self,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        match (self.status, target) {
            (OrderStatus::Pending, OrderStatus::Approved) => {
                self.status = OrderStatus::Approved;
                self.approved_at = Some(now);
                Ok(())
            }
            (OrderStatus::Approved, OrderStatus::Delivered) => {
                self.status = OrderStatus::Delivered;
                self.delivered_at = Some(now);
                Ok(())
            }
            (from, to) => Err(DomainError::InvalidOrderState(format!(
                "{}から{}への遷移はできません",
                from, to
            ))),
        }
    }

    /// 編集可能であることを確認する
    /// 編集できるのはPending状態のみ
    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::InvalidOrderState(
                "発注を編集できるのはPending状態のみです".to_string(),
            ));
        }
        Ok(())
    }

    /// キャンセル可能であることを確認する
    /// キャンセルできるのはPending状態のみ
    pub fn ensure_cancellable(&self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::InvalidOrderState(
                "発注をキャンセルできるのはPending状態のみです".to_string(),
            ));
        }
        Ok(())
    }

    /// 明細・支払い方法・備考を一括で差し替える（編集）
    /// 旧明細の削除と新明細の挿入として実装される
    /// 事前条件: ステータスがPending、新明細が1件以上
    pub fn replace_items(
        &mut self,
        payment_method: PaymentMethod,
        notes: Option<String>,
        items: Vec<OrderItem>,
    ) -> Result<(), DomainError> {
        self.ensure_editable()?;

        if items.is_empty() {
            return Err(DomainError::OrderValidation(
                "発注明細が空です。少なくとも1つの原材料を追加してください".to_string(),
            ));
        }

        self.payment_method = payment_method;
        self.notes = notes;
        self.items = items;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_item(quantity: u32) -> Vec<OrderItem> {
        vec![OrderItem::new(MaterialId::new(), quantity, Money::idr(1000)).unwrap()]
    }

    fn pending_order() -> MaterialOrder {
        MaterialOrder::new(
            OrderId::new(),
            OutletId::new(),
            StaffId::new(),
            PaymentMethod::Cash,
            None,
            one_item(2),
        )
        .unwrap()
    }

    #[test]
    fn test_new_order_has_pending_status() {
        let order = pending_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.approved_at().is_none());
        assert!(order.delivered_at().is_none());
    }

    #[test]
    fn test_new_order_without_items_fails() {
        let result = MaterialOrder::new(
            OrderId::new(),
            OutletId::new(),
            StaffId::new(),
            PaymentMethod::Cash,
            None,
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_total_amount_is_sum_of_subtotals() {
        let items = vec![
            OrderItem::new(MaterialId::new(), 3, Money::idr(1000)).unwrap(),
            OrderItem::new(MaterialId::new(), 2, Money::idr(2500)).unwrap(),
        ];
        let order = MaterialOrder::new(
            OrderId::new(),
            OutletId::new(),
            StaffId::new(),
            PaymentMethod::Transfer,
            Some("毎週の定期発注".to_string()),
            items,
        )
        .unwrap();
        assert_eq!(order.total_amount().amount(), 3000 + 5000);
    }

    #[test]
    fn test_quantities_by_material_merges_duplicate_lines() {
        let material_id = MaterialId::new();
        let items = vec![
            OrderItem::new(material_id, 3, Money::idr(1000)).unwrap(),
            OrderItem::new(material_id, 4, Money::idr(1000)).unwrap(),
        ];
        let order = MaterialOrder::new(
            OrderId::new(),
            OutletId::new(),
            StaffId::new(),
            PaymentMethod::Cash,
            None,
            items,
        )
        .unwrap();
        let quantities = order.quantities_by_material();
        assert_eq!(quantities.len(), 1);
        assert_eq!(quantities[&material_id], 7);
    }

    #[test]
    fn test_approve_pending_order() {
        let mut order = pending_order();
        let now = Utc::now();
        order.transition_to(OrderStatus::Approved, now).unwrap();
        assert_eq!(order.status(), OrderStatus::Approved);
        assert_eq!(order.approved_at(), Some(now));
        assert!(order.delivered_at().is_none());
    }

    #[test]
    fn test_deliver_approved_order() {
        let mut order = pending_order();
        order.transition_to(OrderStatus::Approved, Utc::now()).unwrap();
        let now = Utc::now();
        order.transition_to(OrderStatus::Delivered, now).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.delivered_at(), Some(now));
    }

    #[test]
    fn test_deliver_pending_order_fails() {
        let mut order = pending_order();
        let result = order.transition_to(OrderStatus::Delivered, Utc::now());
        assert!(result.is_err());
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_approve_approved_order_fails() {
        let mut order = pending_order();
        order.transition_to(OrderStatus::Approved, Utc::now()).unwrap();
        let result = order.transition_to(OrderStatus::Approved, Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn test_no_transition_out_of_delivered() {
        let mut order = pending_order();
        order.transition_to(OrderStatus::Approved, Utc::now()).unwrap();
        order.transition_to(OrderStatus::Delivered, Utc::now()).unwrap();
        assert!(order
            .transition_to(OrderStatus::Approved, Utc::now())
            .is_err());
        assert!(order
            .transition_to(OrderStatus::Pending, Utc::now())
            .is_err());
    }

    #[test]
    fn test_replace_items_on_pending_order() {
        let mut order = pending_order();
        let new_items = vec![OrderItem::new(MaterialId::new(), 5, Money::idr(800)).unwrap()];
        order
            .replace_items(PaymentMethod::Transfer, Some("変更".to_string()), new_items)
            .unwrap();
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].quantity(), 5);
        assert_eq!(order.payment_method(), PaymentMethod::Transfer);
        assert_eq!(order.total_amount().amount(), 4000);
    }

    #[test]
    fn test_replace_items_on_approved_order_fails() {
        let mut order = pending_order();
        order.transition_to(OrderStatus::Approved, Utc::now()).unwrap();
        let result = order.replace_items(PaymentMethod::Cash, None, one_item(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_items_with_empty_list_fails() {
        let mut order = pending_order();
        let result = order.replace_items(PaymentMethod::Cash, None, Vec::new());
        assert!(result.is_err());
        // 元の明細は変わらない
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_ensure_cancellable_only_for_pending() {
        let mut order = pending_order();
        assert!(order.ensure_cancellable().is_ok());
        order.transition_to(OrderStatus::Approved, Utc::now()).unwrap();
        assert!(order.ensure_cancellable().is_err());
    }
}
