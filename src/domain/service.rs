// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

use crate::domain::error::{DomainError, StockShortage};
use crate::domain::model::{
    MaterialId, MaterialOrder, OrderId, OrderItem, OrderStatus, OutletId, PaymentMethod, StaffId,
};
use crate::domain::port::{ReservationTransaction, ReservationUnitOfWork};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// 発注明細のリクエスト（原材料IDと数量のペア）
#[derive(Debug, Clone, Copy)]
pub struct OrderItemRequest {
    pub material_id: MaterialId,
    pub quantity: u32,
}

/// 予約済み在庫のドリフト
/// 記録値と発注明細から導出した値の食い違いを表す
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDrift {
    pub material_id: MaterialId,
    pub name: String,
    pub recorded: u32,
    pub derived: u32,
}

/// 予約コーディネーター
/// 発注のライフサイクルと在庫予約カウンタを単一トランザクション内で
/// 整合的に更新する。在庫チェックと予約更新の間に他の発注が割り込めないよう、
/// 対象の原材料行をID昇順の排他ロックで確保してから検証・更新を行う
pub struct ReservationCoordinator {
    uow: Arc<dyn ReservationUnitOfWork>,
}

impl ReservationCoordinator {
    /// 新しい予約コーディネーターを作成
    ///
    /// # Arguments
    /// * `uow` - 予約ユニットオブワーク
    pub fn new(uow: Arc<dyn ReservationUnitOfWork>) -> Self {
        Self { uow }
    }

    /// 発注を作成し、全明細分の在庫を予約する
    /// いずれかの原材料で利用可能在庫が不足する場合、不足している全原材料を
    /// 列挙したエラーを返し、一切の変更を行わない
    ///
    /// # Arguments
    /// * `order_id` - 新しい発注ID
    /// * `outlet_id` - 発注元店舗ID
    /// * `created_by` - 発注者ID
    /// * `payment_method` - 支払い方法
    /// * `notes` - 備考（任意）
    /// * `requests` - 発注明細のリクエスト
    ///
    /// # Returns
    /// * `Ok(MaterialOrder)` - 作成された発注（Pending、在庫予約済み）
    /// * `Err(DomainError)` - 作成失敗（在庫不足、発注停止中など）
    pub async fn create_order(
        &self,
        order_id: OrderId,
        outlet_id: OutletId,
        created_by: StaffId,
        payment_method: PaymentMethod,
        notes: Option<String>,
        requests: Vec<OrderItemRequest>,
    ) -> Result<MaterialOrder, DomainError> {
        let merged = Self::merge_requests(&requests)?;

        let mut tx = self.uow.begin().await?;
        match Self::create_order_in_tx(
            tx.as_mut(),
            order_id,
            outlet_id,
            created_by,
            payment_method,
            notes,
            merged,
        )
        .await
        {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    /// Pending状態の発注の明細・支払い方法・備考を差し替える
    /// 在庫予約は新旧明細の差分のみ検証・更新する。数量の増加分は
    /// 利用可能在庫に対してチェックされ、減少分は予約を解放する
    ///
    /// # Arguments
    /// * `order_id` - 編集する発注ID
    /// * `payment_method` - 新しい支払い方法
    /// * `notes` - 新しい備考
    /// * `requests` - 新しい発注明細のリクエスト
    pub async fn update_order(
        &self,
        order_id: OrderId,
        payment_method: PaymentMethod,
        notes: Option<String>,
        requests: Vec<OrderItemRequest>,
    ) -> Result<MaterialOrder, DomainError> {
        let merged = Self::merge_requests(&requests)?;

        let mut tx = self.uow.begin().await?;
        match Self::update_order_in_tx(tx.as_mut(), order_id, payment_method, notes, merged).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    /// 発注のステータスを遷移させる
    /// Pending→Approvedでは在庫は変化しない（予約は維持される）
    /// Approved→Deliveredでは予約が実在庫の減算に変換される
    ///
    /// # Arguments
    /// * `order_id` - 対象の発注ID
    /// * `target` - 遷移先ステータス
    pub async fn update_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<MaterialOrder, DomainError> {
        let mut tx = self.uow.begin().await?;
        match Self::update_status_in_tx(tx.as_mut(), order_id, target).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    /// Pending状態の発注をキャンセルする
    /// 全明細分の予約を解放し、発注を削除する
    ///
    /// # Arguments
    /// * `order_id` - キャンセルする発注ID
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<(), DomainError> {
        let mut tx = self.uow.begin().await?;
        match Self::cancel_order_in_tx(tx.as_mut(), order_id).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    /// 予約済み在庫をPendingとApprovedの発注明細から再計算し、
    /// 記録値とのドリフトを修復する
    ///
    /// # Returns
    /// * `Ok(Vec<ReservationDrift>)` - 検出・修復されたドリフトのリスト
    pub async fn reconcile_reserved_stock(&self) -> Result<Vec<ReservationDrift>, DomainError> {
        let mut tx = self.uow.begin().await?;
        match Self::reconcile_in_tx(tx.as_mut()).await {
            Ok(drifts) => {
                tx.commit().await?;
                Ok(drifts)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    /// 明細リクエストを原材料ごとに集約する
    /// 同一原材料の重複明細は数量を合算して1件にまとめる
    fn merge_requests(
        requests: &[OrderItemRequest],
    ) -> Result<BTreeMap<MaterialId, u32>, DomainError> {
        if requests.is_empty() {
            return Err(DomainError::OrderValidation(
                "発注明細が空です。少なくとも1つの原材料を追加してください".to_string(),
            ));
        }
        let mut merged = BTreeMap::new();
        for request in requests {
            if request.quantity == 0 {
                return Err(DomainError::InvalidQuantity);
            }
            let total = merged.entry(request.material_id).or_insert(0u32);
            // 重複明細の合算がu32を超える要求は数量として無効
            *total = total
                .checked_add(request.quantity)
                .ok_or(DomainError::InvalidQuantity)?;
        }
        Ok(merged)
    }

    async fn create_order_in_tx(
        tx: &mut dyn ReservationTransaction,
        order_id: OrderId,
        outlet_id: OutletId,
        created_by: StaffId,
        payment_method: PaymentMethod,
        notes: Option<String>,
        merged: BTreeMap<MaterialId, u32>,
    ) -> Result<MaterialOrder, DomainError> {
        // 原材料行をID昇順でロック（デッドロック回避のため順序を固定する）
        let mut materials = Vec::with_capacity(merged.len());
        for (&material_id, &quantity) in &merged {
            let material = tx
                .lock_material(material_id)
                .await?
                .ok_or_else(|| DomainError::MaterialNotFound(material_id.to_string()))?;
            if !material.is_active() {
                return Err(DomainError::InactiveMaterial(material.name().to_string()));
            }
            materials.push((material, quantity));
        }

        // 全明細を検証してから予約する。不足はまとめて報告する
        let mut shortages = Vec::new();
        for (material, quantity) in &materials {
            if !material.can_reserve(*quantity) {
                shortages.push(StockShortage {
                    material_id: material.id(),
                    name: material.name().to_string(),
                    requested: *quantity,
                    available: material.available_stock(),
                });
            }
        }
        if !shortages.is_empty() {
            return Err(DomainError::InsufficientStock(shortages));
        }

        // 単価は発注時点の価格をスナップショットする
        let mut items = Vec::with_capacity(materials.len());
        for (material, quantity) in &mut materials {
            items.push(OrderItem::new(material.id(), *quantity, material.price())?);
            material.reserve(*quantity);
            tx.save_material_counters(material).await?;
        }

        let order = MaterialOrder::new(
            order_id,
            outlet_id,
            created_by,
            payment_method,
            notes,
            items,
        )?;
        tx.insert_order(&order).await?;
        Ok(order)
    }

    async fn update_order_in_tx(
        tx: &mut dyn ReservationTransaction,
        order_id: OrderId,
        payment_method: PaymentMethod,
        notes: Option<String>,
        merged: BTreeMap<MaterialId, u32>,
    ) -> Result<MaterialOrder, DomainError> {
        let mut order = tx
            .find_order(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.to_string()))?;
        order.ensure_editable()?;

        let old_quantities = order.quantities_by_material();

        // 旧明細と新明細の和集合をID昇順でロック
        let mut affected: BTreeSet<MaterialId> = old_quantities.keys().copied().collect();
        affected.extend(merged.keys().copied());

        let mut materials = BTreeMap::new();
        for &material_id in &affected {
            let material = tx
                .lock_material(material_id)
                .await?
                .ok_or_else(|| DomainError::MaterialNotFound(material_id.to_string()))?;
            materials.insert(material_id, material);
        }

        // 増加分のみを利用可能在庫に対して検証する（既存予約分は確保済みのため）
        let mut shortages = Vec::new();
        for (&material_id, material) in &materials {
            let old_qty = old_quantities.get(&material_id).copied().unwrap_or(0);
            let new_qty = merged.get(&material_id).copied().unwrap_or(0);
            if new_qty <= old_qty {
                continue;
            }
            if old_qty == 0 && !material.is_active() {
                return Err(DomainError::InactiveMaterial(material.name().to_string()));
            }
            if !material.can_reserve(new_qty - old_qty) {
                shortages.push(StockShortage {
                    material_id,
                    name: material.name().to_string(),
                    requested: new_qty,
                    // この発注で確保しうる総量（既存予約分 + 現在の利用可能分）
                    available: material.available_stock() + old_qty,
                });
            }
        }
        if !shortages.is_empty() {
            return Err(DomainError::InsufficientStock(shortages));
        }

        // 差分を適用し、新しい明細を単価の再スナップショット付きで構築する
        let mut items = Vec::with_capacity(merged.len());
        for (&material_id, material) in materials.iter_mut() {
            let old_qty = old_quantities.get(&material_id).copied().unwrap_or(0);
            let new_qty = merged.get(&material_id).copied().unwrap_or(0);
            if new_qty > 0 {
                items.push(OrderItem::new(material_id, new_qty, material.price())?);
            }
            if new_qty > old_qty {
                material.reserve(new_qty - old_qty);
            } else if old_qty > new_qty {
                let shortfall = material.release(old_qty - new_qty);
                if shortfall > 0 {
                    tracing::warn!(
                        material_id = %material_id,
                        shortfall,
                        "予約解放が予約済み在庫を超過しました。予約会計にドリフトがあります"
                    );
                }
            } else {
                continue;
            }
            tx.save_material_counters(material).await?;
        }

        order.replace_items(payment_method, notes, items)?;
        tx.update_order(&order).await?;
        Ok(order)
    }

    async fn update_status_in_tx(
        tx: &mut dyn ReservationTransaction,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<MaterialOrder, DomainError> {
        let mut order = tx
            .find_order(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.to_string()))?;
        order.transition_to(target, Utc::now())?;

        // 納品確定時のみ在庫が動く。予約を実在庫の減算に変換する
        if target == OrderStatus::Delivered {
            let quantities = order.quantities_by_material();
            for (&material_id, &quantity) in &quantities {
                let mut material = tx
                    .lock_material(material_id)
                    .await?
                    .ok_or_else(|| DomainError::MaterialNotFound(material_id.to_string()))?;
                material.commit_delivery(quantity)?;
                tx.save_material_counters(&material).await?;
            }
        }

        tx.update_order(&order).await?;
        Ok(order)
    }

    async fn cancel_order_in_tx(
        tx: &mut dyn ReservationTransaction,
        order_id: OrderId,
    ) -> Result<(), DomainError> {
        let order = tx
            .find_order(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.to_string()))?;
        order.ensure_cancellable()?;

        let quantities = order.quantities_by_material();
        for (&material_id, &quantity) in &quantities {
            match tx.lock_material(material_id).await? {
                Some(mut material) => {
                    let shortfall = material.release(quantity);
                    if shortfall > 0 {
                        tracing::warn!(
                            material_id = %material_id,
                            shortfall,
                            "予約解放が予約済み在庫を超過しました。予約会計にドリフトがあります"
                        );
                    }
                    tx.save_material_counters(&material).await?;
                }
                None => {
                    tracing::warn!(
                        material_id = %material_id,
                        "キャンセル対象の原材料が見つかりません。予約解放をスキップします"
                    );
                }
            }
        }

        tx.delete_order(order_id).await?;
        Ok(())
    }

    async fn reconcile_in_tx(
        tx: &mut dyn ReservationTransaction,
    ) -> Result<Vec<ReservationDrift>, DomainError> {
        let derived_quantities = tx.reserved_quantities_from_orders().await?;
        let material_ids = tx.all_material_ids().await?;

        let mut drifts = Vec::new();
        for material_id in material_ids {
            let mut material = match tx.lock_material(material_id).await? {
                Some(m) => m,
                None => continue,
            };
            let derived = derived_quantities.get(&material_id).copied().unwrap_or(0);
            if material.reserved_stock() != derived {
                tracing::warn!(
                    material_id = %material_id,
                    recorded = material.reserved_stock(),
                    derived,
                    "予約済み在庫のドリフトを検出し修復します"
                );
                drifts.push(ReservationDrift {
                    material_id,
                    name: material.name().to_string(),
                    recorded: material.reserved_stock(),
                    derived,
                });
                material.set_reserved_stock(derived);
                tx.save_material_counters(&material).await?;
            }
        }
        Ok(drifts)
    }
}
