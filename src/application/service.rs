pub mod material_order_query_service;
pub mod raw_material_query_service;

use crate::application::ApplicationError;
use crate::domain::model::{
    MaterialId, MaterialOrder, Money, OrderId, OrderStatus, OutletId, PaymentMethod, RawMaterial,
    StaffId,
};
use crate::domain::port::{MaterialOrderRepository, RawMaterialRepository};
use crate::domain::service::{OrderItemRequest, ReservationCoordinator, ReservationDrift};
use std::sync::Arc;

/// 発注アプリケーションサービス
/// 発注の作成・編集・ステータス遷移・キャンセルのユースケースを提供する
/// 在庫予約を伴う書き込みはすべてReservationCoordinator経由で行う
pub struct MaterialOrderApplicationService {
    order_repository: Arc<dyn MaterialOrderRepository>,
    coordinator: Arc<ReservationCoordinator>,
}

impl MaterialOrderApplicationService {
    /// 新しい発注アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `order_repository` - 発注リポジトリ（ID生成と読み取りに使用）
    /// * `coordinator` - 予約コーディネーター
    pub fn new(
        order_repository: Arc<dyn MaterialOrderRepository>,
        coordinator: Arc<ReservationCoordinator>,
    ) -> Self {
        Self {
            order_repository,
            coordinator,
        }
    }

    /// 新しい発注を作成し、在庫を予約する
    ///
    /// # Arguments
    /// * `outlet_id` - 発注元店舗ID
    /// * `created_by` - 発注者ID
    /// * `payment_method` - 支払い方法
    /// * `notes` - 備考（任意）
    /// * `requests` - 発注明細のリクエスト
    ///
    /// # Returns
    /// * `Ok(MaterialOrder)` - 作成された発注
    /// * `Err(ApplicationError)` - 作成失敗
    pub async fn create_order(
        &self,
        outlet_id: OutletId,
        created_by: StaffId,
        payment_method: PaymentMethod,
        notes: Option<String>,
        requests: Vec<OrderItemRequest>,
    ) -> Result<MaterialOrder, ApplicationError> {
        let order_id = self.order_repository.next_identity();
        let order = self
            .coordinator
            .create_order(
                order_id,
                outlet_id,
                created_by,
                payment_method,
                notes,
                requests,
            )
            .await?;
        Ok(order)
    }

    /// Pending状態の発注を編集する
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
    ) -> Result<MaterialOrder, ApplicationError> {
        let order = self
            .coordinator
            .update_order(order_id, payment_method, notes, requests)
            .await?;
        Ok(order)
    }

    /// 発注を承認する（Pending→Approved）
    /// 在庫予約は維持される
    pub async fn approve_order(&self, order_id: OrderId) -> Result<MaterialOrder, ApplicationError> {
        let order = self
            .coordinator
            .update_status(order_id, OrderStatus::Approved)
            .await?;
        Ok(order)
    }

    /// 発注を納品完了にする（Approved→Delivered）
    /// 予約が実在庫の減算に変換される
    pub async fn deliver_order(&self, order_id: OrderId) -> Result<MaterialOrder, ApplicationError> {
        let order = self
            .coordinator
            .update_status(order_id, OrderStatus::Delivered)
            .await?;
        Ok(order)
    }

    /// Pending状態の発注をキャンセルする
    /// 予約を解放し、発注を削除する
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<(), ApplicationError> {
        self.coordinator.cancel_order(order_id).await?;
        Ok(())
    }
}

/// 原材料アプリケーションサービス
/// 原材料マスタの管理と在庫の手動調整のユースケースを提供する
pub struct RawMaterialApplicationService {
    material_repository: Arc<dyn RawMaterialRepository>,
    coordinator: Arc<ReservationCoordinator>,
}

impl RawMaterialApplicationService {
    /// 新しい原材料アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `material_repository` - 原材料リポジトリ
    /// * `coordinator` - 予約コーディネーター（整合性修復に使用）
    pub fn new(
        material_repository: Arc<dyn RawMaterialRepository>,
        coordinator: Arc<ReservationCoordinator>,
    ) -> Self {
        Self {
            material_repository,
            coordinator,
        }
    }

    /// 新しい原材料を登録する
    ///
    /// # Arguments
    /// * `name` - 原材料名
    /// * `unit` - 表示単位
    /// * `price` - 単価
    /// * `stock` - 初期在庫数
    ///
    /// # Returns
    /// * `Ok(RawMaterial)` - 登録された原材料
    /// * `Err(ApplicationError)` - 登録失敗
    pub async fn create_material(
        &self,
        name: String,
        unit: String,
        price: Money,
        stock: u32,
    ) -> Result<RawMaterial, ApplicationError> {
        let material_id = self.material_repository.next_identity();
        let material = RawMaterial::new(material_id, name, unit, price, stock);
        self.material_repository.save(&material).await?;
        Ok(material)
    }

    /// 実在庫を手動調整する（棚卸しなど）
    /// 予約済み在庫には影響しない
    ///
    /// # Arguments
    /// * `material_id` - 原材料ID
    /// * `new_stock` - 新しい実在庫数
    pub async fn adjust_stock(
        &self,
        material_id: MaterialId,
        new_stock: u32,
    ) -> Result<RawMaterial, ApplicationError> {
        let mut material = self
            .material_repository
            .find_by_id(material_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("原材料が見つかりません: {}", material_id))
            })?;
        material.adjust_stock(new_stock);
        self.material_repository.save(&material).await?;
        Ok(material)
    }

    /// 原材料を発注停止にする
    /// 既存の発注とその予約には影響しない
    pub async fn deactivate_material(
        &self,
        material_id: MaterialId,
    ) -> Result<RawMaterial, ApplicationError> {
        let mut material = self
            .material_repository
            .find_by_id(material_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("原材料が見つかりません: {}", material_id))
            })?;
        material.deactivate();
        self.material_repository.save(&material).await?;
        Ok(material)
    }

    /// 原材料の発注を再開する
    pub async fn activate_material(
        &self,
        material_id: MaterialId,
    ) -> Result<RawMaterial, ApplicationError> {
        let mut material = self
            .material_repository
            .find_by_id(material_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("原材料が見つかりません: {}", material_id))
            })?;
        material.activate();
        self.material_repository.save(&material).await?;
        Ok(material)
    }

    /// 予約済み在庫を発注明細から再計算し、ドリフトを修復する
    ///
    /// # Returns
    /// * `Ok(Vec<ReservationDrift>)` - 検出・修復されたドリフトのリスト
    pub async fn reconcile_reserved_stock(
        &self,
    ) -> Result<Vec<ReservationDrift>, ApplicationError> {
        let drifts = self.coordinator.reconcile_reserved_stock().await?;
        Ok(drifts)
    }
}
