use crate::domain::model::{MaterialOrder, OrderItem, RawMaterial};
use crate::domain::service::ReservationDrift;
use serde::Serialize;

/// 発注一覧用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderSummaryResponse {
    pub order_id: String,
    pub outlet_id: String,
    pub status: String,
    pub total_amount: i64,
    pub total_currency: String,
    pub created_at: String,
}

/// 発注詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderDetailResponse {
    pub order_id: String,
    pub outlet_id: String,
    pub created_by: String,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: i64,
    pub total_currency: String,
    pub created_at: String,
    pub approved_at: Option<String>,
    pub delivered_at: Option<String>,
}

/// 発注明細用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderItemResponse {
    pub material_id: String,
    pub quantity: u32,
    pub price_per_unit_amount: i64,
    pub price_per_unit_currency: String,
    pub subtotal_amount: i64,
    pub subtotal_currency: String,
}

/// 原材料用のレスポンスDTO
#[derive(Serialize)]
pub struct RawMaterialResponse {
    pub material_id: String,
    pub name: String,
    pub unit: String,
    pub price_amount: i64,
    pub price_currency: String,
    pub stock: u32,
    pub reserved_stock: u32,
    pub available_stock: u32,
    pub is_active: bool,
}

/// 予約済み在庫ドリフト用のレスポンスDTO
#[derive(Serialize)]
pub struct ReservationDriftResponse {
    pub material_id: String,
    pub name: String,
    pub recorded: u32,
    pub derived: u32,
}

impl OrderSummaryResponse {
    /// ドメインオブジェクトからOrderSummaryResponseを作成
    pub fn from_order(order: &MaterialOrder) -> Self {
        let total = order.total_amount();
        Self {
            order_id: order.id().to_string(),
            outlet_id: order.outlet_id().to_string(),
            status: order.status().to_string(),
            total_amount: total.amount(),
            total_currency: total.currency(),
            created_at: order.created_at().to_rfc3339(),
        }
    }
}

impl OrderDetailResponse {
    /// ドメインオブジェクトからOrderDetailResponseを作成
    pub fn from_order(order: &MaterialOrder) -> Self {
        let items: Vec<OrderItemResponse> = order
            .items()
            .iter()
            .map(OrderItemResponse::from_order_item)
            .collect();

        let total = order.total_amount();

        Self {
            order_id: order.id().to_string(),
            outlet_id: order.outlet_id().to_string(),
            created_by: order.created_by().to_string(),
            status: order.status().to_string(),
            payment_method: order.payment_method().to_string(),
            notes: order.notes().map(|s| s.to_string()),
            items,
            total_amount: total.amount(),
            total_currency: total.currency(),
            created_at: order.created_at().to_rfc3339(),
            approved_at: order.approved_at().map(|t| t.to_rfc3339()),
            delivered_at: order.delivered_at().map(|t| t.to_rfc3339()),
        }
    }
}

impl OrderItemResponse {
    /// ドメインオブジェクトからOrderItemResponseを作成
    pub fn from_order_item(item: &OrderItem) -> Self {
        let price_per_unit = item.price_per_unit();
        let subtotal = item.subtotal();

        Self {
            material_id: item.material_id().to_string(),
            quantity: item.quantity(),
            price_per_unit_amount: price_per_unit.amount(),
            price_per_unit_currency: price_per_unit.currency(),
            subtotal_amount: subtotal.amount(),
            subtotal_currency: subtotal.currency(),
        }
    }
}

impl RawMaterialResponse {
    /// ドメインオブジェクトからRawMaterialResponseを作成
    pub fn from_material(material: &RawMaterial) -> Self {
        Self {
            material_id: material.id().to_string(),
            name: material.name().to_string(),
            unit: material.unit().to_string(),
            price_amount: material.price().amount(),
            price_currency: material.price().currency(),
            stock: material.stock(),
            reserved_stock: material.reserved_stock(),
            available_stock: material.available_stock(),
            is_active: material.is_active(),
        }
    }
}

impl ReservationDriftResponse {
    /// ドメインオブジェクトからReservationDriftResponseを作成
    pub fn from_drift(drift: &ReservationDrift) -> Self {
        Self {
            material_id: drift.material_id.to_string(),
            name: drift.name.clone(),
            recorded: drift.recorded,
            derived: drift.derived,
        }
    }
}
