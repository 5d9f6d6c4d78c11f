use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 発注明細用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct OrderItemRequestDto {
    pub material_id: Uuid,
    pub quantity: u32,
}

/// 発注作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub outlet_id: Uuid,
    pub created_by: Uuid,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRequestDto>,
}

/// 発注編集用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRequestDto>,
}

/// 原材料登録用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateMaterialRequest {
    pub name: String,
    pub unit: String,
    pub price_amount: i64,
    pub price_currency: String,
    pub stock: u32,
}

/// 在庫調整用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AdjustStockRequest {
    pub stock: u32,
}

/// 発注一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct OrdersQueryParams {
    pub status: Option<String>,
}

/// 原材料一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct MaterialQueryParams {
    pub max_available: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_serialization() {
        let request = CreateOrderRequest {
            outlet_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            payment_method: "Cash".to_string(),
            notes: Some("毎週の定期発注".to_string()),
            items: vec![OrderItemRequestDto {
                material_id: Uuid::new_v4(),
                quantity: 10,
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        let _deserialized: CreateOrderRequest = serde_json::from_str(&json).unwrap();

        // シリアライゼーション/デシリアライゼーションが成功することを確認
        assert!(json.contains("outlet_id"));
        assert!(json.contains("payment_method"));
        assert!(json.contains("items"));
    }

    #[test]
    fn test_create_order_request_without_notes() {
        let request = CreateOrderRequest {
            outlet_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            payment_method: "Transfer".to_string(),
            notes: None,
            items: Vec::new(),
        };

        let json = serde_json::to_string(&request).unwrap();
        let _deserialized: CreateOrderRequest = serde_json::from_str(&json).unwrap();

        // notesがnullでシリアライズされることを確認
        assert!(json.contains("null"));
    }

    #[test]
    fn test_update_order_request_serialization() {
        let request = UpdateOrderRequest {
            payment_method: "Cash".to_string(),
            notes: None,
            items: vec![OrderItemRequestDto {
                material_id: Uuid::new_v4(),
                quantity: 5,
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        let deserialized: UpdateOrderRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.items.len(), 1);
        assert_eq!(deserialized.items[0].quantity, 5);
    }

    #[test]
    fn test_create_material_request_serialization() {
        let request = CreateMaterialRequest {
            name: "小麦粉".to_string(),
            unit: "kg".to_string(),
            price_amount: 12_000,
            price_currency: "IDR".to_string(),
            stock: 100,
        };

        let json = serde_json::to_string(&request).unwrap();
        let _deserialized: CreateMaterialRequest = serde_json::from_str(&json).unwrap();

        // 必要なフィールドがシリアライズされることを確認
        assert!(json.contains("name"));
        assert!(json.contains("price_amount"));
        assert!(json.contains("stock"));
    }

    #[test]
    fn test_query_params_deserialization() {
        // OrdersQueryParams のテスト
        let params = OrdersQueryParams {
            status: Some("Pending".to_string()),
        };
        assert_eq!(params.status, Some("Pending".to_string()));

        let params = OrdersQueryParams { status: None };
        assert_eq!(params.status, None);

        // MaterialQueryParams のテスト
        let params = MaterialQueryParams {
            max_available: Some(10),
        };
        assert_eq!(params.max_available, Some(10));

        let params = MaterialQueryParams {
            max_available: None,
        };
        assert_eq!(params.max_available, None);
    }
}
