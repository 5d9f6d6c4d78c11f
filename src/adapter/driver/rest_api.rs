use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use uuid::Uuid;

use crate::adapter::driver::request_dto::{
    AdjustStockRequest, CreateMaterialRequest, CreateOrderRequest, MaterialQueryParams,
    OrderItemRequestDto, OrdersQueryParams, UpdateOrderRequest,
};
use crate::adapter::driver::response_dto::{
    OrderDetailResponse, OrderSummaryResponse, RawMaterialResponse, ReservationDriftResponse,
};
use crate::application::service::material_order_query_service::MaterialOrderQueryService;
use crate::application::service::raw_material_query_service::RawMaterialQueryService;
use crate::application::service::{MaterialOrderApplicationService, RawMaterialApplicationService};
use crate::application::ApplicationError;
use crate::domain::model::{
    MaterialId, Money, OrderId, OrderStatus, OutletId, PaymentMethod, StaffId,
};
use crate::domain::service::OrderItemRequest;

// REST API用のエラーDTO
#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

// アプリケーションサービスを含む状態
pub type AppState = AppStateInner;

#[derive(Clone)]
pub struct AppStateInner {
    pub order_service: Arc<MaterialOrderApplicationService>,
    pub material_service: Arc<RawMaterialApplicationService>,
    pub order_query_service: Arc<MaterialOrderQueryService>,
    pub material_query_service: Arc<RawMaterialQueryService>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/material-orders", post(create_order))
        .route("/material-orders", get(get_orders))
        .route("/material-orders/:order_id", get(get_order_by_id))
        .route("/material-orders/:order_id", put(update_order))
        .route("/material-orders/:order_id/approve", post(approve_order))
        .route("/material-orders/:order_id/deliver", post(deliver_order))
        .route("/material-orders/:order_id/cancel", post(cancel_order))
        .route("/raw-materials", post(create_material))
        .route("/raw-materials", get(get_materials))
        .route("/raw-materials/reconcile", post(reconcile_reserved_stock))
        .route("/raw-materials/:material_id", get(get_material_by_id))
        .route("/raw-materials/:material_id/stock", put(adjust_stock))
        .route(
            "/raw-materials/:material_id/deactivate",
            post(deactivate_material),
        )
        .route(
            "/raw-materials/:material_id/activate",
            post(activate_material),
        )
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "material-order-management",
        "version": "0.1.0"
    }))
}

/// リクエストDTOの明細リストをドメインのリクエストに変換
fn to_item_requests(items: &[OrderItemRequestDto]) -> Vec<OrderItemRequest> {
    items
        .iter()
        .map(|item| OrderItemRequest {
            material_id: MaterialId::from_uuid(item.material_id),
            quantity: item.quantity,
        })
        .collect()
}

// 発注作成エンドポイント
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetailResponse>), (StatusCode, Json<ApiError>)> {
    let payment_method = PaymentMethod::from_string(&request.payment_method)
        .map_err(|err| map_domain_error(err))?;
    let items = to_item_requests(&request.items);

    match state
        .order_service
        .create_order(
            OutletId::from_uuid(request.outlet_id),
            StaffId::from_uuid(request.created_by),
            payment_method,
            request.notes,
            items,
        )
        .await
    {
        Ok(order) => Ok((
            StatusCode::CREATED,
            Json(OrderDetailResponse::from_order(&order)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 発注編集エンドポイント
async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);
    let payment_method = PaymentMethod::from_string(&request.payment_method)
        .map_err(|err| map_domain_error(err))?;
    let items = to_item_requests(&request.items);

    match state
        .order_service
        .update_order(order_id, payment_method, request.notes, items)
        .await
    {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 発注承認エンドポイント
async fn approve_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state.order_service.approve_order(order_id).await {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 発注納品エンドポイント
async fn deliver_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state.order_service.deliver_order(order_id).await {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 発注キャンセルエンドポイント
async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state.order_service.cancel_order(order_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(map_application_error(err)),
    }
}

// 発注一覧取得エンドポイント
async fn get_orders(
    State(state): State<AppState>,
    query: Result<Query<OrdersQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<OrderSummaryResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;
    let orders = if let Some(status_str) = params.status {
        // ステータスでフィルタリング
        let status = match OrderStatus::from_string(&status_str) {
            Ok(status) => status,
            Err(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiError {
                        error: format!("無効なステータス値: {}", status_str),
                        code: "INVALID_STATUS".to_string(),
                    }),
                ))
            }
        };

        match state.order_query_service.get_orders_by_status(status).await {
            Ok(orders) => orders,
            Err(err) => return Err(map_application_error(err)),
        }
    } else {
        // 全発注を取得
        match state.order_query_service.get_all_orders().await {
            Ok(orders) => orders,
            Err(err) => return Err(map_application_error(err)),
        }
    };

    let response: Vec<OrderSummaryResponse> = orders
        .iter()
        .map(OrderSummaryResponse::from_order)
        .collect();

    Ok(Json(response))
}

// 発注詳細取得エンドポイント
async fn get_order_by_id(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state.order_query_service.get_order_by_id(order_id).await {
        Ok(Some(order)) => {
            let response = OrderDetailResponse::from_order(&order);
            Ok(Json(response))
        }
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された発注が見つかりません".to_string(),
                code: "ORDER_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 原材料登録エンドポイント
async fn create_material(
    State(state): State<AppState>,
    Json(request): Json<CreateMaterialRequest>,
) -> Result<(StatusCode, Json<RawMaterialResponse>), (StatusCode, Json<ApiError>)> {
    let price = Money::new(request.price_amount, request.price_currency)
        .map_err(|err| map_domain_error(err))?;

    match state
        .material_service
        .create_material(request.name, request.unit, price, request.stock)
        .await
    {
        Ok(material) => Ok((
            StatusCode::CREATED,
            Json(RawMaterialResponse::from_material(&material)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 原材料一覧取得エンドポイント
async fn get_materials(
    State(state): State<AppState>,
    query: Result<Query<MaterialQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<RawMaterialResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;
    let materials = if let Some(max_available) = params.max_available {
        // 利用可能在庫数でフィルタリング
        match state
            .material_query_service
            .get_low_stock_materials(max_available)
            .await
        {
            Ok(materials) => materials,
            Err(err) => return Err(map_application_error(err)),
        }
    } else {
        // 全原材料を取得
        match state.material_query_service.get_all_materials().await {
            Ok(materials) => materials,
            Err(err) => return Err(map_application_error(err)),
        }
    };

    let response: Vec<RawMaterialResponse> = materials
        .iter()
        .map(RawMaterialResponse::from_material)
        .collect();

    Ok(Json(response))
}

// 原材料詳細取得エンドポイント
async fn get_material_by_id(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<RawMaterialResponse>, (StatusCode, Json<ApiError>)> {
    let material_id = MaterialId::from_uuid(material_id);

    match state
        .material_query_service
        .get_material_by_id(material_id)
        .await
    {
        Ok(Some(material)) => {
            let response = RawMaterialResponse::from_material(&material);
            Ok(Json(response))
        }
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された原材料が見つかりません".to_string(),
                code: "MATERIAL_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 在庫調整エンドポイント
async fn adjust_stock(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<RawMaterialResponse>, (StatusCode, Json<ApiError>)> {
    let material_id = MaterialId::from_uuid(material_id);

    match state
        .material_service
        .adjust_stock(material_id, request.stock)
        .await
    {
        Ok(material) => Ok(Json(RawMaterialResponse::from_material(&material))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 原材料発注停止エンドポイント
async fn deactivate_material(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<RawMaterialResponse>, (StatusCode, Json<ApiError>)> {
    let material_id = MaterialId::from_uuid(material_id);

    match state.material_service.deactivate_material(material_id).await {
        Ok(material) => Ok(Json(RawMaterialResponse::from_material(&material))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 原材料発注再開エンドポイント
async fn activate_material(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<RawMaterialResponse>, (StatusCode, Json<ApiError>)> {
    let material_id = MaterialId::from_uuid(material_id);

    match state.material_service.activate_material(material_id).await {
        Ok(material) => Ok(Json(RawMaterialResponse::from_material(&material))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約済み在庫の整合性修復エンドポイント
async fn reconcile_reserved_stock(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationDriftResponse>>, (StatusCode, Json<ApiError>)> {
    match state.material_service.reconcile_reserved_stock().await {
        Ok(drifts) => {
            let response: Vec<ReservationDriftResponse> = drifts
                .iter()
                .map(ReservationDriftResponse::from_drift)
                .collect();
            Ok(Json(response))
        }
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(
    domain_err: crate::domain::error::DomainError,
) -> (StatusCode, Json<ApiError>) {
    use crate::domain::error::DomainError;

    match domain_err {
        DomainError::InsufficientStock(_) => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: format!("{}", domain_err),
                code: "INSUFFICIENT_STOCK".to_string(),
            }),
        ),
        DomainError::NegativeStock { .. } => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: format!("{}", domain_err),
                code: "NEGATIVE_STOCK".to_string(),
            }),
        ),
        DomainError::InvalidOrderState(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_ORDER_STATE".to_string(),
            }),
        ),
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効な数量です".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ),
        DomainError::OrderValidation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "ORDER_VALIDATION".to_string(),
            }),
        ),
        DomainError::InactiveMaterial(name) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: format!("原材料{}は発注停止中です", name),
                code: "INACTIVE_MATERIAL".to_string(),
            }),
        ),
        DomainError::MaterialNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: format!("原材料が見つかりません: {}", id),
                code: "MATERIAL_NOT_FOUND".to_string(),
            }),
        ),
        DomainError::OrderNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: format!("発注が見つかりません: {}", id),
                code: "ORDER_NOT_FOUND".to_string(),
            }),
        ),
        DomainError::CurrencyMismatch => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "通貨が一致しません".to_string(),
                code: "CURRENCY_MISMATCH".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
        DomainError::RepositoryError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
    }
}


#[cfg(test)]
mod error_handling_tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::error::{DomainError, StockShortage};
    use crate::domain::model::MaterialId;

    #[test]
    fn test_map_application_error_not_found() {
        let app_error = ApplicationError::NotFound("リソースが見つかりません".to_string());
        let (status, Json(api_error)) = map_application_error(app_error);

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.code, "NOT_FOUND");
        assert_eq!(api_error.error, "リソースが見つかりません");
    }

    #[test]
    fn test_map_insufficient_stock_to_conflict() {
        let shortages = vec![StockShortage {
            material_id: MaterialId::new(),
            name: "小麦粉".to_string(),
            requested: 150,
            available: 100,
        }];
        let app_error = ApplicationError::DomainError(DomainError::InsufficientStock(shortages));
        let (status, Json(api_error)) = map_application_error(app_error);

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(api_error.code, "INSUFFICIENT_STOCK");
        assert!(api_error.error.contains("小麦粉"));
        assert!(api_error.error.contains("150"));
        assert!(api_error.error.contains("100"));
    }

    #[test]
    fn test_map_invalid_order_state_to_bad_request() {
        let app_error = ApplicationError::DomainError(DomainError::InvalidOrderState(
            "発注を編集できるのはPending状態のみです".to_string(),
        ));
        let (status, Json(api_error)) = map_application_error(app_error);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.code, "INVALID_ORDER_STATE");
    }

    #[test]
    fn test_api_error_structure() {
        let api_error = ApiError {
            error: "テストエラー".to_string(),
            code: "TEST_ERROR".to_string(),
        };

        // JSON シリアライゼーションのテスト
        let json = serde_json::to_string(&api_error).unwrap();
        assert!(json.contains("テストエラー"));
        assert!(json.contains("TEST_ERROR"));

        // JSON デシリアライゼーションのテスト
        let deserialized: ApiError = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.error, "テストエラー");
        assert_eq!(deserialized.code, "TEST_ERROR");
    }
}
