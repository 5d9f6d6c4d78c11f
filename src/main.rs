use material_order_management::adapter::driven::{
    MySqlMaterialOrderRepository, MySqlRawMaterialRepository, MySqlReservationUnitOfWork,
};
use material_order_management::adapter::driver::rest_api::{create_router, AppStateInner};
use material_order_management::adapter::{DatabaseConfig, DatabaseMigration};
use material_order_management::application::service::material_order_query_service::MaterialOrderQueryService;
use material_order_management::application::service::raw_material_query_service::RawMaterialQueryService;
use material_order_management::application::service::{
    MaterialOrderApplicationService, RawMaterialApplicationService,
};
use material_order_management::domain::service::ReservationCoordinator;

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // ロギングを初期化（RUST_LOGで制御、デフォルトはinfo）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("=== 原材料発注管理システム REST API ===");

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    tracing::info!(
        "データベース設定を読み込みました: {}:{}",
        config.host,
        config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    tracing::info!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    tracing::info!("データベースマイグレーションを実行しました");

    // MySQLリポジトリとユニットオブワークを作成
    let material_repository = Arc::new(MySqlRawMaterialRepository::new(pool.clone()));
    let order_repository = Arc::new(MySqlMaterialOrderRepository::new(pool.clone()));
    let uow = Arc::new(MySqlReservationUnitOfWork::new(pool.clone()));

    // 予約コーディネーターを作成
    let coordinator = Arc::new(ReservationCoordinator::new(uow));

    // アプリケーションサービスを作成
    let order_service =
        MaterialOrderApplicationService::new(order_repository.clone(), coordinator.clone());
    let material_service =
        RawMaterialApplicationService::new(material_repository.clone(), coordinator);

    // クエリサービスを作成
    let order_query_service = MaterialOrderQueryService::new(order_repository);
    let material_query_service = RawMaterialQueryService::new(material_repository);

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        order_service: Arc::new(order_service),
        material_service: Arc::new(material_service),
        order_query_service: Arc::new(order_query_service),
        material_query_service: Arc::new(material_query_service),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("REST APIサーバーが起動しました: http://localhost:3000");
    tracing::info!("ヘルスチェック: GET http://localhost:3000/health");
    tracing::info!("API仕様:");
    tracing::info!("  POST /material-orders - 発注作成（在庫予約）");
    tracing::info!("  GET  /material-orders - 発注一覧取得");
    tracing::info!("  GET  /material-orders/:id - 発注詳細取得");
    tracing::info!("  PUT  /material-orders/:id - 発注編集");
    tracing::info!("  POST /material-orders/:id/approve - 発注承認");
    tracing::info!("  POST /material-orders/:id/deliver - 発注納品");
    tracing::info!("  POST /material-orders/:id/cancel - 発注キャンセル");
    tracing::info!("  POST /raw-materials - 原材料登録");
    tracing::info!("  GET  /raw-materials - 原材料一覧取得");
    tracing::info!("  GET  /raw-materials/:id - 原材料詳細取得");
    tracing::info!("  PUT  /raw-materials/:id/stock - 在庫調整");
    tracing::info!("  POST /raw-materials/:id/deactivate - 発注停止");
    tracing::info!("  POST /raw-materials/:id/activate - 発注再開");
    tracing::info!("  POST /raw-materials/reconcile - 予約済み在庫の整合性修復");

    axum::serve(listener, app).await?;

    Ok(())
}
