// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{MaterialId, MaterialOrder, OrderId, OrderStatus, RawMaterial};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 原材料リポジトリトレイト
/// 原材料集約の永続化を抽象化する
/// 予約カウンタの更新はトランザクション境界を要するためReservationTransaction側で行う
#[async_trait]
pub trait RawMaterialRepository: Send + Sync {
    /// 原材料を保存する
    ///
    /// # Arguments
    /// * `material` - 保存する原材料
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, material: &RawMaterial) -> Result<(), RepositoryError>;

    /// 原材料IDで原材料を検索する
    ///
    /// # Arguments
    /// * `material_id` - 検索する原材料ID
    ///
    /// # Returns
    /// * `Ok(Some(RawMaterial))` - 原材料が見つかった
    /// * `Ok(None)` - 原材料が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(
        &self,
        material_id: MaterialId,
    ) -> Result<Option<RawMaterial>, RepositoryError>;

    /// すべての原材料を取得する
    /// 原材料名の昇順で並べて返す
    ///
    /// # Returns
    /// * `Ok(Vec<RawMaterial>)` - 原材料のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_all(&self) -> Result<Vec<RawMaterial>, RepositoryError>;

    /// 指定された最大利用可能在庫数以下の原材料を取得する
    /// 在庫の少ない原材料の把握に使用する
    ///
    /// # Arguments
    /// * `max_available` - 最大利用可能在庫数（この数以下の原材料を取得）
    ///
    /// # Returns
    /// * `Ok(Vec<RawMaterial>)` - 指定された条件の原材料のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_by_max_available(
        &self,
        max_available: u32,
    ) -> Result<Vec<RawMaterial>, RepositoryError>;

    /// 新しい一意の原材料IDを生成する
    fn next_identity(&self) -> MaterialId;
}

/// 発注リポジトリトレイト
/// 発注集約の読み取りを抽象化する
/// 書き込みは予約カウンタと同一トランザクションで行う必要があるため
/// ReservationTransaction経由に限定する
#[async_trait]
pub trait MaterialOrderRepository: Send + Sync {
    /// 発注IDで発注を検索する
    ///
    /// # Arguments
    /// * `order_id` - 検索する発注ID
    ///
    /// # Returns
    /// * `Ok(Some(MaterialOrder))` - 発注が見つかった
    /// * `Ok(None)` - 発注が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, order_id: OrderId)
        -> Result<Option<MaterialOrder>, RepositoryError>;

    /// すべての発注を取得する
    /// 作成日時の降順で並べて返す
    ///
    /// # Returns
    /// * `Ok(Vec<MaterialOrder>)` - 発注のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_all(&self) -> Result<Vec<MaterialOrder>, RepositoryError>;

    /// 指定されたステータスの発注を取得する
    /// 作成日時の降順で並べて返す
    ///
    /// # Arguments
    /// * `status` - フィルタリングする発注ステータス
    ///
    /// # Returns
    /// * `Ok(Vec<MaterialOrder>)` - 指定されたステータスの発注のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<MaterialOrder>, RepositoryError>;

    /// 新しい一意の発注IDを生成する
    fn next_identity(&self) -> OrderId;
}

/// 予約ユニットオブワークトレイト
/// 在庫チェックと予約更新を単一のアトミックな単位にまとめるための
/// トランザクション開始点
#[async_trait]
pub trait ReservationUnitOfWork: Send + Sync {
    /// 新しいトランザクションを開始する
    async fn begin(&self) -> Result<Box<dyn ReservationTransaction>, RepositoryError>;
}

/// 予約トランザクショントレイト
/// 単一トランザクション内での発注と在庫カウンタの読み書きを表す
/// commitもrollbackも呼ばれずにdropされた場合はロールバックされる
#[async_trait]
pub trait ReservationTransaction: Send {
    /// 原材料を排他ロック付きで取得する
    /// トランザクション終了まで他のトランザクションによる同一行の更新を防ぐ
    ///
    /// # Arguments
    /// * `material_id` - ロックする原材料ID
    ///
    /// # Returns
    /// * `Ok(Some(RawMaterial))` - ロック取得済みの原材料
    /// * `Ok(None)` - 原材料が見つからなかった
    /// * `Err(RepositoryError)` - 取得失敗
    async fn lock_material(
        &mut self,
        material_id: MaterialId,
    ) -> Result<Option<RawMaterial>, RepositoryError>;

    /// 原材料の在庫カウンタ（stock、reserved_stock）を書き戻す
    async fn save_material_counters(
        &mut self,
        material: &RawMaterial,
    ) -> Result<(), RepositoryError>;

    /// 発注IDで発注を取得する
    async fn find_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Option<MaterialOrder>, RepositoryError>;

    /// 発注を新規挿入する（ヘッダと明細）
    async fn insert_order(&mut self, order: &MaterialOrder) -> Result<(), RepositoryError>;

    /// 発注を更新する（ヘッダ更新、明細は全削除のうえ再挿入）
    async fn update_order(&mut self, order: &MaterialOrder) -> Result<(), RepositoryError>;

    /// 発注を削除する（キャンセル）
    async fn delete_order(&mut self, order_id: OrderId) -> Result<(), RepositoryError>;

    /// PendingおよびApprovedの発注明細から原材料ごとの予約数量を集計する
    /// 整合性検証（reconcile）に使用する
    async fn reserved_quantities_from_orders(
        &mut self,
    ) -> Result<BTreeMap<MaterialId, u32>, RepositoryError>;

    /// すべての原材料IDを昇順で取得する
    async fn all_material_ids(&mut self) -> Result<Vec<MaterialId>, RepositoryError>;

    /// トランザクションをコミットする
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    /// トランザクションをロールバックする
    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
