use crate::application::ApplicationError;
use crate::domain::model::{MaterialId, RawMaterial};
use crate::domain::port::RawMaterialRepository;
use std::sync::Arc;

/// 原材料クエリサービス
/// 読み取り専用の原材料操作を提供する
pub struct RawMaterialQueryService {
    material_repository: Arc<dyn RawMaterialRepository>,
}

impl RawMaterialQueryService {
    /// 新しい原材料クエリサービスを作成
    ///
    /// # Arguments
    /// * `material_repository` - 原材料リポジトリ
    pub fn new(material_repository: Arc<dyn RawMaterialRepository>) -> Self {
        Self {
            material_repository,
        }
    }

    /// 原材料IDで原材料を取得
    ///
    /// # Arguments
    /// * `material_id` - 原材料ID
    ///
    /// # Returns
    /// * `Ok(Some(RawMaterial))` - 原材料が見つかった
    /// * `Ok(None)` - 原材料が見つからなかった
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_material_by_id(
        &self,
        material_id: MaterialId,
    ) -> Result<Option<RawMaterial>, ApplicationError> {
        self.material_repository
            .find_by_id(material_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての原材料を取得
    /// 原材料名の昇順で並べて返す
    ///
    /// # Returns
    /// * `Ok(Vec<RawMaterial>)` - 原材料のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_all_materials(&self) -> Result<Vec<RawMaterial>, ApplicationError> {
        self.material_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された最大利用可能在庫数以下の原材料を取得
    /// 在庫の少ない原材料の把握に使用する
    ///
    /// # Arguments
    /// * `max_available` - 最大利用可能在庫数（この数以下の原材料を取得）
    ///
    /// # Returns
    /// * `Ok(Vec<RawMaterial>)` - 指定された条件の原材料のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_low_stock_materials(
        &self,
        max_available: u32,
    ) -> Result<Vec<RawMaterial>, ApplicationError> {
        self.material_repository
            .find_by_max_available(max_available)
            .await
            .map_err(ApplicationError::from)
    }
}
