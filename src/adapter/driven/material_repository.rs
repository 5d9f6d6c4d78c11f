use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{MaterialId, Money, RawMaterial};
use crate::domain::port::{RawMaterialRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

/// MySQL原材料リポジトリ
/// MySQLデータベースを使用して原材料を永続化する
#[derive(Clone)]
pub struct MySqlRawMaterialRepository {
    pool: Pool<MySql>,
}

impl MySqlRawMaterialRepository {
    /// 新しいMySQL原材料リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

/// 原材料のUPSERT文
const UPSERT_MATERIAL_SQL: &str = r#"
    INSERT INTO raw_materials (id, name, unit, price_amount, price_currency, stock, reserved_stock, is_active)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON DUPLICATE KEY UPDATE
        name = VALUES(name),
        unit = VALUES(unit),
        price_amount = VALUES(price_amount),
        price_currency = VALUES(price_currency),
        stock = VALUES(stock),
        reserved_stock = VALUES(reserved_stock),
        is_active = VALUES(is_active)
"#;

/// UPSERT文にバインドする値
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UpsertValue {
    Text(String),
    BigInt(i64),
    UInt(u32),
    Bool(bool),
}

/// 原材料をUPSERT文の列順に並べたバインド値に変換する
pub(crate) fn upsert_material_values(material: &RawMaterial) -> Vec<UpsertValue> {
    vec![
        UpsertValue::Text(material.id().to_string()),
        UpsertValue::Text(material.name().to_string()),
        UpsertValue::Text(material.unit().to_string()),
        UpsertValue::BigInt(material.price().amount()),
        UpsertValue::Text(material.price().currency()),
        UpsertValue::UInt(material.stock()),
        UpsertValue::UInt(material.reserved_stock()),
        UpsertValue::Bool(material.is_active()),
    ]
}

/// 取得した行から原材料を再構築する
pub(crate) fn material_from_row(row: &MySqlRow) -> Result<RawMaterial, RepositoryError> {
    let material_id = MaterialId::from_string(row.get("id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("原材料IDの解析に失敗しました: {}", e))
    })?;

    let price = Money::new(
        row.get::<i64, _>("price_amount"),
        row.get::<String, _>("price_currency"),
    )
    .map_err(|e| RepositoryError::FetchFailed(format!("単価の解析に失敗しました: {}", e)))?;

    Ok(RawMaterial::reconstruct(
        material_id,
        row.get("name"),
        row.get("unit"),
        price,
        row.get::<u32, _>("stock"),
        row.get::<u32, _>("reserved_stock"),
        row.get::<bool, _>("is_active"),
    ))
}

#[async_trait]
impl RawMaterialRepository for MySqlRawMaterialRepository {
    async fn save(&self, material: &RawMaterial) -> Result<(), RepositoryError> {
        // 原材料データをraw_materialsテーブルにUPSERT
        // バインド値はUPSERT文の列順と一致していなければならない
        let mut query = sqlx::query(UPSERT_MATERIAL_SQL);
        for value in upsert_material_values(material) {
            query = match value {
                UpsertValue::Text(v) => query.bind(v),
                UpsertValue::BigInt(v) => query.bind(v),
                UpsertValue::UInt(v) => query.bind(v),
                UpsertValue::Bool(v) => query.bind(v),
            };
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("原材料の保存に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        material_id: MaterialId,
    ) -> Result<Option<RawMaterial>, RepositoryError> {
        // raw_materialsテーブルから原材料を取得
        let row = sqlx::query(
            "SELECT id, name, unit, price_amount, price_currency, stock, reserved_stock, is_active FROM raw_materials WHERE id = ?"
        )
        .bind(material_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("原材料の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(material_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<RawMaterial>, RepositoryError> {
        // raw_materialsテーブルからすべての原材料を取得
        // 原材料名の昇順で並べる
        let rows = sqlx::query(
            "SELECT id, name, unit, price_amount, price_currency, stock, reserved_stock, is_active FROM raw_materials ORDER BY name ASC"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("原材料一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut materials = Vec::new();
        for row in rows {
            materials.push(material_from_row(&row)?);
        }

        Ok(materials)
    }

    async fn find_by_max_available(
        &self,
        max_available: u32,
    ) -> Result<Vec<RawMaterial>, RepositoryError> {
        // 指定された最大利用可能在庫数以下の原材料を取得
        // 符号なし同士の減算によるアンダーフローを避けるためSIGNEDにキャストする
        let rows = sqlx::query(
            r#"
            SELECT id, name, unit, price_amount, price_currency, stock, reserved_stock, is_active
            FROM raw_materials
            WHERE CAST(stock AS SIGNED) - CAST(reserved_stock AS SIGNED) <= ?
            ORDER BY name ASC
            "#,
        )
        .bind(i64::from(max_available))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("原材料フィルタリングの取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        let mut materials = Vec::new();
        for row in rows {
            materials.push(material_from_row(&row)?);
        }

        Ok(materials)
    }

    fn next_identity(&self) -> MaterialId {
        MaterialId::new()
    }
}
