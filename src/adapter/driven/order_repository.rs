use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{MaterialOrder, OrderId};
use crate::domain::port::{MaterialOrderRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use crate::domain::model::{MaterialId, Money, OrderItem, OrderStatus, OutletId, PaymentMethod, StaffId};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

/// JOINされた行のグループから単一の発注集約を再構築する
/// グループ内のすべての行は同じ発注のものでなければならない
pub(crate) fn order_from_rows(
    order_id: OrderId,
    rows: &[MySqlRow],
) -> Result<MaterialOrder, RepositoryError> {
    let first_row = rows
        .first()
        .ok_or_else(|| RepositoryError::FetchFailed("発注行が空です".to_string()))?;

    let outlet_id = OutletId::from_string(first_row.get("outlet_id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("店舗IDの解析に失敗しました: {}", e))
    })?;

    let created_by = StaffId::from_string(first_row.get("created_by")).map_err(|e| {
        RepositoryError::FetchFailed(format!("発注者IDの解析に失敗しました: {}", e))
    })?;

    let status = OrderStatus::from_string(first_row.get("status")).map_err(|e| {
        RepositoryError::FetchFailed(format!("発注ステータスの解析に失敗しました: {}", e))
    })?;

    let payment_method =
        PaymentMethod::from_string(first_row.get("payment_method")).map_err(|e| {
            RepositoryError::FetchFailed(format!("支払い方法の解析に失敗しました: {}", e))
        })?;

    let notes: Option<String> = first_row.get("notes");

    // DATETIMEカラムはUTCで保存されている
    let created_at = first_row
        .get::<chrono::NaiveDateTime, _>("created_at")
        .and_utc();
    let approved_at = first_row
        .get::<Option<chrono::NaiveDateTime>, _>("approved_at")
        .map(|t| t.and_utc());
    let delivered_at = first_row
        .get::<Option<chrono::NaiveDateTime>, _>("delivered_at")
        .map(|t| t.and_utc());

    // 発注明細を再構築（LEFT JOINのため明細カラムはNULLの可能性がある）
    let mut items = Vec::new();
    for row in rows {
        if let (Some(material_id_str), Some(quantity), Some(amount), Some(currency)) = (
            row.get::<Option<String>, _>("material_id"),
            row.get::<Option<u32>, _>("quantity"),
            row.get::<Option<i64>, _>("price_per_unit_amount"),
            row.get::<Option<String>, _>("price_per_unit_currency"),
        ) {
            let material_id = MaterialId::from_string(&material_id_str).map_err(|e| {
                RepositoryError::FetchFailed(format!("原材料IDの解析に失敗しました: {}", e))
            })?;

            let price_per_unit = Money::new(amount, currency).map_err(|e| {
                RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e))
            })?;

            let item = OrderItem::new(material_id, quantity, price_per_unit).map_err(|e| {
                RepositoryError::FetchFailed(format!("発注明細の構築に失敗しました: {}", e))
            })?;

            items.push(item);
        }
    }

    Ok(MaterialOrder::reconstruct(
        order_id,
        outlet_id,
        created_by,
        status,
        payment_method,
        notes,
        items,
        created_at,
        approved_at,
        delivered_at,
    ))
}

/// JOINされた結果から複数の発注を再構築する
/// クエリの並び順（作成日時の降順）を保ったまま発注IDごとにグループ化する
pub(crate) fn build_orders_from_rows(
    rows: Vec<MySqlRow>,
) -> Result<Vec<MaterialOrder>, RepositoryError> {
    use std::collections::HashMap;

    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<MySqlRow>)> = Vec::new();
    for row in rows {
        let order_id: String = row.get("id");
        match group_index.get(&order_id) {
            Some(&index) => groups[index].1.push(row),
            None => {
                group_index.insert(order_id.clone(), groups.len());
                groups.push((order_id, vec![row]));
            }
        }
    }

    let mut orders = Vec::with_capacity(groups.len());
    for (order_id_str, order_rows) in groups {
        let order_id = OrderId::from_string(&order_id_str).map_err(|e| {
            RepositoryError::FetchFailed(format!("発注IDの解析に失敗しました: {}", e))
        })?;
        orders.push(order_from_rows(order_id, &order_rows)?);
    }

    Ok(orders)
}

/// MySQL発注リポジトリ
/// MySQLデータベースから発注を読み取る
/// 書き込みは予約カウンタと同一トランザクションで行う必要があるため
/// MySqlReservationUnitOfWork側で実装する
pub struct MySqlMaterialOrderRepository {
    pool: Pool<MySql>,
}

impl MySqlMaterialOrderRepository {
    /// 新しいMySQL発注リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialOrderRepository for MySqlMaterialOrderRepository {
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<MaterialOrder>, RepositoryError> {
        // material_ordersテーブルとmaterial_order_itemsテーブルをJOINして取得
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.outlet_id, o.created_by, o.status, o.payment_method, o.notes,
                o.created_at, o.approved_at, o.delivered_at,
                i.material_id, i.quantity, i.price_per_unit_amount, i.price_per_unit_currency
            FROM material_orders o
            LEFT JOIN material_order_items i ON o.id = i.order_id
            WHERE o.id = ?
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("発注の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(order_from_rows(order_id, &rows)?))
    }

    async fn find_all(&self) -> Result<Vec<MaterialOrder>, RepositoryError> {
        // material_ordersテーブルとmaterial_order_itemsテーブルをJOINして全発注を取得
        // 作成日時の降順で並べる
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.outlet_id, o.created_by, o.status, o.payment_method, o.notes,
                o.created_at, o.approved_at, o.delivered_at,
                i.material_id, i.quantity, i.price_per_unit_amount, i.price_per_unit_currency
            FROM material_orders o
            LEFT JOIN material_order_items i ON o.id = i.order_id
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("発注一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        build_orders_from_rows(rows)
    }

    async fn find_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<MaterialOrder>, RepositoryError> {
        // 指定されたステータスの発注を取得
        // 作成日時の降順で並べる
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.outlet_id, o.created_by, o.status, o.payment_method, o.notes,
                o.created_at, o.approved_at, o.delivered_at,
                i.material_id, i.quantity, i.price_per_unit_amount, i.price_per_unit_currency
            FROM material_orders o
            LEFT JOIN material_order_items i ON o.id = i.order_id
            WHERE o.status = ?
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("ステータス別発注一覧の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        build_orders_from_rows(rows)
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}
