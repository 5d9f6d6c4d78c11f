use crate::adapter::database_error::DatabaseError;
use crate::adapter::driven::material_repository::material_from_row;
use crate::adapter::driven::order_repository::order_from_rows;
use crate::domain::model::{MaterialId, MaterialOrder, OrderId, RawMaterial};
use crate::domain::port::{RepositoryError, ReservationTransaction, ReservationUnitOfWork};
use async_trait::async_trait;
use std::collections::BTreeMap;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row, Transaction};

/// MySQL予約ユニットオブワーク
/// 在庫チェックと予約更新を単一のデータベーストランザクションにまとめる
pub struct MySqlReservationUnitOfWork {
    pool: Pool<MySql>,
}

impl MySqlReservationUnitOfWork {
    /// 新しいMySQL予約ユニットオブワークを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationUnitOfWork for MySqlReservationUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn ReservationTransaction>, RepositoryError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!("トランザクション開始に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;
        Ok(Box::new(MySqlReservationTransaction { tx }))
    }
}

/// MySQL予約トランザクション
/// commitもrollbackも呼ばれずにdropされた場合、
/// sqlxのトランザクションが自動的にロールバックする
pub struct MySqlReservationTransaction {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl ReservationTransaction for MySqlReservationTransaction {
    async fn lock_material(
        &mut self,
        material_id: MaterialId,
    ) -> Result<Option<RawMaterial>, RepositoryError> {
        // FOR UPDATEで行ロックを取得し、トランザクション終了まで
        // 他のトランザクションによる同一行の更新を防ぐ
        let row = sqlx::query(
            r#"
            SELECT id, name, unit, price_amount, price_currency, stock, reserved_stock, is_active
            FROM raw_materials
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(material_id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("原材料のロック取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(material_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn save_material_counters(
        &mut self,
        material: &RawMaterial,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE raw_materials SET stock = ?, reserved_stock = ? WHERE id = ?")
            .bind(material.stock())
            .bind(material.reserved_stock())
            .bind(material.id().to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("在庫カウンタの更新に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Option<MaterialOrder>, RepositoryError> {
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
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("発注の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(order_from_rows(order_id, &rows)?))
    }

    async fn insert_order(&mut self, order: &MaterialOrder) -> Result<(), RepositoryError> {
        // 発注ヘッダをmaterial_ordersテーブルにINSERT
        sqlx::query(
            r#"
            INSERT INTO material_orders
                (id, outlet_id, created_by, status, payment_method, notes, created_at, approved_at, delivered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id().to_string())
        .bind(order.outlet_id().to_string())
        .bind(order.created_by().to_string())
        .bind(order.status().to_string())
        .bind(order.payment_method().to_string())
        .bind(order.notes())
        .bind(order.created_at().naive_utc())
        .bind(order.approved_at().map(|t| t.naive_utc()))
        .bind(order.delivered_at().map(|t| t.naive_utc()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("発注の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        self.insert_items(order).await
    }

    async fn update_order(&mut self, order: &MaterialOrder) -> Result<(), RepositoryError> {
        // 発注ヘッダを更新
        sqlx::query(
            r#"
            UPDATE material_orders
            SET status = ?, payment_method = ?, notes = ?, approved_at = ?, delivered_at = ?
            WHERE id = ?
            "#,
        )
        .bind(order.status().to_string())
        .bind(order.payment_method().to_string())
        .bind(order.notes())
        .bind(order.approved_at().map(|t| t.naive_utc()))
        .bind(order.delivered_at().map(|t| t.naive_utc()))
        .bind(order.id().to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("発注の更新に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // 既存の発注明細を削除して再挿入
        sqlx::query("DELETE FROM material_order_items WHERE order_id = ?")
            .bind(order.id().to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("発注明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        self.insert_items(order).await
    }

    async fn delete_order(&mut self, order_id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM material_order_items WHERE order_id = ?")
            .bind(order_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("発注明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM material_orders WHERE id = ?")
            .bind(order_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("発注の削除に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn reserved_quantities_from_orders(
        &mut self,
    ) -> Result<BTreeMap<MaterialId, u32>, RepositoryError> {
        // PendingとApprovedの発注明細から原材料ごとの予約数量を集計
        let rows = sqlx::query(
            r#"
            SELECT i.material_id, CAST(SUM(i.quantity) AS SIGNED) AS total_quantity
            FROM material_order_items i
            JOIN material_orders o ON o.id = i.order_id
            WHERE o.status IN ('Pending', 'Approved')
            GROUP BY i.material_id
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約数量の集計に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut quantities = BTreeMap::new();
        for row in rows {
            let material_id = MaterialId::from_string(row.get("material_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("原材料IDの解析に失敗しました: {}", e))
            })?;
            let total: i64 = row.get("total_quantity");
            let total = u32::try_from(total).map_err(|e| {
                RepositoryError::FetchFailed(format!("予約数量の変換に失敗しました: {}", e))
            })?;
            quantities.insert(material_id, total);
        }

        Ok(quantities)
    }

    async fn all_material_ids(&mut self) -> Result<Vec<MaterialId>, RepositoryError> {
        let rows = sqlx::query("SELECT id FROM raw_materials ORDER BY id ASC")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("原材料ID一覧の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        let mut material_ids = Vec::with_capacity(rows.len());
        for row in rows {
            let material_id = MaterialId::from_string(row.get("id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("原材料IDの解析に失敗しました: {}", e))
            })?;
            material_ids.push(material_id);
        }

        Ok(material_ids)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのロールバックに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)
    }
}

impl MySqlReservationTransaction {
    /// 発注明細をmaterial_order_itemsテーブルにINSERT
    async fn insert_items(&mut self, order: &MaterialOrder) -> Result<(), RepositoryError> {
        for item in order.items() {
            sqlx::query(
                r#"
                INSERT INTO material_order_items
                    (order_id, material_id, quantity, price_per_unit_amount, price_per_unit_currency)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(order.id().to_string())
            .bind(item.material_id().to_string())
            .bind(item.quantity())
            .bind(item.price_per_unit().amount())
            .bind(item.price_per_unit().currency())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("発注明細の保存に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;
        }

        Ok(())
    }
}
