use crate::application::ApplicationError;
use crate::domain::model::{MaterialOrder, OrderId, OrderStatus};
use crate::domain::port::MaterialOrderRepository;
use std::sync::Arc;

/// 発注クエリサービス
/// 読み取り専用の発注操作を提供する
pub struct MaterialOrderQueryService {
    order_repository: Arc<dyn MaterialOrderRepository>,
}

impl MaterialOrderQueryService {
    /// 新しい発注クエリサービスを作成
    ///
    /// # Arguments
    /// * `order_repository` - 発注リポジトリ
    pub fn new(order_repository: Arc<dyn MaterialOrderRepository>) -> Self {
        Self { order_repository }
    }

    /// 発注IDで発注を取得
    ///
    /// # Arguments
    /// * `id` - 発注ID
    ///
    /// # Returns
    /// * `Ok(Some(MaterialOrder))` - 発注が見つかった
    /// * `Ok(None)` - 発注が見つからなかった
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_order_by_id(
        &self,
        id: OrderId,
    ) -> Result<Option<MaterialOrder>, ApplicationError> {
        self.order_repository
            .find_by_id(id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての発注を取得
    /// 作成日時の降順で並べて返す
    ///
    /// # Returns
    /// * `Ok(Vec<MaterialOrder>)` - 発注のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_all_orders(&self) -> Result<Vec<MaterialOrder>, ApplicationError> {
        self.order_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたステータスの発注を取得
    /// 作成日時の降順で並べて返す
    ///
    /// # Arguments
    /// * `status` - フィルタリングする発注ステータス
    ///
    /// # Returns
    /// * `Ok(Vec<MaterialOrder>)` - 指定されたステータスの発注のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<MaterialOrder>, ApplicationError> {
        self.order_repository
            .find_by_status(status)
            .await
            .map_err(ApplicationError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MaterialId, Money, OrderItem, OutletId, PaymentMethod, StaffId};
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // テスト用のモックリポジトリ
    struct MockOrderRepository {
        orders: Mutex<HashMap<OrderId, MaterialOrder>>,
    }

    impl MockOrderRepository {
        fn new() -> Self {
            Self {
                orders: Mutex::new(HashMap::new()),
            }
        }

        fn add_order(&self, order: MaterialOrder) {
            let mut orders = self.orders.lock().unwrap();
            orders.insert(order.id(), order);
        }
    }

    #[async_trait]
    impl MaterialOrderRepository for MockOrderRepository {
        async fn find_by_id(
            &self,
            order_id: OrderId,
        ) -> Result<Option<MaterialOrder>, RepositoryError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders.get(&order_id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<MaterialOrder>, RepositoryError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders.values().cloned().collect())
        }

        async fn find_by_status(
            &self,
            status: OrderStatus,
        ) -> Result<Vec<MaterialOrder>, RepositoryError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders
                .values()
                .filter(|order| order.status() == status)
                .cloned()
                .collect())
        }

        fn next_identity(&self) -> OrderId {
            OrderId::new()
        }
    }

    fn pending_order() -> MaterialOrder {
        let items = vec![OrderItem::new(MaterialId::new(), 2, Money::idr(1000)).unwrap()];
        MaterialOrder::new(
            OrderId::new(),
            OutletId::new(),
            StaffId::new(),
            PaymentMethod::Cash,
            None,
            items,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_order_by_id_found() {
        let repository = Arc::new(MockOrderRepository::new());
        let service = MaterialOrderQueryService::new(repository.clone());

        // テスト用の発注を作成
        let order = pending_order();
        let order_id = order.id();
        repository.add_order(order);

        // 発注を取得
        let result = service.get_order_by_id(order_id).await;
        assert!(result.is_ok());
        let found_order = result.unwrap();
        assert!(found_order.is_some());
        assert_eq!(found_order.unwrap().id(), order_id);
    }

    #[tokio::test]
    async fn test_get_order_by_id_not_found() {
        let repository = Arc::new(MockOrderRepository::new());
        let service = MaterialOrderQueryService::new(repository);

        let order_id = OrderId::new();
        let result = service.get_order_by_id(order_id).await;
        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_orders() {
        let repository = Arc::new(MockOrderRepository::new());
        let service = MaterialOrderQueryService::new(repository.clone());

        // テスト用の発注を複数作成
        repository.add_order(pending_order());
        repository.add_order(pending_order());

        // すべての発注を取得
        let result = service.get_all_orders().await;
        assert!(result.is_ok());
        let orders = result.unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_get_orders_by_status() {
        let repository = Arc::new(MockOrderRepository::new());
        let service = MaterialOrderQueryService::new(repository.clone());

        // 異なるステータスの発注を作成
        let mut order1 = pending_order();
        order1
            .transition_to(OrderStatus::Approved, Utc::now())
            .unwrap();
        let order2 = pending_order(); // Pendingステータス

        repository.add_order(order1);
        repository.add_order(order2);

        // Approvedステータスの発注のみを取得
        let result = service.get_orders_by_status(OrderStatus::Approved).await;
        assert!(result.is_ok());
        let orders = result.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status(), OrderStatus::Approved);
    }
}
