// 駆動される側アダプター（リポジトリ実装など）

mod material_repository;
mod order_repository;
mod reservation_tx;

pub use material_repository::MySqlRawMaterialRepository;
pub use order_repository::MySqlMaterialOrderRepository;
pub use reservation_tx::MySqlReservationUnitOfWork;
