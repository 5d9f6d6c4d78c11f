// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod material_order;
mod raw_material;

pub use value_objects::{
    OrderId, MaterialId, OutletId, StaffId,
    Currency, Money,
    PaymentMethod,
    OrderItem,
    OrderStatus,
};

pub use material_order::MaterialOrder;
pub use raw_material::RawMaterial;
