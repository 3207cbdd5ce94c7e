// ==========================================
// 元器件库存系统 - 引擎层
// ==========================================
// 职责: 需求合并 / 缺料核对 / 采购单导入规则
// 红线: Engine 不拼 SQL，存储访问只通过 repositories 中的 trait
// ==========================================

pub mod collation;
pub mod demand_merger;
pub mod purchase_import;
pub mod reconciler;
pub mod repositories;

// 重导出核心引擎
pub use collation::{czech_cmp, sort_czech};
pub use demand_merger::DemandMerger;
pub use purchase_import::{PurchaseImportEngine, PurchaseImportError};
pub use reconciler::{ceil_to_multiple, Reconciler};
pub use repositories::{PurchaseImportStore, StockLookup, StockRepositories};
