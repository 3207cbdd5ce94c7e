// ==========================================
// 元器件库存系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含数据访问
// ==========================================

pub mod demand;
pub mod part;
pub mod purchase;
pub mod reconciliation;
pub mod types;

// 重导出核心类型
pub use demand::{DemandLine, RawDemandRow};
pub use part::{
    Feeder, FeederAssignment, InventorySnapshot, NewPart, Part, PartPolicy, PartStockView,
};
pub use purchase::{ImportBatch, ImportBatchDetail, ImportBatchMeta, ImportLine, ImportSummary};
pub use reconciliation::ReconciliationResult;
pub use types::{ImportLineStatus, ReconcileStatus};
