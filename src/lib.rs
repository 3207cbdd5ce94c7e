// ==========================================
// 元器件库存系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 功能: BOM 缺料核对 / 采购单导入（在途累加 + 审计）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 表格文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ImportLineStatus, ReconcileStatus};

// 领域实体
pub use domain::{
    DemandLine, ImportBatch, ImportBatchDetail, ImportLine, ImportSummary, InventorySnapshot,
    Part, PartPolicy, RawDemandRow, ReconciliationResult,
};

// 引擎
pub use engine::{ceil_to_multiple, DemandMerger, PurchaseImportEngine, Reconciler};

// API
pub use api::{
    ApiError, BomApi, ErrorResponse, FilePreviewApi, ImportRequest, PurchaseImportApi,
    ReconcileRequest,
};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "元器件库存系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
