// ==========================================
// 元器件库存系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口（JSON 契约），供 CLI 或外层服务调用
// ==========================================

pub mod bom_api;
pub mod error;
pub mod preview_api;
pub mod purchase_import_api;

// 重导出核心类型
pub use bom_api::{BomApi, ReconcileRequest, ReconcileResponse};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use preview_api::{FilePreviewApi, FilePreviewResponse};
pub use purchase_import_api::{ImportRequest, ImportResponse, PurchaseImportApi};
