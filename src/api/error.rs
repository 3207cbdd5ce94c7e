// ==========================================
// 元器件库存系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/导入/引擎错误转换为调用方可理解的错误
//       + 统一错误响应结构（code / status / message / details）
// ==========================================

use crate::engine::purchase_import::PurchaseImportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 销售订单已被某批次导入
    #[error("销售订单 {sales_order_no} 已导入（批次 {batch_id}，文件 {file_name}，时间 {created_at}）")]
    DuplicateImport {
        batch_id: String,
        sales_order_no: String,
        file_name: String,
        created_at: String,
    },

    #[error("数据冲突: {0}")]
    Conflict(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 错误代码（稳定，供外层按代码分支）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DuplicateImport { .. } => "DUPLICATE_IMPORT",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// HTTP 语义状态码
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) | ApiError::ImportError(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::DuplicateImport { .. } | ApiError::Conflict(_) => 409,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => 500,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            // 约束错误
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("检查约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件不存在: {}", path)),
            ImportError::UnsupportedFormat(_) | ImportError::FieldMappingError(_) => {
                ApiError::InvalidInput(err.to_string())
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 PurchaseImportError 转换
// ==========================================
impl From<PurchaseImportError> for ApiError {
    fn from(err: PurchaseImportError) -> Self {
        match err {
            PurchaseImportError::NoValidRows => ApiError::InvalidInput(err.to_string()),
            PurchaseImportError::DuplicateOrder { existing } => ApiError::DuplicateImport {
                batch_id: existing.id,
                sales_order_no: existing.sales_order_no.unwrap_or_default(),
                file_name: existing.file_name,
                created_at: existing.created_at,
            },
            PurchaseImportError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 错误响应（返回给外层调用方）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// HTTP 语义状态码
    pub status: u16,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::DuplicateImport {
                batch_id,
                sales_order_no,
                file_name,
                created_at,
            } => Some(serde_json::json!({
                "existingBatch": {
                    "id": batch_id,
                    "salesOrderNo": sales_order_no,
                    "fileName": file_name,
                    "createdAt": created_at,
                }
            })),
            _ => None,
        };

        Self {
            code: err.code().to_string(),
            status: err.status(),
            message: err.to_string(),
            details,
        }
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}
