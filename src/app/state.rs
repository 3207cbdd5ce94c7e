// ==========================================
// 元器件库存系统 - 应用状态
// ==========================================
// 职责: 打开共享连接、建表、装配仓储与 API 实例
// 生命周期: 进程启动时创建，退出时随 AppState 一起释放连接
// ==========================================

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiResult, BomApi, FilePreviewApi, PurchaseImportApi};
use crate::app::seed::{seed_demo_data, SeedSummary};
use crate::config::ConfigManager;
use crate::db::{open_and_migrate, read_schema_version};
use crate::engine::StockRepositories;
use crate::repository::{FeederRepository, ImportBatchRepository, PartRepository, RepositoryError};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "COMPONENT_STOCK_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个连接。
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// BOM 核对 API
    pub bom_api: Arc<BomApi>,

    /// 采购单导入 API
    pub purchase_import_api: Arc<PurchaseImportApi>,

    /// 文件预览 API
    pub preview_api: Arc<FilePreviewApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    pub part_repo: Arc<PartRepository>,
    pub feeder_repo: Arc<FeederRepository>,
    pub batch_repo: Arc<ImportBatchRepository>,

    conn: Arc<Mutex<rusqlite::Connection>>,
}

/// 健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub ok: bool,
    pub db_path: String,
    pub schema_version: Option<i64>,
    pub parts: i64,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开（必要时创建）数据库、建表，并装配所有 API。
    pub fn new(db_path: &str) -> ApiResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_and_migrate(db_path).map_err(|e| {
            ApiError::DatabaseConnectionError(format!("无法打开数据库 {}: {}", db_path, e))
        })?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let part_repo = Arc::new(PartRepository::from_connection(conn.clone()));
        let feeder_repo = Arc::new(FeederRepository::from_connection(conn.clone()));
        let batch_repo = Arc::new(ImportBatchRepository::from_connection(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);

        let repos = StockRepositories::new(part_repo.clone(), batch_repo.clone());

        // ==========================================
        // 初始化API层
        // ==========================================
        let bom_api = Arc::new(BomApi::new(Arc::new(repos.clone())));
        let purchase_import_api = Arc::new(PurchaseImportApi::new(repos, config.clone()));
        let preview_api = Arc::new(FilePreviewApi::new(config.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path: db_path.to_string(),
            bom_api,
            purchase_import_api,
            preview_api,
            config,
            part_repo,
            feeder_repo,
            batch_repo,
            conn,
        })
    }

    /// 健康检查（一次简单查询证明连接可用）
    pub fn health_check(&self) -> ApiResult<HealthStatus> {
        let parts = self.part_repo.count()?;
        let schema_version = {
            let conn = self
                .conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            read_schema_version(&conn).map_err(RepositoryError::from)?
        };

        Ok(HealthStatus {
            ok: true,
            db_path: self.db_path.clone(),
            schema_version,
            parts,
        })
    }

    /// 写入演示数据（幂等）
    pub fn seed_demo_data(&self) -> ApiResult<SeedSummary> {
        Ok(seed_demo_data(&self.part_repo, &self.feeder_repo)?)
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 COMPONENT_STOCK_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./component_stock.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("component-stock");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("component_stock.db");
        }
    }

    path.to_string_lossy().to_string()
}
