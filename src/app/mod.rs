// ==========================================
// 元器件库存系统 - 应用层
// ==========================================
// 职责: 装配共享连接 / 仓储 / API，供 CLI 或外层服务调用
// ==========================================

pub mod seed;
pub mod state;

// 重导出
pub use seed::SeedSummary;
pub use state::{get_default_db_path, AppState, HealthStatus, DB_PATH_ENV};
