// ==========================================
// 元器件库存系统 - 配置层
// ==========================================
// 职责: 系统配置管理（导入默认值 / 预览行数）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager};
