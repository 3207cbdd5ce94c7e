// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use component_stock::app::AppState;
use component_stock::RawDemandRow;
use rusqlite::Connection;
use serde_json::Value;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库（schema 由 AppState 建立）
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - AppState: 已装配的应用状态
pub fn create_test_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let state = AppState::new(&db_path)?;
    Ok((temp_file, state))
}

/// 创建临时测试数据库并写入演示数据
pub fn create_seeded_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let (temp_file, state) = create_test_state()?;
    state.seed_demo_data()?;
    Ok((temp_file, state))
}

/// 打开同一数据库的独立连接（用于直接断言/制造故障）
pub fn raw_connection(state: &AppState) -> Result<Connection, Box<dyn Error>> {
    Ok(Connection::open(&state.db_path)?)
}

/// 构造原始行
pub fn row(part_number: impl Into<Value>, qty: impl Into<Value>) -> RawDemandRow {
    RawDemandRow::new(part_number, qty)
}

/// 构造带描述的原始行
pub fn row_with_desc(
    part_number: impl Into<Value>,
    qty: impl Into<Value>,
    description: &str,
) -> RawDemandRow {
    RawDemandRow::new(part_number, qty).with_description(description)
}

/// 统计表行数
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap_or(-1)
}
