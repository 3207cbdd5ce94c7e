// ==========================================
// 元器件库存系统 - 导入 Trait
// ==========================================
// 职责: 定义文件解析接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::file_parser::FilePreview;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 预览行
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - max_rows: 最多返回的数据行数（空白行不计）
    ///
    /// # 返回
    /// - Ok(FilePreview): 表头与行记录
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_preview(&self, file_path: &Path, max_rows: usize) -> ImportResult<FilePreview>;
}
