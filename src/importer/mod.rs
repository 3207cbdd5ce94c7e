// ==========================================
// 元器件库存系统 - 导入层
// ==========================================
// 职责: 表格文件预览 + 列猜测 + 原始值清洗
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    map_preview_rows, normalize_header_key, ColumnGuesser, ColumnKind, ColumnMapping,
    MappedRows, MappingProfile,
};
pub use file_parser::{CsvParser, ExcelParser, FilePreview, PreviewRow, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::FileParser;
