// ==========================================
// 元器件库存系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls，首个工作表) / CSV (.csv，自动识别分隔符)
// 输出: 表头 + 预览行（HashMap<列名, 值>），供列映射使用
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 预览行（列名 → 单元格文本）
pub type PreviewRow = HashMap<String, String>;

/// 文件预览结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePreview {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<PreviewRow>,
}

/// 空表头补位为 COL_n（n 从 1 开始）
fn header_or_placeholder(raw: &str, col_idx: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("COL_{}", col_idx + 1)
    } else {
        trimmed.to_string()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 按表头组装一行；完全空白的行返回 None
fn build_row<I>(headers: &[String], cells: I) -> Option<PreviewRow>
where
    I: IntoIterator<Item = String>,
{
    let mut row_map = PreviewRow::new();
    let mut has_any = false;

    for (col_idx, value) in cells.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if !value.trim().is_empty() {
                has_any = true;
            }
            row_map.insert(header.clone(), value);
        }
    }

    // 缺失的尾列补空串，保证每行键齐全
    for header in headers {
        row_map.entry(header.clone()).or_default();
    }

    if has_any {
        Some(row_map)
    } else {
        None
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按首行出现次数识别分隔符（; / , / Tab）
    fn detect_delimiter(text: &str) -> u8 {
        let first_line = text.lines().next().unwrap_or("");
        let candidates = [b';', b',', b'\t'];
        candidates
            .iter()
            .copied()
            .max_by_key(|d| first_line.bytes().filter(|b| b == d).count())
            .filter(|d| first_line.bytes().any(|b| b == *d))
            .unwrap_or(b',')
    }
}

impl FileParser for CsvParser {
    fn parse_preview(&self, file_path: &Path, max_rows: usize) -> ImportResult<FilePreview> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        // 去掉 UTF-8 BOM
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .delimiter(Self::detect_delimiter(text))
            .from_reader(text.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| header_or_placeholder(h, idx))
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            if rows.len() >= max_rows {
                break;
            }
            let record = result?;
            if let Some(row) = build_row(&headers, record.iter().map(|v| v.to_string())) {
                rows.push(row);
            }
        }

        Ok(FilePreview {
            file_name: file_name_of(path),
            headers,
            rows,
        })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_preview(&self, file_path: &Path, max_rows: usize) -> ImportResult<FilePreview> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开 Excel 文件（按内容自动识别 xls / xlsx）
        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet；无工作表视为空文件
        let sheet_name = match workbook.sheet_names().first() {
            Some(name) => name.clone(),
            None => {
                return Ok(FilePreview {
                    file_name: file_name_of(path),
                    headers: vec![],
                    rows: vec![],
                })
            }
        };
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = match sheet_rows.next() {
            Some(row) => row,
            None => {
                return Ok(FilePreview {
                    file_name: file_name_of(path),
                    headers: vec![],
                    rows: vec![],
                })
            }
        };

        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_or_placeholder(&cell.to_string(), idx))
            .collect();

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            if rows.len() >= max_rows {
                break;
            }
            if let Some(row) = build_row(&headers, data_row.iter().map(|cell| cell.to_string())) {
                rows.push(row);
            }
        }

        Ok(FilePreview {
            file_name: file_name_of(path),
            headers,
            rows,
        })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P, max_rows: usize) -> ImportResult<FilePreview> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_preview(path, max_rows),
            "xlsx" | "xls" => ExcelParser.parse_preview(path, max_rows),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
