// ==========================================
// 文件预览 API
// ==========================================
// 职责: 表格文件预览 + 列猜测 + 按列映射生成导入请求
// ==========================================

use crate::api::error::ApiResult;
use crate::api::purchase_import_api::ImportRequest;
use crate::config::ConfigManager;
use crate::importer::{
    map_preview_rows, ColumnGuesser, ColumnMapping, FilePreview, MappedRows, MappingProfile,
    PreviewRow, UniversalFileParser,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// 预览响应: 文件内容 + 建议列映射
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePreviewResponse {
    #[serde(flatten)]
    pub preview: FilePreview,
    pub suggested_mapping: ColumnMapping,
}

/// 文件预览 API
pub struct FilePreviewApi {
    config: Arc<ConfigManager>,
    parser: UniversalFileParser,
}

impl FilePreviewApi {
    pub fn new(config: Arc<ConfigManager>) -> Self {
        Self {
            config,
            parser: UniversalFileParser,
        }
    }

    /// 预览文件
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx / .xls
    /// - profile: 列猜测方案
    /// - max_rows: 最多返回行数（None → 配置 preview.max_rows）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn preview<P: AsRef<Path>>(
        &self,
        file_path: P,
        profile: MappingProfile,
        max_rows: Option<usize>,
    ) -> ApiResult<FilePreviewResponse> {
        let max_rows = match max_rows {
            Some(n) => n,
            None => self.config.get_preview_max_rows()?,
        };

        let preview = self.parser.parse(file_path.as_ref(), max_rows)?;
        let suggested_mapping = ColumnGuesser::new(profile).guess_all(&preview.headers);

        tracing::debug!(
            "文件预览: headers={}, rows={}, mapping={:?}",
            preview.headers.len(),
            preview.rows.len(),
            suggested_mapping
        );

        Ok(FilePreviewResponse {
            preview,
            suggested_mapping,
        })
    }

    /// 按选定列转换预览行
    pub fn map_rows(&self, rows: &[PreviewRow], mapping: &ColumnMapping) -> ApiResult<MappedRows> {
        Ok(map_preview_rows(rows, mapping)?)
    }

    /// 读取整个采购单文件并按猜测的列生成导入请求
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn prepare_import<P: AsRef<Path>>(&self, file_path: P) -> ApiResult<ImportRequest> {
        let preview = self.parser.parse(file_path.as_ref(), usize::MAX)?;
        let mapping = ColumnGuesser::new(MappingProfile::PurchaseOrder).guess_all(&preview.headers);
        let mapped = map_preview_rows(&preview.rows, &mapping)?;

        Ok(ImportRequest {
            file_name: Some(preview.file_name),
            sales_order_no: mapped.sales_order_no,
            items: mapped.items,
        })
    }
}
