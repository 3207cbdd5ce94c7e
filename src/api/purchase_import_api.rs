// ==========================================
// 采购单导入 API
// ==========================================
// 职责: 请求校验 → 合并 → 导入引擎；批次历史查询
// 契约: 请求 {fileName?, salesOrderNo?, items: [{partNumber, qty, description?}]}
//       响应 {batchId, salesOrderNo, createdParts, updatedParts, descriptionFilled, errorLines}
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::demand::RawDemandRow;
use crate::domain::purchase::{ImportBatch, ImportBatchDetail, ImportSummary};
use crate::engine::{DemandMerger, PurchaseImportEngine, StockRepositories};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// 批次列表上限
pub const MAX_BATCH_LIST_LIMIT: usize = 100;

/// 导入请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub sales_order_no: Option<String>,
    #[serde(default)]
    pub items: Vec<RawDemandRow>,
}

/// 导入响应
pub type ImportResponse = ImportSummary;

/// 采购单导入 API
pub struct PurchaseImportApi {
    repos: StockRepositories,
    config: Arc<ConfigManager>,
    merger: DemandMerger,
}

impl PurchaseImportApi {
    pub fn new(repos: StockRepositories, config: Arc<ConfigManager>) -> Self {
        Self {
            repos,
            config,
            merger: DemandMerger::new(),
        }
    }

    /// 导入采购单
    ///
    /// # 返回
    /// - Ok(ImportResponse): 导入汇总（单行失败计入 errorLines，不影响其他行）
    /// - Err(ApiError::InvalidInput): 请求为空或无有效行（不写库）
    /// - Err(ApiError::DuplicateImport): 销售订单已导入（不写库）
    #[instrument(skip(self, request), fields(rows = request.items.len()))]
    pub fn import(&self, request: &ImportRequest) -> ApiResult<ImportResponse> {
        if request.items.is_empty() {
            return Err(ApiError::InvalidInput("导入内容为空".to_string()));
        }

        let lines = self.merger.merge(&request.items);
        if lines.is_empty() {
            return Err(ApiError::InvalidInput(
                "导入内容中没有有效行（料号为空或数量 ≤ 0）".to_string(),
            ));
        }

        let file_name = match request
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(name) => name.to_string(),
            None => self.config.get_default_file_name()?,
        };
        let supplier = self.config.get_default_supplier()?;

        let engine = PurchaseImportEngine::new(self.repos.clone(), supplier);
        let summary = engine.import(&file_name, request.sales_order_no.as_deref(), &lines)?;
        Ok(summary)
    }

    /// 查询批次及其全部审计行
    pub fn get_batch(&self, batch_id: &str) -> ApiResult<ImportBatchDetail> {
        let batch_id = batch_id.trim();
        if batch_id.is_empty() {
            return Err(ApiError::InvalidInput("batch_id 不能为空".to_string()));
        }

        let batch = self
            .repos
            .batch_repo
            .find_by_id(batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("导入批次(id={})不存在", batch_id)))?;
        let lines = self.repos.batch_repo.list_lines(batch_id)?;

        Ok(ImportBatchDetail { batch, lines })
    }

    /// 最近的导入批次（新→旧），limit 钳制在 1..=100
    pub fn list_recent_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        let limit = limit.clamp(1, MAX_BATCH_LIST_LIMIT);
        Ok(self.repos.batch_repo.list_recent(limit)?)
    }
}
