// ==========================================
// BOM 缺料核对 API
// ==========================================
// 职责: 请求行 → 合并 → 加载库存视图 → 核对
// 契约: 请求 {items: [{partNumber, qty}]} / 响应 {items: [ReconciliationResult]}
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::demand::RawDemandRow;
use crate::domain::reconciliation::ReconciliationResult;
use crate::engine::{DemandMerger, Reconciler, StockLookup};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// 核对请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default)]
    pub items: Vec<RawDemandRow>,
}

/// 核对响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub items: Vec<ReconciliationResult>,
}

/// BOM 核对 API
pub struct BomApi {
    stock: Arc<dyn StockLookup + Send + Sync>,
    merger: DemandMerger,
    reconciler: Reconciler,
}

impl BomApi {
    pub fn new(stock: Arc<dyn StockLookup + Send + Sync>) -> Self {
        Self {
            stock,
            merger: DemandMerger::new(),
            reconciler: Reconciler::new(),
        }
    }

    /// 核对 BOM
    ///
    /// # 返回
    /// - Ok(ReconcileResponse): 每个料号一行，顺序为料号首次出现顺序
    /// - Err(ApiError::InvalidInput): 请求为空或合并后无有效行
    #[instrument(skip(self, request), fields(rows = request.items.len()))]
    pub fn reconcile(&self, request: &ReconcileRequest) -> ApiResult<ReconcileResponse> {
        if request.items.is_empty() {
            return Err(ApiError::InvalidInput("BOM 为空".to_string()));
        }

        let lines = self.merger.merge(&request.items);
        if lines.is_empty() {
            return Err(ApiError::InvalidInput(
                "BOM 中没有有效行（料号为空或数量 ≤ 0）".to_string(),
            ));
        }

        let part_numbers: Vec<String> = lines.iter().map(|l| l.part_number.clone()).collect();
        let stock = self.stock.load_stock_views(&part_numbers)?;
        let items = self.reconciler.reconcile(&lines, &stock);

        tracing::info!(
            "BOM 核对完成: 原始行={}, 料号={}, 已建档={}",
            request.items.len(),
            items.len(),
            stock.len()
        );

        Ok(ReconcileResponse { items })
    }
}
