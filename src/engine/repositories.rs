// ==========================================
// 元器件库存系统 - 引擎层仓储聚合
// ==========================================
// 职责: 定义引擎所需的存储接口，并以具体 Repository 聚合实现
// 目标: 引擎只依赖 trait，单元测试可用内存实现替换整个存储层
// ==========================================

use std::sync::Arc;

use crate::domain::part::{Part, PartStockView};
use crate::domain::purchase::{ImportBatch, ImportLine};
use crate::repository::{ImportBatchRepository, PartRepository, RepositoryResult};

// ==========================================
// 存储接口
// ==========================================

/// 核对所需的只读查询
pub trait StockLookup {
    /// 按规范化料号加载料号视图；未建档的料号不返回
    fn load_stock_views(&self, part_numbers: &[String]) -> RepositoryResult<Vec<PartStockView>>;
}

/// 采购导入所需的读写操作
pub trait PurchaseImportStore {
    fn find_batch_by_sales_order_no(
        &self,
        sales_order_no: &str,
    ) -> RepositoryResult<Option<ImportBatch>>;

    /// sales_order_no 冲突时必须返回 UniqueConstraintViolation
    fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()>;

    fn find_parts_by_numbers(&self, part_numbers: &[String]) -> RepositoryResult<Vec<Part>>;

    /// 新建料号 + 库存（on_order = qty），原子执行
    fn create_part_with_on_order(&self, part: &Part, on_order: i64) -> RepositoryResult<()>;

    /// 在途累加 + 可选回填描述，原子执行；返回是否回填
    fn add_on_order(
        &self,
        part_id: &str,
        qty: i64,
        description: Option<&str>,
    ) -> RepositoryResult<bool>;

    fn insert_line(&self, line: &ImportLine) -> RepositoryResult<()>;
}

// ==========================================
// StockRepositories - SQLite 实现
// ==========================================

/// 元器件库存仓储集合
///
/// 两个仓储共享同一个连接（见 `AppState::new`）。
#[derive(Clone)]
pub struct StockRepositories {
    pub part_repo: Arc<PartRepository>,
    pub batch_repo: Arc<ImportBatchRepository>,
}

impl StockRepositories {
    pub fn new(part_repo: Arc<PartRepository>, batch_repo: Arc<ImportBatchRepository>) -> Self {
        Self {
            part_repo,
            batch_repo,
        }
    }
}

impl StockLookup for StockRepositories {
    fn load_stock_views(&self, part_numbers: &[String]) -> RepositoryResult<Vec<PartStockView>> {
        self.part_repo.load_stock_views(part_numbers)
    }
}

impl PurchaseImportStore for StockRepositories {
    fn find_batch_by_sales_order_no(
        &self,
        sales_order_no: &str,
    ) -> RepositoryResult<Option<ImportBatch>> {
        self.batch_repo.find_by_sales_order_no(sales_order_no)
    }

    fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        self.batch_repo.insert_batch(batch)
    }

    fn find_parts_by_numbers(&self, part_numbers: &[String]) -> RepositoryResult<Vec<Part>> {
        self.part_repo.find_by_part_numbers(part_numbers)
    }

    fn create_part_with_on_order(&self, part: &Part, on_order: i64) -> RepositoryResult<()> {
        self.part_repo.create_with_on_order(part, on_order)
    }

    fn add_on_order(
        &self,
        part_id: &str,
        qty: i64,
        description: Option<&str>,
    ) -> RepositoryResult<bool> {
        self.part_repo.add_on_order(part_id, qty, description)
    }

    fn insert_line(&self, line: &ImportLine) -> RepositoryResult<()> {
        self.batch_repo.insert_line(line)
    }
}
