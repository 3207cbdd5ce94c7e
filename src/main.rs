// ==========================================
// 元器件库存系统 - 命令行入口
// ==========================================
// 用法:
//   component-stock [--db PATH] <command>
//
//   reconcile <req.json>                      BOM 缺料核对
//   import <req.json | order.xlsx|.xls|.csv>  采购单导入
//   preview <file> [--profile bom|po] [--max-rows N]
//   batch <batch_id>                          批次详情
//   batches [limit]                           最近批次
//   seed                                      写入演示数据
//   health                                    健康检查
//
// 结果以 JSON 输出到 stdout；失败时输出 ErrorResponse 并以状态码 1 退出
// ==========================================

use component_stock::api::{ApiError, ApiResult, ErrorResponse, ImportRequest, ReconcileRequest};
use component_stock::app::{get_default_db_path, AppState};
use component_stock::importer::MappingProfile;
use component_stock::logging;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const USAGE: &str = "用法: component-stock [--db PATH] <reconcile|import|preview|batch|batches|seed|health> [参数]";

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            let response = ErrorResponse::from(&err);
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| err.to_string())
            );
            std::process::exit(1);
        }
    }
}

fn run(args: Vec<String>) -> ApiResult<String> {
    let mut args = args.into_iter().peekable();

    let mut db_path: Option<String> = None;
    if args.peek().map(String::as_str) == Some("--db") {
        args.next();
        db_path = Some(
            args.next()
                .ok_or_else(|| ApiError::InvalidInput("--db 需要路径参数".to_string()))?,
        );
    }
    let db_path = db_path.unwrap_or_else(get_default_db_path);

    let command = args
        .next()
        .ok_or_else(|| ApiError::InvalidInput(USAGE.to_string()))?;
    let rest: Vec<String> = args.collect();

    let state = AppState::new(&db_path)?;

    match command.as_str() {
        "reconcile" => {
            let request: ReconcileRequest = read_json(required_arg(&rest, 0, "req.json")?)?;
            to_json(&state.bom_api.reconcile(&request)?)
        }
        "import" => {
            let source = required_arg(&rest, 0, "req.json | order.xlsx")?;
            let request: ImportRequest = if is_json_path(source) {
                read_json(source)?
            } else {
                state.preview_api.prepare_import(source)?
            };
            to_json(&state.purchase_import_api.import(&request)?)
        }
        "preview" => {
            let file = required_arg(&rest, 0, "file")?;
            let profile = match option_value(&rest, "--profile").as_deref() {
                None | Some("bom") => MappingProfile::Bom,
                Some("po") => MappingProfile::PurchaseOrder,
                Some(other) => {
                    return Err(ApiError::InvalidInput(format!(
                        "未知的 profile: {}（可选 bom / po）",
                        other
                    )))
                }
            };
            let max_rows = match option_value(&rest, "--max-rows") {
                Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                    ApiError::InvalidInput(format!("--max-rows 需要正整数: {}", raw))
                })?),
                None => None,
            };
            to_json(&state.preview_api.preview(file, profile, max_rows)?)
        }
        "batch" => {
            let batch_id = required_arg(&rest, 0, "batch_id")?;
            to_json(&state.purchase_import_api.get_batch(batch_id)?)
        }
        "batches" => {
            let limit = match rest.first() {
                Some(raw) => raw.parse::<usize>().map_err(|_| {
                    ApiError::InvalidInput(format!("limit 需要正整数: {}", raw))
                })?,
                None => 20,
            };
            to_json(&state.purchase_import_api.list_recent_batches(limit)?)
        }
        "seed" => to_json(&state.seed_demo_data()?),
        "health" => to_json(&state.health_check()?),
        other => Err(ApiError::InvalidInput(format!("未知命令: {}\n{}", other, USAGE))),
    }
}

fn required_arg<'a>(rest: &'a [String], idx: usize, name: &str) -> ApiResult<&'a str> {
    rest.get(idx)
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .ok_or_else(|| ApiError::InvalidInput(format!("缺少参数 <{}>\n{}", name, USAGE)))
}

fn option_value(rest: &[String], flag: &str) -> Option<String> {
    rest.iter()
        .position(|a| a == flag)
        .and_then(|pos| rest.get(pos + 1))
        .cloned()
}

fn is_json_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn read_json<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
    if !Path::new(path).exists() {
        return Err(ApiError::NotFound(format!("文件不存在: {}", path)));
    }
    let raw = std::fs::read_to_string(path).with_context(|| format!("无法读取 {}", path))?;
    serde_json::from_str(&raw)
        .map_err(|e| ApiError::InvalidInput(format!("JSON 格式错误 ({}): {}", path, e)))
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InternalError(format!("结果序列化失败: {}", e)))
}
