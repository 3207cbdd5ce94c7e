// ==========================================
// 文件预览 / 列映射集成测试
// ==========================================
// 测试目标: CSV 预览 → 列猜测 → 映射 → 采购单导入
// ==========================================

mod test_helpers;

use component_stock::api::ApiError;
use component_stock::config::config_keys;
use component_stock::importer::{ColumnMapping, MappingProfile};
use component_stock::logging;
use serde_json::Value;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};
use test_helpers::{create_seeded_state, create_test_state};

const MOUSER_CSV: &str = "\u{feff}Mouser No:;Mfr. No:;Desc.:;Order Qty.;Sales Order No.\n\
595-X1;res_10k;Resistor;100;\n\
;;;;\n\
595-X2;NEW_CAP;Capacitor 22pF;12,5;SO-777\n\
595-X3;NEW_CAP;Capacitor 22pF C0G 0603;8;SO-778\n\
595-X4;;orphan;4;SO-779\n";

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_preview_mouser_csv() {
    logging::init_test();
    let (_tmp, state) = create_test_state().unwrap();
    let file = temp_file(".csv", MOUSER_CSV);

    let response = state
        .preview_api
        .preview(file.path(), MappingProfile::PurchaseOrder, None)
        .unwrap();

    assert_eq!(response.preview.headers.len(), 5);
    assert_eq!(response.preview.headers[0], "Mouser No:");
    // 空白行被跳过
    assert_eq!(response.preview.rows.len(), 4);
    assert_eq!(
        response.suggested_mapping,
        ColumnMapping {
            part_number: Some("Mfr. No:".to_string()),
            quantity: Some("Order Qty.".to_string()),
            description: Some("Desc.:".to_string()),
            sales_order: Some("Sales Order No.".to_string()),
        }
    );

    let value = serde_json::to_value(&response).unwrap();
    assert!(value["fileName"].as_str().unwrap().ends_with(".csv"));
    assert!(value["suggestedMapping"]["partNumber"].is_string());
}

#[test]
fn test_preview_respects_max_rows_config() {
    logging::init_test();
    let (_tmp, state) = create_test_state().unwrap();
    state
        .config
        .set_config_value(config_keys::PREVIEW_MAX_ROWS, "2")
        .unwrap();
    let file = temp_file(".csv", MOUSER_CSV);

    let configured = state
        .preview_api
        .preview(file.path(), MappingProfile::PurchaseOrder, None)
        .unwrap();
    assert_eq!(configured.preview.rows.len(), 2);

    let explicit = state
        .preview_api
        .preview(file.path(), MappingProfile::PurchaseOrder, Some(3))
        .unwrap();
    assert_eq!(explicit.preview.rows.len(), 3);
}

#[test]
fn test_preview_bom_profile_czech_headers() {
    logging::init_test();
    let (_tmp, state) = create_test_state().unwrap();
    let file = temp_file(".csv", "Pozice,Součástka,Počet ks\nR1,RES_10K,4\n");

    let response = state
        .preview_api
        .preview(file.path(), MappingProfile::Bom, None)
        .unwrap();

    assert_eq!(response.suggested_mapping.part_number.as_deref(), Some("Součástka"));
    assert_eq!(response.suggested_mapping.quantity.as_deref(), Some("Počet ks"));
    assert_eq!(response.suggested_mapping.sales_order, None);
}

#[test]
fn test_prepare_and_import_mouser_file() {
    logging::init_test();
    let (_tmp, state) = create_seeded_state().unwrap();
    let file = temp_file(".csv", MOUSER_CSV);

    let request = state.preview_api.prepare_import(file.path()).unwrap();

    // 第一条有效行的销售订单号为空，取下一条有效行
    assert_eq!(request.sales_order_no.as_deref(), Some("SO-777"));
    assert_eq!(request.items.len(), 4);
    assert_eq!(request.items[1].qty, Value::from(12));

    let summary = state.purchase_import_api.import(&request).unwrap();
    assert_eq!(summary.created_parts, 1);
    assert_eq!(summary.updated_parts, 1);

    let cap = state.part_repo.find_by_part_number("NEW_CAP").unwrap().unwrap();
    assert_eq!(cap.description.as_deref(), Some("Capacitor 22pF C0G 0603"));
    let inv = state.part_repo.get_inventory(&cap.id).unwrap().unwrap();
    assert_eq!(inv.on_order, 20);

    // 同一文件再次导入被拦截
    let again = state.purchase_import_api.import(&request);
    assert!(matches!(again, Err(ApiError::DuplicateImport { .. })));
}

#[test]
fn test_map_rows_requires_part_and_quantity_columns() {
    logging::init_test();
    let (_tmp, state) = create_test_state().unwrap();

    let result = state.preview_api.map_rows(&[], &ColumnMapping::default());
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_preview_errors() {
    logging::init_test();
    let (_tmp, state) = create_test_state().unwrap();

    let unsupported = temp_file(".pdf", "not a table");
    let result = state
        .preview_api
        .preview(unsupported.path(), MappingProfile::Bom, None);
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let missing = state
        .preview_api
        .preview("/nonexistent/order.csv", MappingProfile::Bom, None);
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

fn xlsx_fixture() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mouser_order.xlsx")
}

#[test]
fn test_preview_mouser_xlsx() {
    logging::init_test();
    let (_tmp, state) = create_test_state().unwrap();

    let response = state
        .preview_api
        .preview(xlsx_fixture(), MappingProfile::PurchaseOrder, None)
        .unwrap();

    assert_eq!(response.preview.headers[1], "COL_2");
    assert_eq!(response.preview.rows.len(), 3);
    assert_eq!(response.preview.rows[0]["Order Qty."], "12");
    assert_eq!(response.suggested_mapping.part_number.as_deref(), Some("Mfr. No:"));
    assert_eq!(response.suggested_mapping.quantity.as_deref(), Some("Order Qty."));

    let limited = state
        .preview_api
        .preview(xlsx_fixture(), MappingProfile::PurchaseOrder, Some(1))
        .unwrap();
    assert_eq!(limited.preview.rows.len(), 1);
}

#[test]
fn test_prepare_and_import_mouser_xlsx() {
    logging::init_test();
    let (_tmp, state) = create_seeded_state().unwrap();

    let request = state.preview_api.prepare_import(xlsx_fixture()).unwrap();
    assert_eq!(request.sales_order_no.as_deref(), Some("SO-XLSX"));
    assert_eq!(request.file_name.as_deref(), Some("mouser_order.xlsx"));
    assert_eq!(request.items.len(), 3);

    let summary = state.purchase_import_api.import(&request).unwrap();
    assert_eq!(summary.created_parts, 1);
    assert_eq!(summary.updated_parts, 1);
    assert_eq!(summary.error_lines, 0);

    let res = state.part_repo.find_by_part_number("RES_10K").unwrap().unwrap();
    assert_eq!(state.part_repo.get_inventory(&res.id).unwrap().unwrap().on_order, 212);

    let cap = state.part_repo.find_by_part_number("XLS_CAP").unwrap().unwrap();
    assert_eq!(cap.description.as_deref(), Some("Capacitor 22pF C0G 0603"));
    assert_eq!(state.part_repo.get_inventory(&cap.id).unwrap().unwrap().on_order, 20);
}
