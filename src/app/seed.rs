// ==========================================
// 元器件库存系统 - 演示数据
// ==========================================
// 幂等: 已存在的料号/料站/挂料关系保持不变
// ==========================================

use crate::domain::part::{InventorySnapshot, NewPart};
use crate::repository::{FeederRepository, PartRepository, RepositoryResult};
use serde::{Deserialize, Serialize};

struct SeedPart {
    part_number: &'static str,
    description: &'static str,
    moq: i64,
    order_multiple: i64,
    inventory: InventorySnapshot,
    feeder_no: Option<&'static str>,
}

const SEED_FEEDERS: &[&str] = &["F01", "F02", "F15"];

const SEED_PARTS: &[SeedPart] = &[
    SeedPart {
        part_number: "RES_10K",
        description: "Resistor 10k 0603",
        moq: 100,
        order_multiple: 100,
        inventory: InventorySnapshot {
            on_hand: 50,
            reserved: 0,
            on_order: 200,
        },
        feeder_no: Some("F01"),
    },
    SeedPart {
        part_number: "CAP_1UF",
        description: "Capacitor 1uF 0603",
        moq: 1,
        order_multiple: 1,
        inventory: InventorySnapshot {
            on_hand: 500,
            reserved: 0,
            on_order: 0,
        },
        feeder_no: Some("F02"),
    },
    SeedPart {
        part_number: "IC_ATMEGA328P",
        description: "MCU ATmega328P",
        moq: 1,
        order_multiple: 1,
        inventory: InventorySnapshot {
            on_hand: 0,
            reserved: 0,
            on_order: 50,
        },
        feeder_no: None,
    },
    SeedPart {
        part_number: "LED_RED_0603",
        description: "LED red 0603",
        moq: 20,
        order_multiple: 20,
        inventory: InventorySnapshot {
            on_hand: 200,
            reserved: 0,
            on_order: 0,
        },
        feeder_no: None,
    },
];

/// 写入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub parts_created: usize,
    pub parts_skipped: usize,
    pub feeders: usize,
}

/// 写入演示数据
pub fn seed_demo_data(
    part_repo: &PartRepository,
    feeder_repo: &FeederRepository,
) -> RepositoryResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    for feeder_no in SEED_FEEDERS {
        feeder_repo.ensure_feeder(feeder_no)?;
        summary.feeders += 1;
    }

    for seed in SEED_PARTS {
        let part = match part_repo.find_by_part_number(seed.part_number)? {
            Some(existing) => {
                summary.parts_skipped += 1;
                existing
            }
            None => {
                let part = NewPart {
                    part_number: seed.part_number.to_string(),
                    description: Some(seed.description.to_string()),
                    supplier: None,
                    moq: Some(seed.moq),
                    order_multiple: Some(seed.order_multiple),
                }
                .into_part();
                part_repo.insert(&part)?;
                part_repo.upsert_inventory(&part.id, &seed.inventory)?;
                summary.parts_created += 1;
                part
            }
        };

        if let Some(feeder_no) = seed.feeder_no {
            let feeder = feeder_repo.ensure_feeder(feeder_no)?;
            feeder_repo.ensure_assigned(&part.id, &feeder.id)?;
        }
    }

    tracing::info!(
        "演示数据写入完成: created={}, skipped={}",
        summary.parts_created,
        summary.parts_skipped
    );
    Ok(summary)
}
