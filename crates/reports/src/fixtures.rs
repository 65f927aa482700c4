//! Sample data used to seed a fresh deployment and by tests.

use chrono::NaiveDate;

use feira_core::Money;

use crate::expired::{CycleCadence, DisposalAction, ExpiredEntry};
use crate::harvest::{HarvestActivity, HarvestPhase};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn entry(
    id: u64,
    product: &str,
    quantity: f64,
    unit: &str,
    expiry_date: NaiveDate,
    cadence: CycleCadence,
    cycle_ref: &str,
    action: DisposalAction,
    reason: &str,
    supplier: &str,
    cents: u64,
) -> ExpiredEntry {
    ExpiredEntry {
        id,
        product: product.into(),
        quantity,
        unit: unit.into(),
        expiry_date,
        cadence,
        cycle_ref: cycle_ref.into(),
        action,
        reason: reason.into(),
        supplier: supplier.into(),
        original_value: Money::from_cents(cents),
    }
}

pub fn sample_expired_log() -> Vec<ExpiredEntry> {
    vec![
        entry(
            1,
            "Tomate Orgânico",
            12.0,
            "kg",
            ymd(2024, 1, 15),
            CycleCadence::Weekly,
            "Semana 3 - Janeiro",
            DisposalAction::RemovedFromStock,
            "Vencimento próximo",
            "João Silva",
            5400,
        ),
        entry(
            2,
            "Alface Hidropônica",
            8.0,
            "unidades",
            ymd(2024, 1, 12),
            CycleCadence::Biweekly,
            "Quinzena 1 - Janeiro",
            DisposalAction::Discarded,
            "Deterioração",
            "Maria Santos",
            2240,
        ),
        entry(
            3,
            "Cenoura Baby",
            5.0,
            "kg",
            ymd(2024, 1, 10),
            CycleCadence::Weekly,
            "Semana 2 - Janeiro",
            DisposalAction::Donated,
            "Aparência comprometida",
            "Fazenda Verde",
            3100,
        ),
        entry(
            4,
            "Rúcula Orgânica",
            15.0,
            "maços",
            ymd(2024, 1, 8),
            CycleCadence::Weekly,
            "Semana 1 - Janeiro",
            DisposalAction::Composted,
            "Vencimento",
            "Cooperativa Rural",
            4200,
        ),
    ]
}

pub fn sample_harvest_schedule() -> Vec<HarvestActivity> {
    vec![
        HarvestActivity {
            id: 1,
            product: "Tomate Orgânico".into(),
            planting_date: ymd(2024, 2, 15),
            harvest_date: ymd(2024, 3, 20),
            estimated_kg: 120.0,
            phase: HarvestPhase::Harvest,
        },
        HarvestActivity {
            id: 2,
            product: "Alface Hidropônica".into(),
            planting_date: ymd(2024, 1, 10),
            harvest_date: ymd(2024, 2, 25),
            estimated_kg: 45.0,
            phase: HarvestPhase::Planting,
        },
        HarvestActivity {
            id: 3,
            product: "Cenoura Baby".into(),
            planting_date: ymd(2024, 3, 1),
            harvest_date: ymd(2024, 5, 15),
            estimated_kg: 80.0,
            phase: HarvestPhase::Preparation,
        },
    ]
}
