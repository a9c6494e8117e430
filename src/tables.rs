use std::collections::BTreeMap;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    engine::RateEngine,
    meter::Reading,
    quantity::cost::Cost,
    tariff::{RateTier, Tariff},
};

const USAGE_TIERS: [RateTier; 3] = [RateTier::OffPeak, RateTier::OnPeak, RateTier::Discount];

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn missing_cell() -> Cell {
    Cell::new("-").add_attribute(Attribute::Dim).set_alignment(CellAlignment::Right)
}

/// Cost per tariff, the cheapest one highlighted.
#[must_use]
pub fn build_costs_table(costs: &[(&Tariff, Cost)]) -> Table {
    let cheapest = costs.iter().map(|(_, cost)| *cost).min();

    let mut table = new_table();
    table.set_header(vec!["Tariff", "Critical peak", "Cost"]);
    for (tariff, cost) in costs {
        table.add_row(vec![
            Cell::new(&tariff.name),
            if tariff.critical {
                Cell::new("yes")
            } else {
                Cell::new("no").add_attribute(Attribute::Dim)
            },
            Cell::new(cost).set_alignment(CellAlignment::Right).fg(if Some(*cost) == cheapest {
                Color::Green
            } else {
                Color::Reset
            }),
        ]);
    }
    table
}

#[must_use]
pub fn build_rates_table(tariffs: &[Tariff]) -> Table {
    let mut table = new_table();
    table.set_header(
        std::iter::once("Tariff".to_owned())
            .chain(RateTier::ALL.iter().map(ToString::to_string))
            .collect::<Vec<_>>(),
    );
    for tariff in tariffs {
        let prices: BTreeMap<_, _> = tariff.rates.iter().collect();
        let mut row = vec![Cell::new(&tariff.name)];
        row.extend(RateTier::ALL.iter().map(|tier| {
            prices.get(tier).map_or_else(missing_cell, |price| {
                Cell::new(price).set_alignment(CellAlignment::Right)
            })
        }));
        table.add_row(row);
    }
    table
}

/// Consumption billed under each tier of every tariff.
#[must_use]
pub fn build_usage_table(engine: &RateEngine, tariffs: &[Tariff], readings: &[Reading]) -> Table {
    let mut table = new_table();
    table.set_header(
        std::iter::once("Tariff".to_owned())
            .chain(USAGE_TIERS.iter().map(ToString::to_string))
            .collect::<Vec<_>>(),
    );
    for tariff in tariffs {
        let usage = engine.usage_by_tier(&tariff.rates, readings);
        let mut row = vec![Cell::new(&tariff.name)];
        row.extend(USAGE_TIERS.iter().map(|tier| {
            usage.get(tier).map_or_else(missing_cell, |energy| {
                Cell::new(energy).set_alignment(CellAlignment::Right)
            })
        }));
        table.add_row(row);
    }
    table
}
