//! Rendering of a calculated plan as text, JSON or CSV.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use plan_core::PlanResult;
use plan_core::calculations::common::round_half_up;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::{spaced_money, spaced_number};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// The full plan as pretty-printed JSON
    Json,
    /// One CSV row per tax regime
    Csv,
}

pub fn render<W: Write>(
    format: OutputFormat,
    result: &PlanResult<'_>,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => render_text(result, out),
        OutputFormat::Json => render_json(result, out),
        OutputFormat::Csv => render_csv(result, out),
    }
}

pub fn render_text<W: Write>(
    result: &PlanResult<'_>,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "=== Key figures ===")?;
    writeln!(
        out,
        "Monthly profit target: {} ₽",
        spaced_money(result.inputs.monthly_profit_target)
    )?;
    writeln!(out, "Daily profit target: {} ₽", spaced_money(result.daily_profit_target))?;
    writeln!(out, "Daily operational cost: {} ₽", spaced_money(result.daily_operational_cost))?;
    writeln!(
        out,
        "Monthly base (profit + costs): {} ₽",
        spaced_money(result.pre_tax_monthly_base)
    )?;
    writeln!(out, "Yearly profit goal: {} ₽", spaced_money(result.yearly_profit_goal))?;

    writeln!(out)?;
    match result.selected_entity_form {
        Some(form) => writeln!(out, "Entity form: {} ({})", form.title, form.code)?,
        None => writeln!(out, "Entity form: not selected")?,
    }
    if let Some(regime) = result.selected_tax_regime {
        writeln!(out, "Tax regime: {} ({})", regime.title, regime.code)?;
    }
    if let Some(checked_at) = result.snapshot.checked_at() {
        writeln!(out, "Regulatory data checked at: {}", checked_at.format("%Y-%m-%d %H:%M %:z"))?;
    }

    writeln!(out)?;
    if result.tax_rows.is_empty() {
        writeln!(out, "No tax regimes available for the selected entity form.")?;
    } else {
        writeln!(out, "Tax regimes:")?;
        for row in &result.tax_rows {
            writeln!(
                out,
                "- {}: revenue {} ₽/month, tax {} ₽/month (rate {}%)",
                row.title,
                spaced_money(row.projection.monthly_revenue),
                spaced_money(row.projection.tax_monthly),
                spaced_number(row.projection.rate_percent, 2),
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Sales breakdown:")?;
    for row in &result.sales_breakdown {
        writeln!(
            out,
            "- {} sales/day → {} ₽ net profit per sale, {} sales/month",
            row.sales_per_day,
            spaced_money(row.profit_per_sale),
            row.monthly_sales,
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Profitability:")?;
    for row in &result.profitability_rows {
        writeln!(
            out,
            "- margin {}% → revenue {} ₽/month, {} ₽/year",
            row.margin,
            spaced_number(row.monthly_revenue, 0),
            spaced_number(row.yearly_revenue, 0),
        )?;
    }

    Ok(())
}

pub fn render_json<W: Write>(
    result: &PlanResult<'_>,
    out: &mut W,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct CsvTaxRow<'a> {
    code: &'a str,
    title: &'a str,
    selected: bool,
    rate_percent: Decimal,
    daily_revenue: Decimal,
    monthly_revenue: Decimal,
    yearly_revenue: Decimal,
    tax_daily: Decimal,
    tax_monthly: Decimal,
    tax_yearly: Decimal,
    law_reference: Option<&'a str>,
}

pub fn render_csv<W: Write>(
    result: &PlanResult<'_>,
    out: &mut W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in &result.tax_rows {
        let projection = &row.projection;
        writer.serialize(CsvTaxRow {
            code: &row.code,
            title: &row.title,
            selected: result.selected_tax_code.as_deref() == Some(row.code.as_str()),
            rate_percent: round_half_up(projection.rate_percent),
            daily_revenue: round_half_up(projection.daily_revenue),
            monthly_revenue: round_half_up(projection.monthly_revenue),
            yearly_revenue: round_half_up(projection.yearly_revenue),
            tax_daily: round_half_up(projection.tax_daily),
            tax_monthly: round_half_up(projection.tax_monthly),
            tax_yearly: round_half_up(projection.tax_yearly),
            law_reference: row.law_reference.as_deref(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
