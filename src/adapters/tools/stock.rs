//! Stock catalog - inventory arithmetic for professional sellers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::parse_args;
use crate::application::{RegistryError, Tool, ToolContext, ToolError, ToolRegistry};
use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ParamSpec, ParamType, ToolArguments, ToolDescriptor, ToolOutput};

pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(CalculateReorderPoint)?;
    registry.register(ForecastDemand)?;
    registry.register(ClassifyInventory)?;
    Ok(())
}

fn invalid(tool: &str, field: &str, reason: impl Into<String>) -> ToolError {
    ToolError::validation(tool, ValidationError::invalid_value(field, reason))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ════════════════════════════════════════════════════════════════════════════════
// calculate_reorder_point
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct ReorderArgs {
    daily_demand: f64,
    lead_time_days: f64,
    safety_stock: f64,
}

pub struct CalculateReorderPoint;

const TOOL_REORDER: &str = "calculate_reorder_point";

#[async_trait]
impl Tool for CalculateReorderPoint {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            TOOL_REORDER,
            "Stock level at which a new order should be placed",
        )
        .param(ParamSpec::required("daily_demand", ParamType::Number, "Units sold per day"))
        .param(ParamSpec::required("lead_time_days", ParamType::Number, "Days until delivery"))
        .param(
            ParamSpec::optional("safety_stock", ParamType::Number, "Buffer units")
                .with_default(json!(0)),
        )
        .returns(json!({"reorder_point": "integer"}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: ReorderArgs = parse_args(TOOL_REORDER, &args)?;
        for (field, value) in [
            ("daily_demand", args.daily_demand),
            ("lead_time_days", args.lead_time_days),
            ("safety_stock", args.safety_stock),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(TOOL_REORDER, field, "must be a non-negative number"));
            }
        }

        let lead_time_demand = args.daily_demand * args.lead_time_days;
        let reorder_point = (lead_time_demand + args.safety_stock).ceil() as u64;
        Ok(ToolOutput::Inline(json!({
            "reorder_point": reorder_point,
            "lead_time_demand": round2(lead_time_demand),
            "safety_stock": args.safety_stock,
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// forecast_demand
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    history: Vec<f64>,
    periods: u32,
    window: u32,
}

pub struct ForecastDemand;

const TOOL_FORECAST: &str = "forecast_demand";
const MAX_FORECAST_PERIODS: u32 = 52;

/// Rolling moving average: each forecast value feeds the next window.
pub fn moving_average_forecast(history: &[f64], window: usize, periods: usize) -> Vec<f64> {
    let window = window.clamp(1, history.len().max(1));
    let mut series: Vec<f64> = history.to_vec();
    let mut forecast = Vec::with_capacity(periods);
    for _ in 0..periods {
        let tail = &series[series.len().saturating_sub(window)..];
        let next = if tail.is_empty() {
            0.0
        } else {
            tail.iter().sum::<f64>() / tail.len() as f64
        };
        forecast.push(next);
        series.push(next);
    }
    forecast
}

#[async_trait]
impl Tool for ForecastDemand {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(TOOL_FORECAST, "Forecast demand with a moving average")
            .param(ParamSpec::required("history", ParamType::Array, "Past demand, oldest first"))
            .param(
                ParamSpec::optional("periods", ParamType::Integer, "Periods to forecast")
                    .with_default(json!(3)),
            )
            .param(
                ParamSpec::optional("window", ParamType::Integer, "Moving-average window")
                    .with_default(json!(3)),
            )
            .returns(json!({"forecast": ["number"], "method": "string"}))
            .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: ForecastArgs = parse_args(TOOL_FORECAST, &args)?;
        if args.history.is_empty() {
            return Err(invalid(TOOL_FORECAST, "history", "needs at least one value"));
        }
        if args.history.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid(TOOL_FORECAST, "history", "values must be non-negative"));
        }
        if args.periods == 0 || args.periods > MAX_FORECAST_PERIODS {
            return Err(invalid(
                TOOL_FORECAST,
                "periods",
                format!("must be between 1 and {}", MAX_FORECAST_PERIODS),
            ));
        }
        if args.window == 0 {
            return Err(invalid(TOOL_FORECAST, "window", "must be at least 1"));
        }

        let window = (args.window as usize).min(args.history.len());
        let forecast: Vec<f64> =
            moving_average_forecast(&args.history, window, args.periods as usize)
                .into_iter()
                .map(round2)
                .collect();
        Ok(ToolOutput::Inline(json!({
            "forecast": forecast,
            "method": "moving_average",
            "window": window,
            "total": round2(forecast.iter().sum()),
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// classify_inventory
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct InventoryItem {
    sku: String,
    annual_usage: f64,
    unit_cost: f64,
}

#[derive(Debug, Deserialize)]
struct ClassifyArgs {
    items: Vec<InventoryItem>,
}

pub struct ClassifyInventory;

const TOOL_CLASSIFY: &str = "classify_inventory";

/// Cumulative value share below which an item is class A.
const CLASS_A_SHARE: f64 = 0.80;
/// Cumulative value share below which an item is class B.
const CLASS_B_SHARE: f64 = 0.95;

#[async_trait]
impl Tool for ClassifyInventory {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            TOOL_CLASSIFY,
            "ABC-classify items by their share of annual consumption value",
        )
        .param(ParamSpec::required(
            "items",
            ParamType::Array,
            "Items as {sku, annual_usage, unit_cost}",
        ))
        .returns(json!({"items": [{"sku": "string", "class": "string"}], "summary": "object"}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: ClassifyArgs = parse_args(TOOL_CLASSIFY, &args)?;
        if args.items.is_empty() {
            return Err(invalid(TOOL_CLASSIFY, "items", "needs at least one item"));
        }
        if args
            .items
            .iter()
            .any(|i| i.annual_usage < 0.0 || i.unit_cost < 0.0)
        {
            return Err(invalid(TOOL_CLASSIFY, "items", "usage and cost must be non-negative"));
        }

        let mut valued: Vec<(String, f64)> = args
            .items
            .into_iter()
            .map(|i| (i.sku, i.annual_usage * i.unit_cost))
            .collect();
        valued.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let total: f64 = valued.iter().map(|(_, v)| v).sum();

        let mut counts = [0usize; 3];
        let mut cumulative = 0.0;
        let mut classified = Vec::with_capacity(valued.len());
        for (sku, value) in valued {
            let share = if total > 0.0 { value / total } else { 0.0 };
            let (class, slot) = if total <= 0.0 {
                ("C", 2)
            } else if cumulative < CLASS_A_SHARE {
                ("A", 0)
            } else if cumulative < CLASS_B_SHARE {
                ("B", 1)
            } else {
                ("C", 2)
            };
            cumulative += share;
            counts[slot] += 1;
            classified.push(json!({
                "sku": sku,
                "value": round2(value),
                "share": round2(share * 100.0),
                "class": class,
            }));
        }

        Ok(ToolOutput::Inline(json!({
            "items": classified,
            "total_value": round2(total),
            "summary": {"A": counts[0], "B": counts[1], "C": counts[2]},
        })))
    }
}
