//! Check-condition command

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use crate::domain::{Condition, ExecutionContext};

#[derive(Args, Clone, Debug)]
pub struct CheckConditionArgs {
    /// Condition expression, e.g. `summary is present and lead_data.Company != ""`
    pub expr: String,

    /// JSON object to evaluate against; the condition is only parsed when absent
    #[arg(long)]
    pub context: Option<String>,
}

pub fn run(args: CheckConditionArgs) -> anyhow::Result<()> {
    println!("{}", check(&args)?);
    Ok(())
}

/// Returns `valid` when no context is given, otherwise the evaluation result
fn check(args: &CheckConditionArgs) -> anyhow::Result<String> {
    let condition = Condition::parse(&args.expr)?;

    let Some(context) = &args.context else {
        return Ok("valid".to_string());
    };

    let value: Value = serde_json::from_str(context).context("Context is not valid JSON")?;
    let context = ExecutionContext::from_value(value)?;

    Ok(condition.evaluate(&context)?.to_string())
}
