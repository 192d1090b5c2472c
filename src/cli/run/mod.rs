//! Run command - executes one chain and prints the JSON result

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::{Map, Value};

use crate::domain::{ChainId, TenantId};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Tenant that owns the chain
    #[arg(long)]
    pub tenant: String,

    /// Chain to run
    #[arg(long)]
    pub chain: String,

    /// JSON object used as the initial context; `-` reads stdin
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    if config.storage.seed_file.is_none() {
        tracing::warn!("No storage.seed_file configured, the stores are empty");
    }

    let tenant_id = TenantId::new(&args.tenant)?;
    let chain_id = ChainId::new(&args.chain)?;
    let input = match &args.input {
        Some(path) => parse_input(&read_input(path)?)?,
        None => Map::new(),
    };

    let state = crate::create_app_state(&config).await?;
    let result = state
        .chain_service
        .execute(&tenant_id, &chain_id, input)
        .await
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_input(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read input from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file '{}'", path.display()))
}

fn parse_input(text: &str) -> anyhow::Result<Map<String, Value>> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str(text).context("Input is not valid JSON")? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => anyhow::bail!("Input must be a JSON object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        let map = parse_input(r#"{"document_text": "Hi"}"#).unwrap();
        assert_eq!(map["document_text"], "Hi");

        assert!(parse_input("").unwrap().is_empty());
        assert!(parse_input("null").unwrap().is_empty());
        assert!(parse_input("[1]").is_err());
        assert!(parse_input("{not json").is_err());
    }
}
