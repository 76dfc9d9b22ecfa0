use pricewatch_core::Asset;
use serde::Serialize;

use crate::commands::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct AssetsResponse {
    assets: Vec<AssetInfo>,
}

#[derive(Debug, Serialize)]
struct AssetInfo {
    id: &'static str,
    name: &'static str,
}

pub fn run() -> Result<CommandResult, CliError> {
    let assets = Asset::ALL
        .iter()
        .map(|asset| AssetInfo {
            id: asset.as_str(),
            name: asset.display_name(),
        })
        .collect::<Vec<_>>();

    let rows = assets
        .iter()
        .map(|info| vec![info.id.to_owned(), info.name.to_owned()])
        .collect();
    let data = serde_json::to_value(AssetsResponse { assets })?;

    Ok(CommandResult::ok(data).with_table(vec!["id", "name"], rows))
}
