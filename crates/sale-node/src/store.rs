// sale-node/src/store.rs

//! JSON persistence for the deployed ledger state

use token_sale::SaleLedger;

pub fn load_ledger(path: &str) -> anyhow::Result<SaleLedger> {
    let contents = std::fs::read_to_string(path)?;
    let ledger = serde_json::from_str(&contents)?;
    Ok(ledger)
}

pub fn save_ledger(path: &str, ledger: &SaleLedger) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(ledger)?;
    std::fs::write(path, contents)?;
    Ok(())
}
