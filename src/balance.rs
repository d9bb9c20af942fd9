//! Balance oracle

use crate::chain::Gateway;
use crate::tokens::from_micro;
use crate::Result;

/// Current balance of `denom` held by `address`, in decimal units.
///
/// Always reads the chain; nothing is cached between calls.
pub async fn decimal_balance(gateway: &Gateway, address: &str, denom: &str) -> Result<f64> {
    let raw = gateway.get_balance(address, denom).await?;
    Ok(from_micro(raw))
}
