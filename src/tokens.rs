//! Shared token registry
//!
//! Holds the fixed set of Oroswap pairs traded against the native ZIG unit and
//! the micro-unit conversions used on the wire.

use serde::{Deserialize, Serialize};

/// Native (fee and settlement) denomination
pub const NATIVE_DENOM: &str = "uzig";

/// Display symbol of the native unit
pub const NATIVE_SYMBOL: &str = "ZIG";

/// On-chain amounts are decimal amounts scaled by 10^6
pub const MICRO_SCALE: f64 = 1_000_000.0;

/// One swappable / liquidity-eligible asset paired against the native unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Display symbol (e.g. "ORO")
    pub symbol: String,
    /// Bank denomination of the token
    pub denom: String,
    /// Pair contract address
    pub contract: String,
}

impl TokenPair {
    pub fn new(symbol: &str, denom: &str, contract: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            denom: denom.to_string(),
            contract: contract.to_string(),
        }
    }
}

/// Oroswap testnet pairs, in trading order
pub fn default_pairs() -> Vec<TokenPair> {
    vec![
        TokenPair::new(
            "ORO",
            "coin.zig10rfjm85jmzfhravjwpq3hcdz8ngxg7lxd0drkr.uoro",
            "zig15jqg0hmp9n06q0as7uk3x9xkwr9k3r7yh4ww2uc0hek8zlryrgmsamk4qg",
        ),
        TokenPair::new(
            "NFA",
            "coin.zig1qaf4dvjt5f8naam2mzpmysjm5e8sp2yhrzex8d.nfa",
            "zig1dye3zfsn83jmnxqdplkfmelyszhkve9ae6jfxf5mzgqnuylr0sdq8ng9tv",
        ),
        TokenPair::new(
            "CULTCOIN",
            "coin.zig12jgpgq5ec88nwzkkjx7jyrzrljpph5pnags8sn.ucultcoin",
            "zig1j55nw46crxkm03fjdf3cqx3py5cd32jny685x9c3gftfdt2xlvjs63znce",
        ),
        TokenPair::new(
            "DYOR",
            "coin.zig1fepzhtkq2r5gc4prq94yukg6vaqjvkam27gwk3.dyor",
            "zig1us8t6pklp2v2pjqnnedg9wnp3pv50kl448csv0lsuad599ef56jsyvakl9",
        ),
        TokenPair::new(
            "BEE",
            "coin.zig1ptxpjgl3lsxrq99zl6ad2nmrx4lhnhne26m6ys.bee",
            "zig1r50m5lafnmctat4xpvwdpzqndynlxt2skhr4fhzh76u0qar2y9hqu74u5h",
        ),
    ]
}

/// Look up a pair by its display symbol
pub fn find_pair<'a>(pairs: &'a [TokenPair], symbol: &str) -> Option<&'a TokenPair> {
    pairs.iter().find(|p| p.symbol == symbol)
}

/// Decimal amount to integer micro-units, truncating toward zero.
///
/// Negative and non-finite inputs map to zero.
pub fn to_micro(amount: f64) -> u128 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    (amount * MICRO_SCALE).floor() as u128
}

/// Integer micro-units to a decimal amount
pub fn from_micro(amount: u128) -> f64 {
    amount as f64 / MICRO_SCALE
}
