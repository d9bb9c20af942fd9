//! Oroswap pair contract interface

pub mod msg;
pub mod pool;

pub use msg::{Asset, AssetInfo, ExecuteMsg, PoolResponse, QueryMsg};
pub use pool::PoolState;
