//! Substrate JSON-RPC method names used by the probes.

pub const SYSTEM_HEALTH: &str = "system_health";
pub const SYSTEM_CHAIN: &str = "system_chain";
pub const SYSTEM_PROPERTIES: &str = "system_properties";
pub const CHAIN_GET_BLOCK_HASH: &str = "chain_getBlockHash";
pub const CHAIN_GET_BLOCK: &str = "chain_getBlock";
pub const CHAIN_GET_FINALIZED_HEAD: &str = "chain_getFinalizedHead";
