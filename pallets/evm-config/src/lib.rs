//! # MINICHAIN EVM Configuration
//!
//! EVM environment constants for the MINICHAIN teaching chain, shared by
//! the bridge pallet and any EVM-facing tooling.

#![cfg_attr(not(feature = "std"), no_std)]

use sp_core::H160;

/// EVM chain ID for the MINICHAIN devnet
pub const CHAIN_ID: u64 = 7777;

/// Gas price in wei
pub const GAS_PRICE: u128 = 1_000_000_000;

/// Block gas limit
pub const BLOCK_GAS_LIMIT: u64 = 15_000_000;

/// Maximum gas per transaction
pub const MAX_TX_GAS: u64 = 10_000_000;

/// Check if an address is a precompile
pub fn is_precompile(address: H160) -> bool {
    let addr_bytes = address.as_bytes();
    addr_bytes[0..19] == [0u8; 19] && addr_bytes[19] >= 1 && addr_bytes[19] <= 9
}

/// Standard Ethereum precompile addresses
pub mod precompiles {
    use sp_core::H160;

    pub const ECRECOVER: H160 = H160([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    ]);

    pub const SHA256: H160 = H160([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2,
    ]);

    pub const RIPEMD160: H160 = H160([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3,
    ]);

    pub const IDENTITY: H160 = H160([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4,
    ]);
}

/// Intrinsic gas costs
pub mod gas_costs {
    pub const TRANSFER: u64 = 21_000;
    pub const CREATE: u64 = 53_000;
    pub const SSTORE: u64 = 20_000;
    pub const SLOAD: u64 = 800;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id() {
        assert_eq!(CHAIN_ID, 7777);
    }

    #[test]
    fn test_precompile_range() {
        assert!(is_precompile(precompiles::ECRECOVER));
        assert!(is_precompile(precompiles::IDENTITY));
        assert!(!is_precompile(H160::zero()));
        assert!(!is_precompile(H160::repeat_byte(0xEE)));
    }

    #[test]
    fn test_gas_costs() {
        assert_eq!(gas_costs::TRANSFER, 21_000);
    }
}
