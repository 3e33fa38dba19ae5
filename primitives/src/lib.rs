//! MINICHAIN Core Primitives
//!
//! Shared types and constants for the MINICHAIN teaching chain, plus the
//! dual address model that glues the EVM (H160) and native (AccountId32)
//! account spaces together.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod address;

pub use address::{AccountKind, AddressError, AddressMapping, EthDerivedMapping};

use sp_runtime::{
    traits::{IdentifyAccount, Verify},
    DispatchResult, MultiSignature,
};

/// Token decimals (18, same unit scale as the EVM side)
pub const DECIMALS: u8 = 18;

/// Token symbol
pub const SYMBOL: &str = "MINI";

/// 1 MINI = 10^18 smallest units
pub const MINI: u128 = 1_000_000_000_000_000_000;

/// Existential deposit: 0.001 MINI
pub const EXISTENTIAL_DEPOSIT: u128 = MINI / 1_000;

/// Block time in milliseconds: 6 seconds
pub const BLOCK_TIME_MS: u64 = 6_000;

pub type BlockNumber = u32;
pub type Balance = u128;
pub type AssetId = u32;
pub type Nonce = u32;
pub type Hash = sp_core::H256;
pub type Signature = MultiSignature;
pub type AccountId = <<Signature as Verify>::Signer as IdentifyAccount>::AccountId;

/// Moves `amount` of `asset` from one account to another, or fails with no
/// effect.
///
/// Implemented by the token ledger pallet. The swap pallet only sees this
/// capability, so tests can substitute any ledger.
pub trait TokenTransfer<AccountId, AssetId, Balance> {
    fn transfer(
        asset: AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> DispatchResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_matches_decimals() {
        assert_eq!(MINI, 10u128.pow(DECIMALS as u32));
    }

    #[test]
    fn existential_deposit_below_one_unit() {
        assert!(EXISTENTIAL_DEPOSIT < MINI);
    }
}
