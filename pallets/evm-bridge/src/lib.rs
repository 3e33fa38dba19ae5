#![cfg_attr(not(feature = "std"), no_std)]

//! MINICHAIN dual-address bridge
//!
//! Moves native currency between the two address spaces:
//! - `deposit`: signed native account -> H160 (credits the mapped AccountId)
//! - `withdraw`: H160 -> native account, authorized by an EVM-side ECDSA
//!   signature plus a per-address nonce
//!
//! The H160 -> AccountId mapping is the marker scheme from
//! `minichain_primitives::address`, injected via `Config::AddressMapping`.

pub use pallet::*;

#[frame_support::pallet]
pub mod pallet {
    use codec::Encode;
    use frame_support::{
        pallet_prelude::*,
        traits::{Currency, ExistenceRequirement},
        weights::Weight,
    };
    use frame_system::pallet_prelude::*;
    use minichain_primitives::AddressMapping;
    use sp_core::{ecdsa, H160};
    use sp_io::{crypto::secp256k1_ecdsa_recover, hashing::keccak_256};
    use sp_runtime::traits::Zero;
    use sp_std::vec::Vec;

    pub type BalanceOf<T> =
        <<T as Config>::Currency as Currency<<T as frame_system::Config>::AccountId>>::Balance;

    /// Domain separator for withdraw payloads.
    pub const WITHDRAW_TAG: &[u8; 22] = b"MINICHAIN_EVM_WITHDRAW";

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Native currency (Balances).
        type Currency: Currency<Self::AccountId>;

        /// H160 -> AccountId mapping shared with the EVM executor.
        type AddressMapping: AddressMapping<Self::AccountId>;

        /// Chain id domain-separation (use the same value as EVM chain id).
        #[pallet::constant]
        type EvmChainId: Get<u64>;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Anti-replay nonce per EVM address for withdraw signatures.
    #[pallet::storage]
    #[pallet::getter(fn withdraw_nonce)]
    pub type WithdrawNonce<T: Config> = StorageMap<_, Blake2_128Concat, H160, u64, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        Deposited {
            from: T::AccountId,
            evm_address: H160,
            mapped: T::AccountId,
            amount: BalanceOf<T>,
        },
        Withdrawn {
            evm_address: H160,
            to: T::AccountId,
            amount: BalanceOf<T>,
            nonce: u64,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Amount must be greater than zero
        ZeroAmount,
        /// Nonce does not match the stored nonce for this address
        StaleNonce,
        /// Signature does not recover to the claimed EVM address
        SignatureMismatch,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Native -> EVM deposit.
        ///
        /// Credits the AccountId mapped from `evm_address`, making the
        /// funds visible to balance queries on either side.
        #[pallet::call_index(0)]
        #[pallet::weight(Weight::from_parts(50_000, 0))]
        pub fn deposit(
            origin: OriginFor<T>,
            evm_address: H160,
            #[pallet::compact] amount: BalanceOf<T>,
        ) -> DispatchResult {
            let from = ensure_signed(origin)?;

            ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);

            let mapped = T::AddressMapping::into_account_id(evm_address);
            T::Currency::transfer(&from, &mapped, amount, ExistenceRequirement::AllowDeath)?;

            Self::deposit_event(Event::Deposited {
                from,
                evm_address,
                mapped,
                amount,
            });
            Ok(())
        }

        /// EVM -> native withdraw.
        ///
        /// Anyone may submit and pay the fee; funds move only if the
        /// signature recovers to `evm_address` and `nonce` matches the
        /// stored nonce for that address.
        ///
        /// Signing rule (wallet side):
        /// - payload = SCALE(WITHDRAW_TAG, chain_id, evm_address, to, amount, nonce)
        /// - digest = keccak256("\x19Ethereum Signed Message:\n32" ++ keccak256(payload))
        /// - sign digest with secp256k1 (recoverable signature, 65 bytes r,s,v)
        #[pallet::call_index(1)]
        #[pallet::weight(Weight::from_parts(120_000, 0))]
        pub fn withdraw(
            origin: OriginFor<T>,
            evm_address: H160,
            to: T::AccountId,
            #[pallet::compact] amount: BalanceOf<T>,
            nonce: u64,
            sig: ecdsa::Signature,
        ) -> DispatchResult {
            ensure_signed(origin)?;

            ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);

            let expected_nonce = WithdrawNonce::<T>::get(evm_address);
            ensure!(nonce == expected_nonce, Error::<T>::StaleNonce);

            let payload = (
                WITHDRAW_TAG,
                T::EvmChainId::get(),
                evm_address,
                &to,
                amount,
                nonce,
            )
                .encode();
            let digest = eip191_digest(keccak_256(&payload));

            let signer = recover_eth_address(&digest, &sig);
            ensure!(signer == Some(evm_address), Error::<T>::SignatureMismatch);

            // Nonce is burned before the transfer so a replay of the same
            // signature can never fire twice.
            WithdrawNonce::<T>::insert(evm_address, expected_nonce.saturating_add(1));

            let mapped = T::AddressMapping::into_account_id(evm_address);
            T::Currency::transfer(&mapped, &to, amount, ExistenceRequirement::AllowDeath)?;

            Self::deposit_event(Event::Withdrawn {
                evm_address,
                to,
                amount,
                nonce,
            });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        /// Native balance of the account an EVM address maps to. Lets
        /// EVM-side tooling confirm both views of an account agree.
        pub fn eth_balance(evm_address: H160) -> BalanceOf<T> {
            let mapped = T::AddressMapping::into_account_id(evm_address);
            T::Currency::free_balance(&mapped)
        }
    }

    /// keccak256("\x19Ethereum Signed Message:\n32" || msg32)
    pub fn eip191_digest(msg32: [u8; 32]) -> [u8; 32] {
        let mut v: Vec<u8> = Vec::with_capacity(28 + 32);
        v.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
        v.extend_from_slice(&msg32);
        keccak_256(&v)
    }

    /// Recovers the signing EVM address from a 65-byte recoverable
    /// signature over `msg_hash`. Accepts V as 0/1 or 27/28.
    pub fn recover_eth_address(msg_hash: &[u8; 32], sig: &ecdsa::Signature) -> Option<H160> {
        let mut sig_bytes = sig.0;

        let v = sig_bytes[64];
        if v == 27 || v == 28 {
            sig_bytes[64] = v - 27;
        } else if v > 1 {
            return None;
        }

        // 64-byte uncompressed pubkey, no 0x04 prefix; the address is the
        // last 20 bytes of its keccak hash.
        let pubkey64 = secp256k1_ecdsa_recover(&sig_bytes, msg_hash).ok()?;
        let hash = keccak_256(&pubkey64);
        Some(H160::from_slice(&hash[12..32]))
    }
}
