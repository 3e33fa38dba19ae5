//! # MINICHAIN MiniSwap Pallet
//!
//! Paired-token liquidity pools with a fixed 1:1 exchange rate. Simpler
//! than a constant-product AMM: deposits must match the current reserve
//! ratio exactly, swaps move value one-for-one, and LP shares track each
//! provider's fraction of the pool.
//!
//! A pool comes into existence with its first deposit and is deleted again
//! when the last share is withdrawn. Pooled funds sit in a PalletId-derived
//! custody account; all token movement goes through the injected
//! `TokenTransfer` ledger, and any ledger failure aborts the extrinsic with
//! no state change.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[frame_support::pallet]
pub mod pallet {
    use frame_support::{pallet_prelude::*, PalletId};
    use frame_system::pallet_prelude::*;
    use minichain_primitives::TokenTransfer;
    use sp_runtime::traits::{
        AccountIdConversion, AtLeast32BitUnsigned, CheckedAdd, CheckedDiv, CheckedMul, CheckedSub,
        Zero,
    };

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// The units in which reserves and shares are recorded.
        type Balance: Member + Parameter + AtLeast32BitUnsigned + Default + Copy + MaxEncodedLen;

        /// The arithmetic type of asset identifier.
        type AssetId: Member + Parameter + AtLeast32BitUnsigned + Default + Copy + MaxEncodedLen;

        /// Ledger holding the pooled assets.
        type Tokens: TokenTransfer<Self::AccountId, Self::AssetId, Self::Balance>;

        /// Pallet id deriving the pool custody account.
        #[pallet::constant]
        type PalletId: Get<PalletId>;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Canonical (ordered) asset pair identifying a pool.
    #[derive(Clone, Copy, PartialEq, Eq, Encode, Decode, MaxEncodedLen, TypeInfo, RuntimeDebug)]
    pub struct PoolKey<AssetId> {
        pub asset0: AssetId,
        pub asset1: AssetId,
    }

    impl<AssetId: Ord + Copy> PoolKey<AssetId> {
        /// Orders the pair. `flipped` reports whether the caller's argument
        /// order was swapped to reach canonical order.
        pub fn new(asset_a: AssetId, asset_b: AssetId) -> (Self, bool) {
            if asset_a <= asset_b {
                (
                    Self {
                        asset0: asset_a,
                        asset1: asset_b,
                    },
                    false,
                )
            } else {
                (
                    Self {
                        asset0: asset_b,
                        asset1: asset_a,
                    },
                    true,
                )
            }
        }
    }

    /// Reserves and share supply of one pool, in canonical asset order.
    #[derive(
        Clone, Copy, PartialEq, Eq, Default, Encode, Decode, MaxEncodedLen, TypeInfo, RuntimeDebug,
    )]
    pub struct Pool<Balance> {
        pub reserve0: Balance,
        pub reserve1: Balance,
        pub total_shares: Balance,
    }

    /// Active pools. An entry exists iff the pool has outstanding shares.
    #[pallet::storage]
    #[pallet::getter(fn pools)]
    pub type Pools<T: Config> =
        StorageMap<_, Blake2_128Concat, PoolKey<T::AssetId>, Pool<T::Balance>, OptionQuery>;

    /// LP share balance per pool and owner. Sums to the pool's total_shares.
    #[pallet::storage]
    #[pallet::getter(fn shares)]
    pub type Shares<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        PoolKey<T::AssetId>,
        Blake2_128Concat,
        T::AccountId,
        T::Balance,
        ValueQuery,
    >;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// Liquidity deposited, shares minted
        LiquidityAdded {
            who: T::AccountId,
            asset_a: T::AssetId,
            asset_b: T::AssetId,
            amount_a: T::Balance,
            amount_b: T::Balance,
            shares: T::Balance,
        },
        /// Shares burned, proportional reserves paid out
        LiquidityRemoved {
            who: T::AccountId,
            asset_a: T::AssetId,
            asset_b: T::AssetId,
            amount_a: T::Balance,
            amount_b: T::Balance,
            shares: T::Balance,
        },
        /// One-for-one exchange executed
        Swapped {
            who: T::AccountId,
            asset_in: T::AssetId,
            asset_out: T::AssetId,
            amount_in: T::Balance,
            amount_out: T::Balance,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Amount must be greater than zero
        ZeroAmount,
        /// Both sides of the pair are the same asset
        SameToken,
        /// Deposit does not preserve the current reserve ratio
        UnproportionalAmounts,
        /// Caller owns fewer shares than requested
        InsufficientShares,
        /// Requested output exceeds the pool's reserve
        InsufficientLiquidity,
        /// Arithmetic overflow
        ArithmeticOverflow,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Deposit `amount_a` of `asset_a` and `amount_b` of `asset_b`.
        ///
        /// The first deposit for a pair sets the pool's ratio and mints
        /// `amount_a` shares. Later deposits must match the reserve ratio
        /// exactly (checked by cross-multiplication) and mint shares in
        /// proportion to the fraction of the pool contributed.
        #[pallet::call_index(0)]
        #[pallet::weight(Weight::from_parts(90_000, 0))]
        pub fn add_liquidity(
            origin: OriginFor<T>,
            asset_a: T::AssetId,
            asset_b: T::AssetId,
            #[pallet::compact] amount_a: T::Balance,
            #[pallet::compact] amount_b: T::Balance,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            ensure!(asset_a != asset_b, Error::<T>::SameToken);
            ensure!(
                !amount_a.is_zero() && !amount_b.is_zero(),
                Error::<T>::ZeroAmount
            );

            let (key, flipped) = PoolKey::new(asset_a, asset_b);
            let mut pool = Pools::<T>::get(key).unwrap_or_default();
            let (reserve_a, reserve_b) = Self::oriented(&pool, flipped);

            let minted = if pool.total_shares.is_zero() {
                log::debug!("miniswap: initializing pool {:?}/{:?}", asset_a, asset_b);
                amount_a
            } else {
                let lhs = amount_a
                    .checked_mul(&reserve_b)
                    .ok_or(Error::<T>::ArithmeticOverflow)?;
                let rhs = amount_b
                    .checked_mul(&reserve_a)
                    .ok_or(Error::<T>::ArithmeticOverflow)?;
                ensure!(lhs == rhs, Error::<T>::UnproportionalAmounts);

                amount_a
                    .checked_mul(&pool.total_shares)
                    .ok_or(Error::<T>::ArithmeticOverflow)?
                    .checked_div(&reserve_a)
                    .ok_or(Error::<T>::ArithmeticOverflow)?
            };

            let new_reserve_a = reserve_a
                .checked_add(&amount_a)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            let new_reserve_b = reserve_b
                .checked_add(&amount_b)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            pool.total_shares = pool
                .total_shares
                .checked_add(&minted)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            let position = Shares::<T>::get(key, &who)
                .checked_add(&minted)
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            let custody = Self::pool_account();
            T::Tokens::transfer(asset_a, &who, &custody, amount_a)?;
            T::Tokens::transfer(asset_b, &who, &custody, amount_b)?;

            Self::store_oriented(&mut pool, flipped, new_reserve_a, new_reserve_b);
            Pools::<T>::insert(key, pool);
            Shares::<T>::insert(key, &who, position);

            Self::deposit_event(Event::LiquidityAdded {
                who,
                asset_a,
                asset_b,
                amount_a,
                amount_b,
                shares: minted,
            });
            Ok(())
        }

        /// Burn `shares` and withdraw the proportional part of both
        /// reserves. Withdrawing the last share deletes the pool.
        ///
        /// Payouts truncate toward zero; residual dust stays in the pool
        /// until the final withdrawal.
        #[pallet::call_index(1)]
        #[pallet::weight(Weight::from_parts(90_000, 0))]
        pub fn remove_liquidity(
            origin: OriginFor<T>,
            asset_a: T::AssetId,
            asset_b: T::AssetId,
            #[pallet::compact] shares: T::Balance,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            ensure!(!shares.is_zero(), Error::<T>::ZeroAmount);

            let (key, flipped) = PoolKey::new(asset_a, asset_b);
            let position = Shares::<T>::get(key, &who);
            ensure!(shares <= position, Error::<T>::InsufficientShares);

            // A positive position implies the pool entry exists.
            let mut pool = Pools::<T>::get(key).ok_or(Error::<T>::InsufficientShares)?;

            let payout0 = pool
                .reserve0
                .checked_mul(&shares)
                .ok_or(Error::<T>::ArithmeticOverflow)?
                .checked_div(&pool.total_shares)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            let payout1 = pool
                .reserve1
                .checked_mul(&shares)
                .ok_or(Error::<T>::ArithmeticOverflow)?
                .checked_div(&pool.total_shares)
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            pool.reserve0 = pool
                .reserve0
                .checked_sub(&payout0)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            pool.reserve1 = pool
                .reserve1
                .checked_sub(&payout1)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            pool.total_shares = pool
                .total_shares
                .checked_sub(&shares)
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            let (amount_a, amount_b) = if flipped {
                (payout1, payout0)
            } else {
                (payout0, payout1)
            };

            let custody = Self::pool_account();
            T::Tokens::transfer(asset_a, &custody, &who, amount_a)?;
            T::Tokens::transfer(asset_b, &custody, &who, amount_b)?;

            let remaining = position
                .checked_sub(&shares)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            if remaining.is_zero() {
                Shares::<T>::remove(key, &who);
            } else {
                Shares::<T>::insert(key, &who, remaining);
            }

            if pool.total_shares.is_zero() {
                log::debug!("miniswap: pool {:?}/{:?} drained", asset_a, asset_b);
                Pools::<T>::remove(key);
            } else {
                Pools::<T>::insert(key, pool);
            }

            Self::deposit_event(Event::LiquidityRemoved {
                who,
                asset_a,
                asset_b,
                amount_a,
                amount_b,
                shares,
            });
            Ok(())
        }

        /// Exchange `amount_in` of `asset_in` for the same amount of
        /// `asset_out`.
        #[pallet::call_index(2)]
        #[pallet::weight(Weight::from_parts(80_000, 0))]
        pub fn swap(
            origin: OriginFor<T>,
            asset_in: T::AssetId,
            asset_out: T::AssetId,
            #[pallet::compact] amount_in: T::Balance,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            ensure!(asset_in != asset_out, Error::<T>::SameToken);
            ensure!(!amount_in.is_zero(), Error::<T>::ZeroAmount);

            let (key, flipped) = PoolKey::new(asset_in, asset_out);
            let mut pool = Pools::<T>::get(key).unwrap_or_default();
            let (reserve_in, reserve_out) = Self::oriented(&pool, flipped);

            // 1:1 rate, so the full input amount must come out the other side.
            ensure!(amount_in <= reserve_out, Error::<T>::InsufficientLiquidity);

            let new_reserve_in = reserve_in
                .checked_add(&amount_in)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            let new_reserve_out = reserve_out
                .checked_sub(&amount_in)
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            let custody = Self::pool_account();
            T::Tokens::transfer(asset_in, &who, &custody, amount_in)?;
            T::Tokens::transfer(asset_out, &custody, &who, amount_in)?;

            Self::store_oriented(&mut pool, flipped, new_reserve_in, new_reserve_out);
            Pools::<T>::insert(key, pool);

            Self::deposit_event(Event::Swapped {
                who,
                asset_in,
                asset_out,
                amount_in,
                amount_out: amount_in,
            });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        /// Custody account holding all pooled funds.
        pub fn pool_account() -> T::AccountId {
            T::PalletId::get().into_account_truncating()
        }

        /// Reserves and share supply in the caller's asset order. Reports
        /// zeros for a pair with no active pool.
        pub fn pool_info(asset_a: T::AssetId, asset_b: T::AssetId) -> (T::Balance, T::Balance, T::Balance) {
            let (key, flipped) = PoolKey::new(asset_a, asset_b);
            let pool = Pools::<T>::get(key).unwrap_or_default();
            let (reserve_a, reserve_b) = Self::oriented(&pool, flipped);
            (reserve_a, reserve_b, pool.total_shares)
        }

        /// Caller's LP share balance for a pair. Zero without a position.
        pub fn lp_balance(asset_a: T::AssetId, asset_b: T::AssetId, who: &T::AccountId) -> T::Balance {
            let (key, _) = PoolKey::new(asset_a, asset_b);
            Shares::<T>::get(key, who)
        }

        /// Pool reserves viewed in the caller's argument order.
        fn oriented(pool: &Pool<T::Balance>, flipped: bool) -> (T::Balance, T::Balance) {
            if flipped {
                (pool.reserve1, pool.reserve0)
            } else {
                (pool.reserve0, pool.reserve1)
            }
        }

        /// Write caller-order reserves back into canonical slots.
        fn store_oriented(
            pool: &mut Pool<T::Balance>,
            flipped: bool,
            reserve_a: T::Balance,
            reserve_b: T::Balance,
        ) {
            if flipped {
                pool.reserve0 = reserve_b;
                pool.reserve1 = reserve_a;
            } else {
                pool.reserve0 = reserve_a;
                pool.reserve1 = reserve_b;
            }
        }
    }
}
