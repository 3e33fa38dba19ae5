//! # MINICHAIN Token Ledger
//!
//! Minimal multi-asset ledger for the teaching chain: anyone can create an
//! asset, transfer it, or inflate one they use. No authority model on
//! purpose, this is classroom money.
//!
//! The swap pallet consumes this ledger through the `TokenTransfer`
//! capability rather than depending on it directly.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[frame_support::pallet]
pub mod pallet {
    use frame_support::pallet_prelude::*;
    use frame_system::pallet_prelude::*;
    use minichain_primitives::TokenTransfer;
    use sp_runtime::traits::{AtLeast32BitUnsigned, CheckedAdd, CheckedSub, One, Zero};

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// The units in which balances are recorded.
        type Balance: Member + Parameter + AtLeast32BitUnsigned + Default + Copy + MaxEncodedLen;

        /// The arithmetic type of asset identifier.
        type AssetId: Member + Parameter + AtLeast32BitUnsigned + Default + Copy + MaxEncodedLen;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Total supply of each asset.
    #[pallet::storage]
    #[pallet::getter(fn total_supply)]
    pub type TotalSupply<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AssetId, T::Balance, ValueQuery>;

    /// Balance of each account, per asset.
    #[pallet::storage]
    #[pallet::getter(fn balance_of)]
    pub type Balances<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AssetId,
        Blake2_128Concat,
        T::AccountId,
        T::Balance,
        ValueQuery,
    >;

    /// Next asset ID to be allocated.
    #[pallet::storage]
    #[pallet::getter(fn next_asset_id)]
    pub type NextAssetId<T: Config> = StorageValue<_, T::AssetId, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// New asset created
        AssetCreated {
            asset: T::AssetId,
            creator: T::AccountId,
            initial_supply: T::Balance,
        },
        /// Tokens moved between accounts
        Transferred {
            asset: T::AssetId,
            from: T::AccountId,
            to: T::AccountId,
            amount: T::Balance,
        },
        /// Additional tokens issued
        Issued {
            asset: T::AssetId,
            who: T::AccountId,
            amount: T::Balance,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Not enough balance for the operation
        InsufficientBalance,
        /// Arithmetic overflow
        ArithmeticOverflow,
        /// Asset has never been created
        UnknownAsset,
        /// Sender and recipient are the same account
        SelfTransfer,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Create a new asset and credit the whole initial supply to the
        /// caller.
        #[pallet::call_index(0)]
        #[pallet::weight(Weight::from_parts(40_000, 0))]
        pub fn create_asset(
            origin: OriginFor<T>,
            #[pallet::compact] initial_supply: T::Balance,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            let asset = Self::next_asset_id();
            let next = asset
                .checked_add(&One::one())
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            NextAssetId::<T>::put(next);

            TotalSupply::<T>::insert(asset, initial_supply);
            Balances::<T>::insert(asset, &who, initial_supply);

            log::debug!("tokens: asset {:?} created, supply {:?}", asset, initial_supply);

            Self::deposit_event(Event::AssetCreated {
                asset,
                creator: who,
                initial_supply,
            });
            Ok(())
        }

        /// Transfer tokens to another account.
        #[pallet::call_index(1)]
        #[pallet::weight(Weight::from_parts(50_000, 0))]
        pub fn transfer(
            origin: OriginFor<T>,
            asset: T::AssetId,
            to: T::AccountId,
            #[pallet::compact] amount: T::Balance,
        ) -> DispatchResult {
            let from = ensure_signed(origin)?;

            ensure!(from != to, Error::<T>::SelfTransfer);
            Self::do_transfer(asset, &from, &to, amount)?;

            Self::deposit_event(Event::Transferred {
                asset,
                from,
                to,
                amount,
            });
            Ok(())
        }

        /// Issue additional tokens of an existing asset to the caller.
        #[pallet::call_index(2)]
        #[pallet::weight(Weight::from_parts(50_000, 0))]
        pub fn issue(
            origin: OriginFor<T>,
            asset: T::AssetId,
            #[pallet::compact] amount: T::Balance,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            ensure!(
                TotalSupply::<T>::contains_key(asset),
                Error::<T>::UnknownAsset
            );

            let new_supply = Self::total_supply(asset)
                .checked_add(&amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            let new_balance = Self::balance_of(asset, &who)
                .checked_add(&amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            TotalSupply::<T>::insert(asset, new_supply);
            Balances::<T>::insert(asset, &who, new_balance);

            Self::deposit_event(Event::Issued { asset, who, amount });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        /// Balance move without origin checks, shared by the extrinsic and
        /// the `TokenTransfer` capability.
        ///
        /// A transfer to self or of zero is a no-op, not an error.
        pub fn do_transfer(
            asset: T::AssetId,
            from: &T::AccountId,
            to: &T::AccountId,
            amount: T::Balance,
        ) -> DispatchResult {
            if from == to || amount.is_zero() {
                return Ok(());
            }

            let from_balance = Self::balance_of(asset, from);
            ensure!(from_balance >= amount, Error::<T>::InsufficientBalance);

            let new_from = from_balance
                .checked_sub(&amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            let new_to = Self::balance_of(asset, to)
                .checked_add(&amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            Balances::<T>::insert(asset, from, new_from);
            Balances::<T>::insert(asset, to, new_to);

            Ok(())
        }
    }

    impl<T: Config> TokenTransfer<T::AccountId, T::AssetId, T::Balance> for Pallet<T> {
        fn transfer(
            asset: T::AssetId,
            from: &T::AccountId,
            to: &T::AccountId,
            amount: T::Balance,
        ) -> DispatchResult {
            Self::do_transfer(asset, from, to, amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_support::{assert_noop, assert_ok, derive_impl};
    use sp_runtime::traits::IdentityLookup;
    use sp_runtime::BuildStorage;

    type Block = frame_system::mocking::MockBlock<Test>;

    frame_support::construct_runtime!(
        pub enum Test {
            System: frame_system,
            Tokens: crate::pallet,
        }
    );

    #[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
    impl frame_system::Config for Test {
        type Block = Block;
        type AccountId = u64;
        type Lookup = IdentityLookup<Self::AccountId>;
    }

    impl pallet::Config for Test {
        type RuntimeEvent = RuntimeEvent;
        type Balance = u128;
        type AssetId = u32;
    }

    const ALICE: u64 = 1;
    const BOB: u64 = 2;

    fn new_test_ext() -> sp_io::TestExternalities {
        let t = frame_system::GenesisConfig::<Test>::default()
            .build_storage()
            .unwrap();
        let mut ext: sp_io::TestExternalities = t.into();
        ext.execute_with(|| System::set_block_number(1));
        ext
    }

    #[test]
    fn create_asset_allocates_sequential_ids() {
        new_test_ext().execute_with(|| {
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(ALICE), 1_000));
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(BOB), 500));

            assert_eq!(Tokens::total_supply(0), 1_000);
            assert_eq!(Tokens::total_supply(1), 500);
            assert_eq!(Tokens::balance_of(0, ALICE), 1_000);
            assert_eq!(Tokens::balance_of(1, BOB), 500);
            assert_eq!(Tokens::next_asset_id(), 2);
        });
    }

    #[test]
    fn transfer_moves_balance() {
        new_test_ext().execute_with(|| {
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(ALICE), 1_000));
            assert_ok!(Tokens::transfer(RuntimeOrigin::signed(ALICE), 0, BOB, 300));

            assert_eq!(Tokens::balance_of(0, ALICE), 700);
            assert_eq!(Tokens::balance_of(0, BOB), 300);
            assert_eq!(Tokens::total_supply(0), 1_000);
        });
    }

    #[test]
    fn transfer_rejects_overdraft_and_self() {
        new_test_ext().execute_with(|| {
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(ALICE), 100));

            assert_noop!(
                Tokens::transfer(RuntimeOrigin::signed(ALICE), 0, BOB, 101),
                Error::<Test>::InsufficientBalance
            );
            assert_noop!(
                Tokens::transfer(RuntimeOrigin::signed(ALICE), 0, ALICE, 10),
                Error::<Test>::SelfTransfer
            );
        });
    }

    #[test]
    fn issue_inflates_existing_asset_only() {
        new_test_ext().execute_with(|| {
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(ALICE), 100));
            assert_ok!(Tokens::issue(RuntimeOrigin::signed(BOB), 0, 50));

            assert_eq!(Tokens::total_supply(0), 150);
            assert_eq!(Tokens::balance_of(0, BOB), 50);

            assert_noop!(
                Tokens::issue(RuntimeOrigin::signed(BOB), 7, 50),
                Error::<Test>::UnknownAsset
            );
        });
    }

    #[test]
    fn issue_detects_supply_overflow() {
        new_test_ext().execute_with(|| {
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(ALICE), u128::MAX));
            assert_noop!(
                Tokens::issue(RuntimeOrigin::signed(ALICE), 0, 1),
                Error::<Test>::ArithmeticOverflow
            );
        });
    }

    #[test]
    fn do_transfer_is_noop_for_self_and_zero() {
        new_test_ext().execute_with(|| {
            assert_ok!(Tokens::create_asset(RuntimeOrigin::signed(ALICE), 100));

            assert_ok!(Tokens::do_transfer(0, &ALICE, &ALICE, 40));
            assert_eq!(Tokens::balance_of(0, ALICE), 100);

            assert_ok!(Tokens::do_transfer(0, &ALICE, &BOB, 0));
            assert_eq!(Tokens::balance_of(0, BOB), 0);
        });
    }
}
