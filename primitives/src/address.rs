//! H160 <-> AccountId32 conversion for the dual address model.
//!
//! An AccountId32 derived from an EVM address carries the address in its
//! first 20 bytes and fills the remaining 12 with the `0xEE` marker. Such
//! ids convert back to the original H160 losslessly. Any other AccountId32
//! belongs to a native key and is projected to an EVM-side handle by
//! hashing: the projection is deterministic but one-way, decoding the
//! projected H160 does not recover the original account.

use alloc::string::String;
use codec::{Decode, Encode};
use scale_info::TypeInfo;
use sp_core::{crypto::AccountId32, RuntimeDebug, H160};
use sp_io::hashing::keccak_256;

/// Marker filling bytes 20..32 of an eth-derived AccountId32.
pub const ETH_MARKER: [u8; 12] = [0xEE; 12];

/// An AccountId32 interpreted by content.
///
/// The byte layout carries no explicit tag; classification reads the
/// trailing marker. A native id whose last 12 bytes happen to be all `0xEE`
/// (1 in 2^96) classifies as eth-derived. Accepted trade-off of the marker
/// scheme, kept for layout compatibility.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, RuntimeDebug)]
pub enum AccountKind {
    /// Derived from an EVM key; converts back to the H160 losslessly.
    EthDerived(H160),
    /// Backed by a native key; has no corresponding EVM key.
    Native([u8; 32]),
}

#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug)]
pub enum AddressError {
    /// Input is not the exact byte length of the target format.
    InvalidLength,
}

/// Embeds an EVM address into the native account space.
pub fn into_account_id(address: H160) -> AccountId32 {
    let mut raw = [0u8; 32];
    raw[..20].copy_from_slice(address.as_bytes());
    raw[20..].copy_from_slice(&ETH_MARKER);
    AccountId32::from(raw)
}

/// Reads the trailing marker to decide which key space an id belongs to.
pub fn classify(account: &AccountId32) -> AccountKind {
    let raw: &[u8; 32] = account.as_ref();
    if raw[20..] == ETH_MARKER {
        AccountKind::EthDerived(H160::from_slice(&raw[..20]))
    } else {
        AccountKind::Native(*raw)
    }
}

/// EVM-side handle for any native account.
///
/// Eth-derived ids return their embedded address verbatim. Native ids are
/// projected to the last 20 bytes of `keccak256(id)` so that EVM tooling
/// always gets *some* 20-byte handle; that path is not invertible.
pub fn to_eth_address(account: &AccountId32) -> H160 {
    match classify(account) {
        AccountKind::EthDerived(address) => address,
        AccountKind::Native(raw) => {
            let hash = keccak_256(&raw);
            H160::from_slice(&hash[12..])
        }
    }
}

/// Length-checked form of [`into_account_id`] for untyped input.
pub fn try_into_account_id(address: &[u8]) -> Result<AccountId32, AddressError> {
    if address.len() != 20 {
        return Err(AddressError::InvalidLength);
    }
    Ok(into_account_id(H160::from_slice(address)))
}

/// Length-checked form of [`to_eth_address`] for untyped input.
pub fn try_to_eth_address(account: &[u8]) -> Result<H160, AddressError> {
    let raw: [u8; 32] = account.try_into().map_err(|_| AddressError::InvalidLength)?;
    Ok(to_eth_address(&AccountId32::from(raw)))
}

/// Canonical textual form: EIP-55 checksum-cased hex with `0x` prefix.
pub fn to_checksum(address: &H160) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut lower = [0u8; 40];
    for (i, byte) in address.as_bytes().iter().enumerate() {
        lower[2 * i] = HEX[(byte >> 4) as usize];
        lower[2 * i + 1] = HEX[(byte & 0x0f) as usize];
    }
    let hash = keccak_256(&lower);

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, ch) in lower.iter().enumerate() {
        let nibble = (hash[i / 2] >> if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase() as char);
        } else {
            out.push(*ch as char);
        }
    }
    out
}

/// Maps EVM H160 addresses into native account ids.
///
/// Same seam as the mapping the EVM executor consumes; pallets take it as a
/// `Config` type instead of calling the free functions directly.
pub trait AddressMapping<AccountId> {
    fn into_account_id(address: H160) -> AccountId;
}

/// The marker-based mapping above, for runtimes whose AccountId is
/// AccountId32-compatible.
pub struct EthDerivedMapping;

impl<AccountId: From<AccountId32>> AddressMapping<AccountId> for EthDerivedMapping {
    fn into_account_id(address: H160) -> AccountId {
        into_account_id(address).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn sample_address() -> H160 {
        H160::from_slice(&hex!("8eaf04151687736326c9fea17e25fc5287613693"))
    }

    #[test]
    fn eth_derived_round_trip() {
        let address = sample_address();
        let account = into_account_id(address);

        let raw: &[u8; 32] = account.as_ref();
        assert_eq!(&raw[..20], address.as_bytes());
        assert_eq!(raw[20..], ETH_MARKER);

        assert_eq!(classify(&account), AccountKind::EthDerived(address));
        assert_eq!(to_eth_address(&account), address);
    }

    #[test]
    fn native_projection_is_deterministic_and_lossy() {
        let raw = hex!("d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d");
        let account = AccountId32::from(raw);

        assert_eq!(classify(&account), AccountKind::Native(raw));

        let first = to_eth_address(&account);
        let second = to_eth_address(&account);
        assert_eq!(first, second);

        // Re-encoding the projected handle lands in the eth-derived space,
        // never back on the native id.
        assert_ne!(into_account_id(first), account);
        assert_eq!(classify(&into_account_id(first)), AccountKind::EthDerived(first));
    }

    #[test]
    fn marker_suffixed_native_id_classifies_as_eth_derived() {
        // The documented 2^-96 collision: trailing bytes equal the marker,
        // so the leading 20 bytes come back verbatim.
        let mut raw = [0x11u8; 32];
        raw[20..].copy_from_slice(&ETH_MARKER);
        let account = AccountId32::from(raw);

        assert_eq!(to_eth_address(&account), H160::from_slice(&raw[..20]));
    }

    #[test]
    fn slice_forms_enforce_length() {
        assert_eq!(try_into_account_id(&[0u8; 19]), Err(AddressError::InvalidLength));
        assert_eq!(try_into_account_id(&[0u8; 21]), Err(AddressError::InvalidLength));
        assert_eq!(try_to_eth_address(&[0u8; 31]), Err(AddressError::InvalidLength));
        assert_eq!(try_to_eth_address(&[0u8; 33]), Err(AddressError::InvalidLength));

        let address = sample_address();
        let account = try_into_account_id(address.as_bytes()).unwrap();
        assert_eq!(try_to_eth_address(account.as_ref()), Ok(address));
    }

    #[test]
    fn checksum_matches_known_vectors() {
        // Test vectors from the EIP-55 specification.
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let mut raw = [0u8; 20];
            let stripped = &expected[2..];
            for i in 0..20 {
                raw[i] = u8::from_str_radix(&stripped[2 * i..2 * i + 2], 16).unwrap();
            }
            assert_eq!(to_checksum(&H160::from(raw)), expected);
        }
    }

    #[test]
    fn mapping_trait_uses_marker_scheme() {
        let address = sample_address();
        let account: AccountId32 =
            <EthDerivedMapping as AddressMapping<AccountId32>>::into_account_id(address);
        assert_eq!(to_eth_address(&account), address);
    }
}
