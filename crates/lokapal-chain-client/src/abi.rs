//! Minimal ABI encoding for `balanceOf(address,uint256)`.
//!
//! Only the one call the poll gate needs. Arguments are static 32-byte
//! words, so no general encoder is required.

use lokapal_core::WalletAddress;

/// `keccak256("balanceOf(address,uint256)")[..4]`.
pub const BALANCE_OF_SELECTOR: &str = "00fdd58e";

/// Call data for `balanceOf(account, id)`, `0x`-prefixed hex.
pub fn encode_balance_of(account: &WalletAddress, token_id: u64) -> String {
    format!(
        "0x{BALANCE_OF_SELECTOR}{:0>64}{:064x}",
        account.hex_digits(),
        token_id
    )
}

/// Whether a `uint256` return value is non-zero.
///
/// # Errors
///
/// Returns a description when `raw` is not `0x`-prefixed hex of exactly one
/// word. An empty `0x` result means there is no contract at the address.
pub fn decode_nonzero_uint(raw: &str) -> Result<bool, String> {
    let hex = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("result is not 0x-prefixed: {raw}"))?;
    if hex.is_empty() {
        return Err("empty result; no contract at the configured address".into());
    }
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected one 32-byte word, got {} hex digits", hex.len()));
    }
    Ok(hex.chars().any(|c| c != '0'))
}
