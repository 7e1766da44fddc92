//! Search key normalization.
//!
//! Generated search data stores keys in a restricted alphabet: lowercase ASCII
//! alphanumerics, with every other ASCII byte escaped as `_` plus two hex digits.
//! `seq.hpp` is stored as `seq_2ehpp`, `operator==` as `operator_3d_3d`.
//! Non-ASCII characters are lowercased and kept as UTF-8 text: the generator
//! treats bytes at or above 0x80 as identifier characters and only escapes
//! ASCII punctuation, so a byte-wise `_c3_a9` form would never match a stored
//! key such as `écrire`.

use std::fmt::Write as _;

/// Converts a symbol name as a user would type it into the stored key form.
///
/// - `StrFmt` → `strfmt`
/// - `seq.hpp` → `seq_2ehpp`
/// - `~Foo` → `_7efoo`
pub fn search_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else if c.is_ascii() {
            // Infallible: writing into a String
            let _ = write!(key, "_{:02x}", c as u32);
        } else {
            key.extend(c.to_lowercase());
        }
    }

    key
}

/// Best-effort inverse of [`search_key`] for display.
///
/// Escapes that don't form a valid `_xx` sequence are left untouched, so a key
/// that never went through [`search_key`] decodes to itself.
pub fn decode_key(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut out = String::with_capacity(key.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'_'
            && let Some(decoded) = key
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .filter(u8::is_ascii)
        {
            out.push(decoded as char);
            i += 3;
            continue;
        }

        // Copy one full UTF-8 character
        let ch_len = key[i..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&key[i..i + ch_len]);
        i += ch_len;
    }

    out
}
