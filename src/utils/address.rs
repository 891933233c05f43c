/// Trim and lowercase an address for storage and comparison.
///
/// No format validation happens here; a malformed address is rejected by
/// the chain reader.
pub fn normalize_address(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Case-insensitive address equality.
pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// `0x1234…abcd` form for tables.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
