//! Check-digit validation and display masks for CPF and NIS numbers.
//!
//! Validation always re-strips non-digit characters, so masked and unmasked
//! input validate identically. The masks are advisory formatting only.

/// Extracts the decimal digits of `value`, in order.
fn digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Validates a CPF number (11 digits, two check digits).
///
/// Rejects inputs whose digits are all identical, which pass the checksum
/// but are not valid documents.
pub fn validate_cpf(value: &str) -> bool {
    let d = digits(value);
    if d.len() != 11 || d.iter().all(|&x| x == d[0]) {
        return false;
    }

    let sum: u32 = (0..9).map(|i| d[i] * (10 - i as u32)).sum();
    let mut check = (sum * 10) % 11;
    if check == 10 {
        check = 0;
    }
    if check != d[9] {
        return false;
    }

    let sum: u32 = (0..10).map(|i| d[i] * (11 - i as u32)).sum();
    let mut check = (sum * 10) % 11;
    if check == 10 {
        check = 0;
    }
    check == d[10]
}

/// Validates a NIS/PIS number (11 digits, one check digit).
pub fn validate_nis(value: &str) -> bool {
    const WEIGHTS: [u32; 10] = [3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let d = digits(value);
    if d.len() != 11 {
        return false;
    }

    let sum: u32 = (0..10).map(|i| d[i] * WEIGHTS[i]).sum();
    let mut check = 11 - (sum % 11);
    if check == 10 || check == 11 {
        check = 0;
    }
    check == d[10]
}

/// Progressively applies a `#`-placeholder mask to the digits of `value`.
///
/// Separators are emitted only while more digits remain, so partial input
/// formats cleanly while typing. Digits beyond the mask are appended as-is.
/// Stripping non-digits from the result always yields the digits of the
/// input.
pub fn format_masked(value: &str, pattern: &str) -> String {
    let mut out = String::new();
    let mut digits = value.chars().filter(|c| c.is_ascii_digit()).peekable();

    for slot in pattern.chars() {
        if slot == '#' {
            match digits.next() {
                Some(d) => out.push(d),
                None => return out,
            }
        } else if digits.peek().is_some() {
            out.push(slot);
        }
    }

    out.extend(digits);
    out
}

/// Formats a CPF as `000.000.000-00`.
pub fn format_cpf(value: &str) -> String {
    format_masked(value, "###.###.###-##")
}

/// Formats a NIS as `000.00000.00-0`.
pub fn format_nis(value: &str) -> String {
    format_masked(value, "###.#####.##-#")
}
