//! Small codepoint predicates shared by the lexers.
//!
//! These mirror the tests lexers make character by character: lookahead is
//! never more than the previous, current, and next codepoint.

/// Whether `ch` terminates a line.
pub fn is_eol_char(ch: char) -> bool {
    ch == '\r' || ch == '\n'
}

/// ASCII operator/punctuation characters as treated by the lexers.
pub fn is_operator(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>' | ',' | ';' | ':' | '='
            | '+' | '-' | '*' | '/' | '%' | '!' | '&' | '|' | '^' | '~' | '?' | '@'
    )
}

/// Whether `ch` starts a number, with one character of lookahead for
/// signed and fractional forms (`+1`, `-2`, `.5`).
pub fn is_number_start(ch: char, ch_next: char) -> bool {
    ch.is_ascii_digit()
        || ((ch == '+' || ch == '-') && (ch_next.is_ascii_digit() || ch_next == '.'))
        || (ch == '.' && ch_next.is_ascii_digit())
}

/// Whether `ch` continues a number begun earlier.
///
/// Permissive on purpose: hex digits cover `0x` forms, `_` covers digit
/// separators, `.` covers fractions, and a sign is allowed directly after an
/// exponent/precision marker (`1e+5`, `0x1p-3`). Malformed tails fall out of
/// the number state and are reclassified by the caller.
pub fn is_decimal_number_ex(ch_prev: char, ch: char, ch_next: char) -> bool {
    if ch.is_ascii_hexdigit() || ch == '_' || ch == '.' || ch == 'x' || ch == 'X' {
        return true;
    }
    if (ch == 'p' || ch == 'P') && (ch_next.is_ascii_digit() || ch_next == '+' || ch_next == '-') {
        return true;
    }
    if (ch == '+' || ch == '-')
        && matches!(ch_prev, 'e' | 'E' | 'p' | 'P')
        && ch_next.is_ascii_digit()
    {
        return true;
    }
    false
}

/// Hexadecimal digit test used by escape-sequence scanning.
pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_start() {
        assert!(is_number_start('0', 'x'));
        assert!(is_number_start('9', ' '));
        assert!(is_number_start('+', '1'));
        assert!(is_number_start('-', '.'));
        assert!(is_number_start('.', '5'));
        assert!(!is_number_start('+', 'a'));
        assert!(!is_number_start('.', '.'));
        assert!(!is_number_start('a', '1'));
    }

    #[test]
    fn test_number_continuation() {
        // "0x1f" - every interior character continues.
        assert!(is_decimal_number_ex('0', 'x', '1'));
        assert!(is_decimal_number_ex('x', '1', 'f'));
        assert!(is_decimal_number_ex('1', 'f', ' '));
        // "1e+5"
        assert!(is_decimal_number_ex('1', 'e', '+'));
        assert!(is_decimal_number_ex('e', '+', '5'));
        // "1_000"
        assert!(is_decimal_number_ex('1', '_', '0'));
        // "3.14"
        assert!(is_decimal_number_ex('3', '.', '1'));
        // Sign not after an exponent marker does not continue.
        assert!(!is_decimal_number_ex('1', '+', '5'));
        assert!(!is_decimal_number_ex('4', ' ', '2'));
    }

    #[test]
    fn test_operator_and_eol() {
        assert!(is_operator('('));
        assert!(is_operator('}'));
        assert!(!is_operator('a'));
        assert!(!is_operator('"'));
        assert!(is_eol_char('\n'));
        assert!(is_eol_char('\r'));
        assert!(!is_eol_char(' '));
    }
}
