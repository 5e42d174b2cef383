//! Struct tag literals: unquoting and `key:"value"` lookup.

/// Unquote a string literal as written in source.
///
/// Raw literals (`` `...` ``) are taken as-is minus carriage returns.
/// Interpreted literals (`"..."`) have their escape sequences processed.
pub fn unquote(literal: &str) -> Result<String, String> {
    if let Some(inner) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        if inner.contains('`') {
            return Err(format!("invalid raw string literal: {}", literal));
        }
        return Ok(inner.replace('\r', ""));
    }

    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("not a string literal: {}", literal))?;

    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return Err(format!("unescaped {:?} in {}", c, literal)),
            '\\' => {
                let esc = chars
                    .next()
                    .ok_or_else(|| format!("trailing backslash in {}", literal))?;
                match esc {
                    'a' => out.push(0x07),
                    'b' => out.push(0x08),
                    'f' => out.push(0x0c),
                    'n' => out.push(b'\n'),
                    'r' => out.push(b'\r'),
                    't' => out.push(b'\t'),
                    'v' => out.push(0x0b),
                    '\\' => out.push(b'\\'),
                    '"' => out.push(b'"'),
                    'x' => out.push(byte_escape(&mut chars, 2, 16, literal)?),
                    '0'..='7' => {
                        let rest: String = chars.by_ref().take(2).collect();
                        let digits = format!("{}{}", esc, rest);
                        let value = u32::from_str_radix(&digits, 8)
                            .ok()
                            .filter(|_| digits.len() == 3)
                            .and_then(|v| u8::try_from(v).ok())
                            .ok_or_else(|| format!("invalid octal escape in {}", literal))?;
                        out.push(value);
                    }
                    'u' | 'U' => {
                        let width = if esc == 'u' { 4 } else { 8 };
                        let digits: String = chars.by_ref().take(width).collect();
                        let ch = u32::from_str_radix(&digits, 16)
                            .ok()
                            .filter(|_| digits.len() == width)
                            .and_then(char::from_u32)
                            .ok_or_else(|| format!("invalid unicode escape in {}", literal))?;
                        push_char(&mut out, ch);
                    }
                    other => {
                        return Err(format!("unknown escape sequence \\{} in {}", other, literal))
                    }
                }
            }
            c => push_char(&mut out, c),
        }
    }
    String::from_utf8(out).map_err(|_| format!("invalid UTF-8 in {}", literal))
}

fn byte_escape(
    chars: &mut std::str::Chars<'_>,
    width: usize,
    radix: u32,
    literal: &str,
) -> Result<u8, String> {
    let digits: String = chars.by_ref().take(width).collect();
    if digits.len() != width {
        return Err(format!("short escape sequence in {}", literal));
    }
    u8::from_str_radix(&digits, radix).map_err(|_| format!("invalid escape sequence in {}", literal))
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Look up `key` in a conventional struct tag (`key:"value" other:"value"`).
///
/// Scanning stops at the first malformed pair, so later pairs are unreachable
/// behind one.
pub fn lookup_tag(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let name_len = rest
            .bytes()
            .position(|b| b <= b' ' || b == b':' || b == b'"' || b == 0x7f)
            .unwrap_or(rest.len());
        if name_len == 0 || !rest[name_len..].starts_with(":\"") {
            return None;
        }
        let name = &rest[..name_len];
        rest = &rest[name_len + 1..];

        // rest starts at the opening quote of the value.
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let quoted = &rest[..=i];
        rest = &rest[i + 1..];

        if name == key {
            return unquote(quoted).ok();
        }
    }
}
