use xxhash_rust::xxh64::xxh64;

const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encode a u64 value as a base62 string (11 chars, zero-padded).
fn base62_encode(mut value: u64) -> String {
    if value == 0 {
        return "0".repeat(11);
    }
    let mut result = Vec::with_capacity(11);
    while value > 0 {
        let idx = (value % 62) as usize;
        result.push(BASE62_CHARS[idx] as char);
        value /= 62;
    }
    while result.len() < 11 {
        result.push('0');
    }
    result.iter().rev().collect()
}

/// Fingerprint a sequence of fields.
///
/// fingerprint = base62(xxhash64(field_1 \0 field_2 \0 ... field_n))
///
/// Floats must be passed already rendered (see [`float_field`]) so the
/// fingerprint is stable across platforms.
pub fn fingerprint<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut input = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            input.push('\0');
        }
        input.push_str(field);
    }
    base62_encode(xxh64(input.as_bytes(), 0))
}

/// Render a float as its exact bit pattern.
pub fn float_field(value: f64) -> String {
    format!("{:016x}", value.to_bits())
}
