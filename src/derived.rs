// /derived.rs
use crate::record::CharacterRecord;
use crate::schema::FieldSchema;

/// Reads the leading base-10 integer of `raw`.
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit and anything without digits counts as 0. Out of range values
/// saturate.
pub fn parse_int(raw: &str) -> i64 {
    let text = raw.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut total: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        let next = total
            .checked_mul(10)
            .and_then(|value| {
                if negative {
                    value.checked_sub(digit)
                } else {
                    value.checked_add(digit)
                }
            });
        match next {
            Some(value) => total = value,
            None => return if negative { i64::MIN } else { i64::MAX },
        }
    }
    total
}

// Display badge for an ability score, e.g. "3d6".
pub fn dice_badge(raw: &str) -> String {
    format!("{}d6", parse_int(raw))
}

/// Recomputes every derived field of `record` and returns the fields it wrote.
pub fn update_derived(schema: &FieldSchema, record: &mut CharacterRecord) -> Vec<&'static str> {
    let mut written = Vec::new();

    let initiative = schema.initiative();
    let total = parse_int(record.get(initiative.left))
        .saturating_add(parse_int(record.get(initiative.right)));
    if record.set(initiative.output, total.to_string()) {
        written.push(initiative.output);
    }

    if schema.dice_badges() {
        for (ability, badge) in schema.badge_fields() {
            let value = dice_badge(record.get(ability));
            if record.set(badge, value) {
                written.push(badge);
            }
        }
    }

    written
}
