use rand::Rng;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of infraction and promotion ids shown to staff.
pub const RECORD_ID_LEN: usize = 8;

/// Generate a short uppercase alphanumeric record id, e.g. `Q7K2M9ZA`.
pub fn generate_record_id() -> String {
    let mut rng = rand::rng();
    (0..RECORD_ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Normalize user input of a record id. Ids are case-insensitive for staff.
pub fn normalize_record_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() != RECORD_ID_LEN || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }

    Some(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::{RECORD_ID_LEN, generate_record_id, normalize_record_id};

    #[test]
    fn generated_ids_use_the_alphabet() {
        for _ in 0..64 {
            let id = generate_record_id();
            assert_eq!(id.len(), RECORD_ID_LEN);
            assert!(
                id.chars()
                    .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
            );
        }
    }

    #[test]
    fn normalizes_record_ids() {
        assert_eq!(normalize_record_id(" ab12cd34 "), Some("AB12CD34".to_owned()));
        assert_eq!(normalize_record_id("AB12CD3"), None);
        assert_eq!(normalize_record_id("AB12-D34"), None);
        assert_eq!(normalize_record_id(""), None);
    }
}
