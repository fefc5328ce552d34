use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `STJ` + epoch milliseconds + four random upper-case base-36 characters.
pub fn generate_receipt_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("STJ{}{}", now.timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_number_format() {
        let now = Utc::now();
        let receipt = generate_receipt_number(now);
        let millis = now.timestamp_millis().to_string();

        assert!(receipt.starts_with("STJ"));
        assert_eq!(&receipt[3..3 + millis.len()], millis);
        let suffix = &receipt[3 + millis.len()..];
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
