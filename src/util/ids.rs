use chrono::Utc;
use rand::Rng;

const SUFFIX_LENGTH: usize = 6;

/// Fresh id of the form `{prefix}-{unix_millis}-{6 lowercase alphanumerics}`.
///
/// Used for drafts and shows created on this device. Ids are unique in
/// practice, not guaranteed.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SUFFIX_LENGTH)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id("draft");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "draft");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), SUFFIX_LENGTH);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_id_differs() {
        assert_ne!(generate_id("show"), generate_id("show"));
    }
}
