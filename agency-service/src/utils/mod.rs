use rand::Rng;

/// Display id for a new trip, e.g. `TRIP-4217`. Four random digits with no
/// collision check: the document id is the real identity, this is the short
/// handle operators read out over the phone.
pub fn generate_trip_id() -> String {
    let n: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("TRIP-{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_id_is_prefix_plus_four_digits() {
        for _ in 0..100 {
            let id = generate_trip_id();
            let digits = id.strip_prefix("TRIP-").expect("missing TRIP- prefix");
            assert_eq!(digits.len(), 4);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
            assert!(!digits.starts_with('0'));
        }
    }
}
