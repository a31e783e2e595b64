#[cfg(test)]
mod tests_properties {
    use isbn_scheduler::{compute_check_digit, format_identifier, is_valid_identifier};
    use proptest::prelude::*;

    fn weighted_sum(identifier: &str) -> u32 {
        identifier
            .bytes()
            .enumerate()
            .map(|(i, b)| {
                let digit = u32::from(b - b'0');
                if i % 2 == 0 { digit } else { digit * 3 }
            })
            .sum()
    }

    proptest! {
        #[test]
        fn check_digit_satisfies_mod_ten_rule(body in "[0-9]{12}") {
            let check = compute_check_digit(&body).expect("twelve digits");
            let full = format!("{body}{check}");
            prop_assert_eq!(weighted_sum(&full) % 10, 0);
            prop_assert!(is_valid_identifier(&full));
        }

        #[test]
        fn single_digit_change_is_detected(
            body in "[0-9]{12}",
            position in 0usize..13,
            delta in 1u8..10,
        ) {
            let check = compute_check_digit(&body).expect("twelve digits");
            let mut bytes = format!("{body}{check}").into_bytes();
            bytes[position] = b'0' + (bytes[position] - b'0' + delta) % 10;
            let altered = String::from_utf8(bytes).expect("ascii");
            prop_assert!(!is_valid_identifier(&altered));
        }

        #[test]
        fn formatted_identifiers_are_always_valid(
            registrant in "[0-9]{1,8}",
            sequence in any::<u64>(),
        ) {
            let identifier = format_identifier("978", &registrant, sequence);
            prop_assert_eq!(identifier.len(), 13);
            prop_assert!(identifier.starts_with("978"));
            prop_assert!(is_valid_identifier(&identifier));
        }

        #[test]
        fn consecutive_sequences_stay_distinct(
            registrant in "[0-9]{6}",
            start in 0u64..1_000_000,
        ) {
            let a = format_identifier("978", &registrant, start);
            let b = format_identifier("978", &registrant, start + 1);
            prop_assert_ne!(a, b);
        }
    }
}
