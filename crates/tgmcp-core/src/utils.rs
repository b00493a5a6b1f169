use chrono::{Local, TimeZone};

/// Fixed-pattern, second-precision local rendering of a message's epoch date.
pub fn format_message_date(epoch: i64) -> String {
    match Local.timestamp_opt(epoch, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        // Out-of-range epoch from the wire; render it raw rather than fail.
        _ => format!("@{epoch}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_date_has_fixed_shape() {
        let s = format_message_date(1_700_000_000);
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(s.len(), 19);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
        assert_eq!(&s[13..14], ":");
    }

    #[test]
    fn message_date_matches_chrono_local() {
        let epoch = 1_700_000_000;
        let expected = Local
            .timestamp_opt(epoch, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(format_message_date(epoch), expected);
    }
}
