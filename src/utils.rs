/// First character upper-cased, the rest lower-cased
///
/// Day labels are free text, so `"MONDAY"` and `"monday"` both print as `"Monday"`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("monday"), "Monday");
        assert_eq!(capitalize("TUESDAY"), "Tuesday");
        assert_eq!(capitalize("miércoles"), "Miércoles");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(600.0), "600.00");
        assert_eq!(format_amount(12.345), "12.35");
    }
}
