use colored::Colorize;
use declarative::Value;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Value Formatting
// ============================================================================

/// Name fragments of properties whose values are never printed
const SECRET_MARKERS: &[&str] = &["password", "pre_shared_key", "static_key", "private_key", "protection_key"];

/// Whether a property holds a secret
pub fn is_secret(name: &str) -> bool {
    SECRET_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Format a value for display. Strings are shown bare, lists bracketed.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        Value::String(s) => s.clone(),
        Value::List(items) => format!("[{}]", items.join(", ")),
    }
}

/// Format a property value, masking secrets
pub fn format_property(name: &str, value: &Value) -> String {
    if is_secret(name) {
        "(sensitive)".to_string()
    } else {
        format_value(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_scalars() {
        assert_eq!(format_value(&Value::Bool(true)), "true");
        assert_eq!(format_value(&Value::Int(1500)), "1500");
        assert_eq!(format_value(&Value::from("bond1")), "bond1");
        assert_eq!(format_value(&Value::from("")), "\"\"");
    }

    #[test]
    fn test_format_value_list() {
        assert_eq!(
            format_value(&Value::list(["ether3", "ether4"])),
            "[ether3, ether4]"
        );
        assert_eq!(format_value(&Value::List(vec![])), "[]");
    }

    #[test]
    fn test_format_property_masks_secrets() {
        let key = Value::from("hunter22");
        assert_eq!(format_property("wpa2_pre_shared_key", &key), "(sensitive)");
        assert_eq!(format_property("mschapv2_password", &key), "(sensitive)");
        assert_eq!(format_property("static_key_0", &key), "(sensitive)");
        assert_eq!(format_property("comment", &key), "hunter22");
    }

    #[test]
    fn test_is_secret() {
        assert!(is_secret("management_protection_key"));
        assert!(!is_secret("static_transmit_key"));
        assert!(!is_secret("name"));
    }
}
