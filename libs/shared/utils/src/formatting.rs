/// Renders a call duration as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Every started minute is billable; zero seconds bills nothing.
pub fn billed_minutes(seconds: u64) -> u64 {
    seconds.div_ceil(60)
}

pub fn format_amount(currency_symbol: &str, amount: u64) -> String {
    format!("{} {}", currency_symbol, amount)
}
