use chrono::NaiveDateTime;

/// Two-letter avatar initials for a person's name.
/// First and last word for multi-word names, first two letters otherwise.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => "??".to_string(),
        [single] => single.chars().take(2).collect::<String>().to_uppercase(),
        [first, .., last] => {
            let mut out = String::new();
            out.extend(first.chars().next());
            out.extend(last.chars().next());
            out.to_uppercase()
        }
    }
}

/// `dd/mm/yyyy`, or `N/A` when there is no date.
pub fn format_date(date: Option<&NaiveDateTime>) -> String {
    match date {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// `dd/mm/yyyy HH:MM`, or `N/A` when there is no date.
pub fn format_date_time(date: Option<&NaiveDateTime>) -> String {
    match date {
        Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

/// Human-readable byte count (B, KB, MB, GB).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

/// Truncate a string to a maximum length in characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
