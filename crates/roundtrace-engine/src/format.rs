use serde_json::Value;

/// Format a latency for display
/// Examples: 850ms, 2.5s, 1.3m
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}

/// Single-line preview of at most `max_chars` characters (plus `...` when cut)
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let head: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", head.trim_end())
    }
}

/// Format number with commas (e.g., 12345 → "12,345")
pub fn format_tokens(n: u64) -> String {
    let s = n.to_string();
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

pub fn format_cost(usd: f64) -> String {
    format!("${:.4}", usd)
}

/// Short human summary of a tool call's arguments
pub fn tool_summary(input: &Value) -> String {
    if let Some(file_path) = input
        .get("file_path")
        .or_else(|| input.get("notebook_path"))
        .and_then(Value::as_str)
        && let Some(filename) = std::path::Path::new(file_path)
            .file_name()
            .and_then(|n| n.to_str())
    {
        return filename.to_string();
    }

    if let Some(cmd) = input.get("command").and_then(Value::as_str) {
        return truncate_preview(cmd, 50);
    }

    if let Some(pattern) = input.get("pattern").and_then(Value::as_str) {
        return format!("\"{}\"", truncate_preview(pattern, 30));
    }

    if let Some(url) = input.get("url").and_then(Value::as_str) {
        return truncate_preview(url, 50);
    }

    String::new()
}
