use chrono::{DateTime, Utc};

/// Truncate a long hex id (transaction id, block id) to "abcd1234...ef12" format
pub fn truncate_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() > 16 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        id.to_string()
    }
}

/// Join card ids as "[1, 2, 3]"
pub fn join_ids(ids: &[u64]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format an RFC 3339 block timestamp as "Xm ago", "Xh ago", etc.
pub fn format_time_ago(timestamp: &str) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return String::new();
    };
    let diff = Utc::now()
        .signed_duration_since(parsed.with_timezone(&Utc))
        .num_seconds();
    if diff < 0 {
        return "just now".to_string();
    }
    if diff < 60 {
        format!("{diff}s ago")
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}

/// Format an RFC 3339 block timestamp for display
pub fn format_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%b %d, %Y %H:%M:%S UTC")
                .to_string()
        })
        .unwrap_or_else(|_| "Unknown".to_string())
}
