//! Payloads of the breaks socket events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `authMessage` event: authorization confirmation with user info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthMessage {
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(rename = "isSuperUser", default)]
    pub is_super_user: bool,
}

/// `userBreaks` event: the user's break allowance per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserBreaks {
    #[serde(rename = "line5", default)]
    pub breaks_5: u32,
    #[serde(rename = "line10", default)]
    pub breaks_10: u32,
    #[serde(rename = "line15", default)]
    pub breaks_15: u32,
}

impl UserBreaks {
    /// Total breaks across all lines.
    pub fn total(&self) -> u32 {
        self.breaks_5 + self.breaks_10 + self.breaks_15
    }
}

/// Per-line break data in the full `pageData` format (includes discharge
/// information).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakLineData {
    /// Rendered break table (HTML).
    #[serde(default)]
    pub table: String,
    #[serde(rename = "breakNumber", default)]
    pub break_number: u32,
    /// Rendered discharge table (HTML).
    #[serde(default)]
    pub discharge: String,
    #[serde(rename = "dischargeNumber", default)]
    pub discharge_number: u32,
    #[serde(rename = "openDischargesCount", default)]
    pub open_discharges_count: u32,
}

/// Per-line break data in the reduced format used by the ntp-one and
/// ntp-two rooms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleBreakLineData {
    #[serde(default)]
    pub table: String,
    #[serde(rename = "breakNumber", default)]
    pub break_number: u32,
}

/// `pageData` event, full format: break data per line plus the operator
/// queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub lines: HashMap<String, BreakLineData>,
    #[serde(default)]
    pub queue: String,
}

impl PageData {
    pub fn get_line(&self, line_name: &str) -> Option<&BreakLineData> {
        self.lines.get(line_name)
    }

    pub fn line_names(&self) -> Vec<&str> {
        self.lines.keys().map(String::as_str).collect()
    }
}

/// `pageData` event, reduced format, with Finesse server status instead of
/// discharge data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplePageData {
    #[serde(default)]
    pub lines: HashMap<String, SimpleBreakLineData>,
    #[serde(default)]
    pub queue: String,
    #[serde(rename = "finesseCheck", default)]
    pub finesse_check: String,
    #[serde(rename = "finesseServer", default)]
    pub finesse_server: String,
}

impl SimplePageData {
    pub fn get_line(&self, line_name: &str) -> Option<&SimpleBreakLineData> {
        self.lines.get(line_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_breaks_total() {
        let breaks: UserBreaks =
            serde_json::from_value(json!({"line5": 1, "line10": 0, "line15": 3})).unwrap();
        assert_eq!(breaks.breaks_5, 1);
        assert_eq!(breaks.total(), 4);
    }

    #[test]
    fn page_data_decodes_lines() {
        let data: PageData = serde_json::from_value(json!({
            "lines": {
                "line5": {"table": "<tr></tr>", "breakNumber": 2, "discharge": "", "dischargeNumber": 1, "openDischargesCount": 0},
            },
            "queue": "<table></table>"
        }))
        .unwrap();
        assert_eq!(data.get_line("line5").unwrap().break_number, 2);
        assert_eq!(data.line_names(), vec!["line5"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let auth: AuthMessage = serde_json::from_value(json!({})).unwrap();
        assert_eq!(auth.user_name, "");
        assert!(!auth.is_super_user);
    }

    #[test]
    fn malformed_lines_value_is_a_decode_error() {
        let result = serde_json::from_value::<PageData>(json!({"lines": {"line5": 42}}));
        assert!(result.is_err());
    }
}
