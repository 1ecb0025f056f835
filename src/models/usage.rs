use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One quota window as reported by the OAuth usage endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    #[serde(default)]
    pub utilization: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_datetime")]
    pub resets_at: Option<DateTime<Utc>>,
}

impl UsageWindow {
    pub fn percent(&self) -> f64 {
        self.utilization.unwrap_or(0.0)
    }
}

/// Session (5h) and weekly (7d) utilization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageQuota {
    #[serde(default)]
    pub five_hour: Option<UsageWindow>,
    #[serde(default)]
    pub seven_day: Option<UsageWindow>,
}

impl UsageQuota {
    pub fn session(&self) -> UsageWindow {
        self.five_hour.clone().unwrap_or_default()
    }

    pub fn week(&self) -> UsageWindow {
        self.seven_day.clone().unwrap_or_default()
    }
}

// Unparseable timestamps read as "unknown" rather than rejecting the payload.
fn deserialize_lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }))
}
