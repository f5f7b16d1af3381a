//! Validity report for a decoded token
//!
//! The report is a plain value; rendering happens through `Display` so the
//! caller decides where it is written.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::jwt::Payload;

const MISSING: &str = "N/A";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Outcome of comparing the expiry claim with the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// `exp` is strictly before now; whole days elapsed since
    Expired { days: i64 },
    /// `exp` is now or later; whole days remaining
    Valid { days: i64 },
    /// `exp` is absent, not an integer, or out of calendar range
    NoExpiry,
}

impl Verdict {
    pub fn evaluate(expires: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if expires < now {
            Verdict::Expired {
                days: (now - expires).num_days(),
            }
        } else {
            Verdict::Valid {
                days: (expires - now).num_days(),
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Verdict::Expired { .. })
    }
}

/// Rendered view of a payload at a given instant, in time zone `Tz`
#[derive(Debug, Clone)]
pub struct Report<Tz: TimeZone> {
    pub issued: Option<DateTime<Tz>>,
    pub expires: Option<DateTime<Tz>>,
    pub now: DateTime<Tz>,
    pub client_id: Option<String>,
    pub verdict: Verdict,
}

/// Build the report for `payload` evaluated at `now`, displayed in `tz`
pub fn report<Tz: TimeZone>(payload: &Payload, now: DateTime<Utc>, tz: &Tz) -> Report<Tz> {
    let issued = payload.issued_at().and_then(|t| DateTime::<Utc>::from_timestamp(t, 0));
    let expires = payload.expires_at().and_then(|t| DateTime::<Utc>::from_timestamp(t, 0));

    let verdict = match expires {
        Some(exp) => Verdict::evaluate(exp, now),
        None => Verdict::NoExpiry,
    };

    Report {
        issued: issued.map(|dt| dt.with_timezone(tz)),
        expires: expires.map(|dt| dt.with_timezone(tz)),
        now: now.with_timezone(tz),
        client_id: payload.client_id().map(str::to_string),
        verdict,
    }
}

fn format_opt<Tz>(dt: &Option<DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    dt.as_ref()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

impl<Tz> fmt::Display for Report<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Token issued:  {}", format_opt(&self.issued))?;
        writeln!(f, "Token expires: {}", format_opt(&self.expires))?;
        writeln!(f, "Current time:  {}", self.now.format(NOW_FORMAT))?;
        writeln!(f)?;
        writeln!(
            f,
            "Dhan Client ID: {}",
            self.client_id.as_deref().unwrap_or(MISSING)
        )?;
        writeln!(f)?;

        match self.verdict {
            Verdict::Expired { days } => {
                writeln!(f, "❌ TOKEN EXPIRED!")?;
                writeln!(f, "Expired {} days ago", days)
            }
            Verdict::Valid { days } => {
                writeln!(f, "✅ TOKEN VALID")?;
                writeln!(f, "Expires in {} days", days)
            }
            Verdict::NoExpiry => writeln!(f, "⚠️ TOKEN HAS NO USABLE EXPIRY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::decode;
    use crate::jwt::tests::{token_with, DHAN_TOKEN};
    use chrono::{Duration, FixedOffset};
    use serde_json::json;

    fn at(epoch: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(epoch, 0).unwrap()
    }

    #[test]
    fn test_expired_example() {
        let payload = decode(&token_with(&json!({
            "iat": 1700000000,
            "exp": 1700003600,
            "dhanClientId": "ABC123",
        })))
        .unwrap();

        let report = report(&payload, at(1700007200), &Utc);
        assert_eq!(report.verdict, Verdict::Expired { days: 0 });
        assert_eq!(
            report.to_string(),
            "Token issued:  2023-11-14 22:13:20\n\
             Token expires: 2023-11-14 23:13:20\n\
             Current time:  2023-11-15 00:13:20.000000\n\
             \n\
             Dhan Client ID: ABC123\n\
             \n\
             ❌ TOKEN EXPIRED!\n\
             Expired 0 days ago\n"
        );
    }

    #[test]
    fn test_valid_in_local_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let payload = decode(DHAN_TOKEN).unwrap();

        // Two and a half days before expiry
        let now = at(1763235508) - Duration::hours(60);
        let report = report(&payload, now, &ist);

        assert_eq!(report.verdict, Verdict::Valid { days: 2 });
        let text = report.to_string();
        assert!(text.starts_with(
            "Token issued:  2025-11-15 01:08:28\nToken expires: 2025-11-16 01:08:28\n"
        ));
        assert!(text.contains("Dhan Client ID: 1108117910\n"));
        assert!(text.ends_with("✅ TOKEN VALID\nExpires in 2 days\n"));
    }

    #[test]
    fn test_elapsed_days_are_floored() {
        let exp = at(1_000_000);
        let now = exp + Duration::days(3) + Duration::hours(23);
        assert_eq!(Verdict::evaluate(exp, now), Verdict::Expired { days: 3 });

        let now = exp - Duration::days(1) - Duration::seconds(1);
        assert_eq!(Verdict::evaluate(exp, now), Verdict::Valid { days: 1 });
    }

    #[test]
    fn test_sub_second_past_expiry_is_expired() {
        let exp = at(1_000_000);
        let now = exp + Duration::milliseconds(250);
        let verdict = Verdict::evaluate(exp, now);
        assert!(verdict.is_expired());
        assert_eq!(verdict, Verdict::Expired { days: 0 });
    }

    #[test]
    fn test_expiry_equal_to_now_is_valid() {
        let exp = at(1_000_000);
        assert_eq!(Verdict::evaluate(exp, exp), Verdict::Valid { days: 0 });
    }

    #[test]
    fn test_missing_client_id() {
        let payload = decode(&token_with(&json!({"iat": 0, "exp": 10}))).unwrap();
        let text = report(&payload, at(0), &Utc).to_string();
        assert!(text.contains("Dhan Client ID: N/A\n"));
    }

    #[test]
    fn test_missing_timestamps() {
        let payload = decode(&token_with(&json!({"exp": "tomorrow"}))).unwrap();
        let report = report(&payload, at(0), &Utc);

        assert_eq!(report.verdict, Verdict::NoExpiry);
        let text = report.to_string();
        assert!(text.starts_with("Token issued:  N/A\nToken expires: N/A\n"));
        assert!(text.ends_with("⚠️ TOKEN HAS NO USABLE EXPIRY\n"));
    }

    #[test]
    fn test_out_of_range_expiry() {
        let payload = decode(&token_with(&json!({"exp": i64::MAX}))).unwrap();
        assert_eq!(report(&payload, at(0), &Utc).verdict, Verdict::NoExpiry);
    }
}
