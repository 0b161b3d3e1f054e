//! Regex extraction from the game bot's free-form output.
//!
//! The game bot speaks fixed English templates, so everything here is
//! keyword and regex heuristics tuned to those templates. Matching is
//! deliberately loose about surrounding markdown (`**` bolding and the
//! like) and strict about the numbers being extracted.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:(?P<hours>\d+)h\s*)?(?P<minutes>\d+)\**\s*min").expect("valid regex")
});

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

static CLAIM_SUCCESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*(?P<claimer>[^*\n]+)\*\*\s+(?:and\s+\*\*[^*\n]+\*\*\s+are\s+now\s+married|claims?\b)")
        .expect("valid regex")
});

static KAKERA_SUCCESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(?P<claimer>[^*\n]+)\*\*\s*\+\s*\d+")
        .expect("valid regex")
});

static ROLL_LIMITED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)roulette\s+is\s+limited").expect("valid regex"));

/// Extracts a duration of the shape `[<hours>h] <minutes>min`.
///
/// The hour part is optional and defaults to zero; text without the
/// minutes part yields `None`, never a zero duration.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let caps = DURATION_RE.captures(text)?;
    let minutes: i64 = caps.name("minutes")?.as_str().parse().ok()?;
    let hours: i64 = caps
        .name("hours")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(Duration::minutes(hours * 60 + minutes))
}

/// Extracts the first run of digits anywhere in the text.
pub fn parse_integer(text: &str) -> Option<u32> {
    INTEGER_RE.find(text)?.as_str().parse().ok()
}

/// Result of a claim attempt, read from the game bot's reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Somebody took the character. Not necessarily us.
    Succeeded { claimer: String },
    /// The claim cooldown is active for this long.
    Cooldown(Duration),
    /// The reply did not look like a claim result at all.
    Unknown,
}

/// Interprets the game bot's reply to a claim reaction.
pub fn parse_claim_outcome(text: &str) -> ClaimOutcome {
    if let Some(claimer) = CLAIM_SUCCESS_RE
        .captures(text)
        .and_then(|caps| caps.name("claimer"))
    {
        return ClaimOutcome::Succeeded {
            claimer: claimer.as_str().trim().to_string(),
        };
    }
    cooldown_or_unknown(text)
}

/// Interprets the game bot's reply to a kakera reaction.
pub fn parse_kakera_outcome(text: &str) -> ClaimOutcome {
    if let Some(claimer) = KAKERA_SUCCESS_RE
        .captures(text)
        .and_then(|caps| caps.name("claimer"))
    {
        return ClaimOutcome::Succeeded {
            claimer: claimer.as_str().trim().to_string(),
        };
    }
    cooldown_or_unknown(text)
}

fn cooldown_or_unknown(text: &str) -> ClaimOutcome {
    let lowered = text.to_lowercase();
    if lowered.contains("wait") || lowered.contains("cooldown") {
        if let Some(wait) = parse_duration(text) {
            return ClaimOutcome::Cooldown(wait);
        }
    }
    ClaimOutcome::Unknown
}

/// Detects the out-of-rolls notice, returning the reset duration when the
/// notice carries one.
pub fn parse_roll_limited(text: &str) -> Option<Duration> {
    if ROLL_LIMITED_RE.is_match(text) {
        parse_duration(text)
    } else {
        None
    }
}

/// What a status-report line said about one cooldown, if it appeared.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CooldownLine {
    /// No line mentioned this cooldown.
    #[default]
    Absent,
    /// The action is available right now.
    Ready,
    /// Remaining time until the cooldown resets.
    ResetIn(Duration),
}

/// Typed contents of one parsed status report. Fields stay at their
/// defaults when the report had no line for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub claim: CooldownLine,
    pub rolls_left: Option<u32>,
    pub rolls_reset: CooldownLine,
    pub kakera: CooldownLine,
    pub kakera_power: Option<f64>,
    pub kakera_consumption: Option<f64>,
    pub kakera_stock: Option<u32>,
    pub daily: CooldownLine,
}

/// Parses a status report into typed fields.
///
/// Returns `None` when the text does not look like our status report: it
/// must start by addressing `own_name`, and fewer than half of its lines
/// may go unrecognized. The ratio guard keeps unrelated bot chatter from
/// being mistaken for a report.
pub fn parse_status_report(text: &str, own_name: &str, daily_token: &str) -> Option<StatusReport> {
    let prefix = format!("**{}**", own_name);
    if !text.starts_with(&prefix) {
        return None;
    }

    let daily_token = daily_token.to_lowercase();
    let mut report = StatusReport::default();
    let mut total = 0usize;
    let mut unrecognized = 0usize;

    for line in text.trim().lines().map(str::trim).filter(|l| !l.is_empty()) {
        total += 1;
        let line = line.to_lowercase();

        if line.contains("claim") && line.contains("reset") {
            report.claim = cooldown_line(&line);
        } else if line.contains("rolls") && line.contains("left") {
            report.rolls_left = Some(parse_integer(&line).unwrap_or(0));
        } else if line.contains("rolls") && line.contains("reset") {
            report.rolls_reset = cooldown_line(&line);
        } else if line.contains("react") && line.contains("kakera") {
            report.kakera = cooldown_line(&line);
        } else if line.contains("power") && line.contains("kakera") {
            for part in line.split('(') {
                if part.contains("power") {
                    report.kakera_power = Some(percentage(part));
                } else if part.contains("consume") {
                    report.kakera_consumption = Some(percentage(part));
                }
            }
        } else if line.contains("stock") && line.contains("kakera") {
            report.kakera_stock = Some(parse_integer(&line).unwrap_or(0));
        } else if !daily_token.is_empty() && line.contains(&daily_token) {
            // the daily line drives an actual command send, so only the
            // explicit ready wording clears it
            if let Some(wait) = parse_duration(&line) {
                report.daily = CooldownLine::ResetIn(wait);
            } else if line_says_ready(&line) {
                report.daily = CooldownLine::Ready;
            }
        } else {
            unrecognized += 1;
        }
    }

    if total > 0 && unrecognized * 2 < total {
        Some(report)
    } else {
        None
    }
}

fn cooldown_line(line: &str) -> CooldownLine {
    match parse_duration(line) {
        Some(wait) => CooldownLine::ResetIn(wait),
        // the templates say "right now" when nothing is pending
        None => CooldownLine::Ready,
    }
}

fn line_says_ready(line: &str) -> bool {
    line.contains("now") || line.contains("ready") || line.contains("available")
}

fn percentage(part: &str) -> f64 {
    parse_integer(part).map_or(0.0, |value| value as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "**Self**, your claim reset is in **2h 15** min.\n\
        You have **7** rolls left.\n\
        Next rolls reset in **45** min.\n\
        You can react to kakera right now!\n\
        Power of kakera: **54%** (consumes 30% per claim)\n\
        Stock of kakera: **1200**\n\
        $dk is ready!";

    #[test]
    fn test_duration_with_hours() {
        assert_eq!(parse_duration("2h 15min"), Some(Duration::minutes(135)));
        assert_eq!(
            parse_duration("your claim reset is in **2h 15** min."),
            Some(Duration::minutes(135))
        );
    }

    #[test]
    fn test_duration_without_hours() {
        assert_eq!(parse_duration("45**min"), Some(Duration::minutes(45)));
        assert_eq!(parse_duration("12 MIN"), Some(Duration::minutes(12)));
    }

    #[test]
    fn test_duration_absent_is_none() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_integer_takes_first_digit_run() {
        assert_eq!(parse_integer("You have **7** rolls left."), Some(7));
        assert_eq!(parse_integer("no digits here"), None);
    }

    #[test]
    fn test_claim_outcome_marriage() {
        assert_eq!(
            parse_claim_outcome("\u{1f496} **Self** and **Rem** are now married!"),
            ClaimOutcome::Succeeded {
                claimer: "Self".to_string()
            }
        );
    }

    #[test]
    fn test_claim_outcome_short_form() {
        assert_eq!(
            parse_claim_outcome("**Self** claims rem!"),
            ClaimOutcome::Succeeded {
                claimer: "Self".to_string()
            }
        );
    }

    #[test]
    fn test_claim_outcome_cooldown() {
        assert_eq!(
            parse_claim_outcome("Wait **1h 23** min before claiming again."),
            ClaimOutcome::Cooldown(Duration::minutes(83))
        );
        assert_eq!(
            parse_claim_outcome("Cooldown: 12min"),
            ClaimOutcome::Cooldown(Duration::minutes(12))
        );
    }

    #[test]
    fn test_claim_outcome_unknown() {
        assert_eq!(parse_claim_outcome("rem appeared!"), ClaimOutcome::Unknown);
        // cooldown keyword without a parsable duration stays unknown
        assert_eq!(
            parse_claim_outcome("please wait a moment"),
            ClaimOutcome::Unknown
        );
    }

    #[test]
    fn test_kakera_outcome() {
        assert_eq!(
            parse_kakera_outcome("**Self** +51 (**Rem**)"),
            ClaimOutcome::Succeeded {
                claimer: "Self".to_string()
            }
        );
        assert_eq!(
            parse_kakera_outcome("You have to wait **24** min before reacting to kakera."),
            ClaimOutcome::Cooldown(Duration::minutes(24))
        );
    }

    #[test]
    fn test_roll_limited_notice() {
        assert_eq!(
            parse_roll_limited("The roulette is limited to 10 uses per hour. Next reset in **32** min."),
            Some(Duration::minutes(32))
        );
        assert_eq!(parse_roll_limited("Next reset in **32** min."), None);
    }

    #[test]
    fn test_status_report_full() {
        let report = parse_status_report(REPORT, "Self", "$dk").unwrap();
        assert_eq!(report.claim, CooldownLine::ResetIn(Duration::minutes(135)));
        assert_eq!(report.rolls_left, Some(7));
        assert_eq!(report.rolls_reset, CooldownLine::ResetIn(Duration::minutes(45)));
        assert_eq!(report.kakera, CooldownLine::Ready);
        assert_eq!(report.kakera_power, Some(0.54));
        assert_eq!(report.kakera_consumption, Some(0.3));
        assert_eq!(report.kakera_stock, Some(1200));
        assert_eq!(report.daily, CooldownLine::Ready);
    }

    #[test]
    fn test_status_report_absent_lines_stay_default() {
        let report = parse_status_report(
            "**Self**, your claim reset is in **10** min.\nYou have **3** rolls left.",
            "Self",
            "$dk",
        )
        .unwrap();
        assert_eq!(report.claim, CooldownLine::ResetIn(Duration::minutes(10)));
        assert_eq!(report.rolls_left, Some(3));
        assert_eq!(report.kakera, CooldownLine::Absent);
        assert_eq!(report.daily, CooldownLine::Absent);
        assert_eq!(report.kakera_power, None);
    }

    #[test]
    fn test_status_report_requires_own_name_prefix() {
        assert!(parse_status_report(REPORT, "SomeoneElse", "$dk").is_none());
        assert!(parse_status_report("hello there", "Self", "$dk").is_none());
    }

    #[test]
    fn test_status_report_rejects_mostly_unrecognized_text() {
        let text = "**Self**, you can claim right now, the reset is in **49** min.\n\
            something unrelated\n\
            more chatter";
        assert!(parse_status_report(text, "Self", "$dk").is_none());
    }

    #[test]
    fn test_status_report_daily_reset_pending() {
        let report = parse_status_report(
            "**Self**, your claim reset is in **5** min.\nNext $dk reset in **11h 4** min.",
            "Self",
            "$dk",
        )
        .unwrap();
        assert_eq!(
            report.daily,
            CooldownLine::ResetIn(Duration::minutes(11 * 60 + 4))
        );
    }

    #[test]
    fn test_status_report_empty_text_rejected() {
        assert!(parse_status_report("", "Self", "$dk").is_none());
        assert!(parse_status_report("**Self**", "Self", "$dk").is_none());
    }
}
