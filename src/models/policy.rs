use crate::core::error::PolicyError;
use crate::policy::ranking::RankCriterion;
use crate::policy::rules::Combinator;
use crate::utils::time::days_to_duration;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Raw key-value form of the policy, as persisted and as exchanged with callers.
///
/// Keys the policy does not know about are carried along untouched.
pub type PolicyDocument = Map<String, Value>;

/// Retention policy applied by every removal pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyConfig {
    /// Maximum number of torrents to keep. Negative means unlimited.
    pub max_seeds: i64,
    /// Primary ranking criterion
    pub filter: RankCriterion,
    /// Secondary ranking criterion, breaks ties in the primary one
    pub filter2: RankCriterion,
    /// How the two threshold tests are combined
    pub sel_func: Combinator,
    /// Minimum primary score a candidate needs before it may be removed
    pub min: f64,
    /// Minimum secondary score
    pub min2: f64,
    /// Whether ignored and tracker-exempt torrents count toward `max_seeds`
    pub count_exempt: bool,
    /// Delete downloaded data along with the torrent
    pub remove_data: bool,
    /// Tracker URL substrings whose torrents are never removed
    pub trackers: Vec<String>,
    /// Days between passes
    pub interval: f64,
    /// Compute and log decisions without removing anything
    pub dry_run: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_seeds: -1,
            filter: RankCriterion::Ratio,
            filter2: RankCriterion::DateAdded,
            sel_func: Combinator::And,
            min: 0.0,
            min2: 0.0,
            count_exempt: false,
            remove_data: false,
            trackers: Vec::new(),
            interval: 0.5,
            dry_run: false,
        }
    }
}

/// How unknown ranking criteria are treated while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strictness {
    Strict,
    Stored,
}

impl PolicyConfig {
    pub fn is_unlimited(&self) -> bool {
        self.max_seeds < 0
    }

    /// Period between passes, None when `interval` is not a positive number of days
    pub fn interval_period(&self) -> Option<Duration> {
        days_to_duration(self.interval)
    }

    /// The document holding every field at its default value
    pub fn default_document() -> PolicyDocument {
        PolicyConfig::default().to_document()
    }

    pub fn to_document(&self) -> PolicyDocument {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Parse a document supplied by a caller. Unknown selector names are rejected.
    pub fn from_document(doc: &PolicyDocument) -> Result<Self, PolicyError> {
        Self::parse(doc, Strictness::Strict)
    }

    /// Parse a document read back from disk.
    ///
    /// An unknown ranking criterion falls back to `ratio`; an unknown
    /// combination rule is still an error.
    pub fn from_stored_document(doc: &PolicyDocument) -> Result<Self, PolicyError> {
        Self::parse(doc, Strictness::Stored)
    }

    fn parse(doc: &PolicyDocument, strictness: Strictness) -> Result<Self, PolicyError> {
        let defaults = PolicyConfig::default();

        let criterion = |key: &str, default: RankCriterion| -> Result<RankCriterion, PolicyError> {
            match get_str(doc, key)? {
                None => Ok(default),
                Some(name) if strictness == Strictness::Stored => Ok(RankCriterion::resolve_or_ratio(name)),
                Some(name) => name.parse(),
            }
        };

        let config = PolicyConfig {
            max_seeds: get_i64(doc, "max_seeds")?.unwrap_or(defaults.max_seeds),
            filter: criterion("filter", defaults.filter)?,
            filter2: criterion("filter2", defaults.filter2)?,
            sel_func: match get_str(doc, "sel_func")? {
                Some(name) => name.parse()?,
                None => defaults.sel_func,
            },
            min: get_f64(doc, "min")?.unwrap_or(defaults.min),
            min2: get_f64(doc, "min2")?.unwrap_or(defaults.min2),
            count_exempt: get_bool(doc, "count_exempt")?.unwrap_or(defaults.count_exempt),
            remove_data: get_bool(doc, "remove_data")?.unwrap_or(defaults.remove_data),
            trackers: get_string_list(doc, "trackers")?.unwrap_or(defaults.trackers),
            interval: get_f64(doc, "interval")?.unwrap_or(defaults.interval),
            dry_run: get_bool(doc, "dry_run")?.unwrap_or(defaults.dry_run),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if self.interval_period().is_none() {
            return Err(PolicyError::OutOfRange {
                key: "interval".to_string(),
                reason: format!("must be a positive number of days, got {}", self.interval),
            });
        }

        for (key, value) in [("min", self.min), ("min2", self.min2)] {
            if !value.is_finite() {
                return Err(PolicyError::OutOfRange {
                    key: key.to_string(),
                    reason: "must be a finite number".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn invalid(key: &str, expected: &'static str) -> PolicyError {
    PolicyError::InvalidField {
        key: key.to_string(),
        expected,
    }
}

fn get_i64(doc: &PolicyDocument, key: &str) -> Result<Option<i64>, PolicyError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| invalid(key, "an integer")),
    }
}

fn get_f64(doc: &PolicyDocument, key: &str) -> Result<Option<f64>, PolicyError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| invalid(key, "a number")),
    }
}

fn get_bool(doc: &PolicyDocument, key: &str) -> Result<Option<bool>, PolicyError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| invalid(key, "a boolean")),
    }
}

fn get_str<'a>(doc: &'a PolicyDocument, key: &str) -> Result<Option<&'a str>, PolicyError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_str().map(Some).ok_or_else(|| invalid(key, "a string")),
    }
}

fn get_string_list(doc: &PolicyDocument, key: &str) -> Result<Option<Vec<String>>, PolicyError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Some)
            .ok_or_else(|| invalid(key, "a list of strings")),
        Some(_) => Err(invalid(key, "a list of strings")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> PolicyDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_default_document_fields() {
        let document = PolicyConfig::default_document();

        assert_eq!(document["max_seeds"], json!(-1));
        assert_eq!(document["filter"], json!("ratio"));
        assert_eq!(document["filter2"], json!("date_added"));
        assert_eq!(document["sel_func"], json!("and"));
        assert_eq!(document["count_exempt"], json!(false));
        assert_eq!(document["remove_data"], json!(false));
        assert_eq!(document["trackers"], json!([]));
        assert_eq!(document["min"], json!(0.0));
        assert_eq!(document["min2"], json!(0.0));
        assert_eq!(document["interval"], json!(0.5));
        assert_eq!(document["dry_run"], json!(false));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = PolicyConfig::from_document(&Map::new()).unwrap();
        assert_eq!(config, PolicyConfig::default());
        assert!(config.is_unlimited());
    }

    #[test]
    fn test_document_round_trip_through_defaults() {
        let config = PolicyConfig::from_document(&PolicyConfig::default_document()).unwrap();
        assert_eq!(config, PolicyConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let config = PolicyConfig::from_document(&doc(json!({
            "max_seeds": 10,
            "filter": "seed_time",
            "filter2": "func_ratio",
            "sel_func": "or",
            "min": 1.5,
            "min2": 2,
            "count_exempt": true,
            "remove_data": true,
            "trackers": ["private.org", "Other.net"],
            "interval": 1.0,
            "dry_run": true,
            "some_ui_setting": "kept elsewhere"
        })))
        .unwrap();

        assert_eq!(config.max_seeds, 10);
        assert_eq!(config.filter, RankCriterion::SeedTime);
        assert_eq!(config.filter2, RankCriterion::Ratio);
        assert_eq!(config.sel_func, Combinator::Or);
        assert_eq!(config.min, 1.5);
        assert_eq!(config.min2, 2.0);
        assert!(config.count_exempt);
        assert!(config.remove_data);
        assert_eq!(config.trackers, vec!["private.org", "Other.net"]);
        assert_eq!(config.interval_period(), Some(Duration::from_secs(86_400)));
        assert!(config.dry_run);
    }

    #[test]
    fn test_unknown_ranking_criterion_rejected_when_strict() {
        let err = PolicyConfig::from_document(&doc(json!({"filter": "size"}))).unwrap_err();
        assert_eq!(err, PolicyError::UnknownRankCriterion("size".to_string()));
    }

    #[test]
    fn test_unknown_ranking_criterion_falls_back_when_stored() {
        let config = PolicyConfig::from_stored_document(&doc(json!({
            "filter": "size",
            "filter2": "bogus"
        })))
        .unwrap();

        assert_eq!(config.filter, RankCriterion::Ratio);
        assert_eq!(config.filter2, RankCriterion::Ratio);
    }

    #[test]
    fn test_unknown_combinator_always_rejected() {
        let document = doc(json!({"sel_func": "xor"}));

        assert_eq!(
            PolicyConfig::from_document(&document).unwrap_err(),
            PolicyError::UnknownCombinator("xor".to_string())
        );
        assert_eq!(
            PolicyConfig::from_stored_document(&document).unwrap_err(),
            PolicyError::UnknownCombinator("xor".to_string())
        );
    }

    #[test]
    fn test_wrong_types_rejected() {
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"max_seeds": "ten"}))),
            Err(PolicyError::InvalidField { .. })
        ));
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"max_seeds": 2.5}))),
            Err(PolicyError::InvalidField { .. })
        ));
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"count_exempt": 1}))),
            Err(PolicyError::InvalidField { .. })
        ));
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"trackers": ["ok", 3]}))),
            Err(PolicyError::InvalidField { .. })
        ));
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"filter": 1}))),
            Err(PolicyError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_integral_float_accepted_for_max_seeds() {
        let config = PolicyConfig::from_document(&doc(json!({"max_seeds": 3.0}))).unwrap();
        assert_eq!(config.max_seeds, 3);
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"interval": 0.0}))),
            Err(PolicyError::OutOfRange { .. })
        ));
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"interval": -2}))),
            Err(PolicyError::OutOfRange { .. })
        ));
        // Positive but rounds to a zero period
        assert!(matches!(
            PolicyConfig::from_document(&doc(json!({"interval": 1e-15}))),
            Err(PolicyError::OutOfRange { .. })
        ));
    }
}
