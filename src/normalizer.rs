use chrono::Utc;
use serde_json::Value;
use crate::error::AnalysisError;
use crate::models::{TasteProfile, WineAnalysis};

// Confidence used when the model gave a non-numeric or absent value
const DEFAULT_CONFIDENCE: f64 = 0.5;

// Turn the model's raw text reply into a WineAnalysis. This never
// fails: any extraction or parse problem degrades into the fallback
// analysis so the client still gets a populated card.
pub fn normalize(raw: &str) -> WineAnalysis {
    match try_normalize(raw) {
        Ok(analysis) => analysis,
        Err(err) => fallback(&err),
    }
}

fn try_normalize(raw: &str) -> Result<WineAnalysis, AnalysisError> {
    let slice = extract_json(raw).ok_or(AnalysisError::NoStructuredContent)?;
    let value: Value =
        serde_json::from_str(slice).map_err(|_| AnalysisError::MalformedJson)?;
    Ok(coerce_fields(&value))
}

// Deterministic placeholder returned on any failure, upstream or
// local. confidence == 0.0 is the machine-readable fallback signal.
pub fn fallback(err: &AnalysisError) -> WineAnalysis {
    WineAnalysis {
        wine_name: Some("Analysis failed".to_string()),
        wine_type: Some("Unknown".to_string()),
        region: None,
        vintage: None,
        grape_varieties: None,
        tasting_notes: Some(err.user_message().to_string()),
        taste_profile: None,
        interesting_fact: Some(
            "You can retry the analysis with a clearer photo of the label.".to_string(),
        ),
        confidence: 0.0,
        analysis_date: Utc::now().to_rfc3339(),
    }
}

// Locate the JSON object embedded in the model's prose. Best-effort:
// starts at the first '{' and walks a balanced-brace scan that skips
// string literals and escapes. If the braces never balance, the tail
// from the first '{' is returned and left for the parser to reject.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=i]);
                }
            }
            _ => {}
        }
    }

    Some(&raw[start..])
}

// Each field is coerced independently; a bad value in one field
// never invalidates the others.
fn coerce_fields(value: &Value) -> WineAnalysis {
    WineAnalysis {
        wine_name: non_empty_string(value, "wineName"),
        wine_type: non_empty_string(value, "wineType"),
        region: non_empty_string(value, "region"),
        vintage: coerce_vintage(value.get("vintage")),
        grape_varieties: string_list(value.get("grapeVarieties")),
        tasting_notes: non_empty_string(value, "tastingNotes"),
        taste_profile: coerce_taste_profile(value.get("tasteProfile")),
        interesting_fact: non_empty_string(value, "interestingFact"),
        // Not clamped to [0,1]: out-of-range values are passed through
        // as a data-quality signal for the caller
        confidence: value
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_CONFIDENCE),
        // Never trusted from the source
        analysis_date: Utc::now().to_rfc3339(),
    }
}

fn non_empty_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

// Accepts an integer, or a string that is entirely an integer after
// trimming ("2015", " 2015 "). Anything else is dropped.
fn coerce_vintage(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// Only an actual JSON array passes; a scalar is never wrapped into a
// singleton list. Non-string items inside the array are skipped.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_string())
            .collect(),
    )
}

fn coerce_taste_profile(value: Option<&Value>) -> Option<TasteProfile> {
    let obj = value?.as_object()?;
    let score = |key: &str| obj.get(key).and_then(Value::as_f64);
    Some(TasteProfile {
        fruit: score("fruit"),
        citrus: score("citrus"),
        floral: score("floral"),
        herbal: score("herbal"),
        earthy: score("earthy"),
        mineral: score("mineral"),
        spice: score("spice"),
        oak: score("oak"),
        sweetness: score("sweetness"),
        acidity: score("acidity"),
        tannin: score("tannin"),
        alcohol: score("alcohol"),
        body: score("body"),
        primary_flavors: string_list(obj.get("primaryFlavors")).unwrap_or_default(),
        secondary_flavors: string_list(obj.get("secondaryFlavors")).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn happy_path_with_surrounding_prose() {
        let raw = r#"Sure! Here is the analysis you asked for:
            {"wineName":"Opus One","confidence":0.9}
            Let me know if you need anything else."#;
        let analysis = normalize(raw);
        assert_eq!(analysis.wine_name.as_deref(), Some("Opus One"));
        assert_eq!(analysis.confidence, 0.9);
        assert!(!analysis.analysis_date.is_empty());
    }

    #[test]
    fn missing_confidence_defaults_to_half() {
        let analysis = normalize(r#"{"wineName":"X"}"#);
        assert_eq!(analysis.confidence, 0.5);
    }

    #[test]
    fn non_numeric_confidence_defaults_to_half() {
        let analysis = normalize(r#"{"wineName":"X","confidence":"high"}"#);
        assert_eq!(analysis.confidence, 0.5);
    }

    #[test]
    fn out_of_range_confidence_is_not_clamped() {
        let analysis = normalize(r#"{"confidence":1.5}"#);
        assert_eq!(analysis.confidence, 1.5);
    }

    #[test]
    fn plain_text_degrades_to_fallback() {
        let analysis = normalize("not json at all");
        assert_eq!(analysis.wine_name.as_deref(), Some("Analysis failed"));
        assert_eq!(analysis.wine_type.as_deref(), Some("Unknown"));
        assert_eq!(analysis.confidence, 0.0);
        assert!(analysis.tasting_notes.is_some());
        assert!(analysis.interesting_fact.is_some());
    }

    #[test]
    fn unparseable_braces_degrade_to_fallback() {
        let analysis = normalize("the label says {vintage 2015, maybe");
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(analysis.wine_name.as_deref(), Some("Analysis failed"));
    }

    #[test]
    fn scalar_grape_varieties_is_dropped_not_wrapped() {
        let analysis = normalize(r#"{"grapeVarieties":"Merlot"}"#);
        assert_eq!(analysis.grape_varieties, None);
    }

    #[test]
    fn grape_list_passes_through_in_order() {
        let analysis =
            normalize(r#"{"grapeVarieties":["Cabernet Sauvignon","Merlot","Petit Verdot"]}"#);
        assert_eq!(
            analysis.grape_varieties,
            Some(vec![
                "Cabernet Sauvignon".to_string(),
                "Merlot".to_string(),
                "Petit Verdot".to_string(),
            ])
        );
    }

    #[test]
    fn vintage_coerces_from_number_and_string() {
        assert_eq!(normalize(r#"{"vintage":2015}"#).vintage, Some(2015));
        assert_eq!(normalize(r#"{"vintage":"2015"}"#).vintage, Some(2015));
        assert_eq!(normalize(r#"{"vintage":" 1998 "}"#).vintage, Some(1998));
        assert_eq!(normalize(r#"{"vintage":"around 2015"}"#).vintage, None);
        assert_eq!(normalize(r#"{"vintage":[2015]}"#).vintage, None);
    }

    #[test]
    fn empty_strings_are_omitted() {
        let analysis = normalize(r#"{"wineName":"","region":"  "}"#);
        assert_eq!(analysis.wine_name, None);
        assert_eq!(analysis.region, None);
    }

    #[test]
    fn bad_field_does_not_invalidate_the_rest() {
        let raw = r#"{"wineName":"Barolo","vintage":"unknown","grapeVarieties":42,"region":"Piedmont"}"#;
        let analysis = normalize(raw);
        assert_eq!(analysis.wine_name.as_deref(), Some("Barolo"));
        assert_eq!(analysis.region.as_deref(), Some("Piedmont"));
        assert_eq!(analysis.vintage, None);
        assert_eq!(analysis.grape_varieties, None);
    }

    #[test]
    fn braces_inside_string_values_do_not_confuse_extraction() {
        let raw = r#"prose {"wineName":"Ch{teau} Test","confidence":0.7} trailing } brace"#;
        let analysis = normalize(raw);
        assert_eq!(analysis.wine_name.as_deref(), Some("Ch{teau} Test"));
        assert_eq!(analysis.confidence, 0.7);
    }

    #[test]
    fn nested_objects_extract_fully() {
        let raw = r#"analysis: {"wineName":"Rioja","tasteProfile":{"fruit":4,"oak":3.5,"primaryFlavors":["cherry","vanilla"]}} done"#;
        let analysis = normalize(raw);
        let profile = analysis.taste_profile.expect("profile");
        assert_eq!(profile.fruit, Some(4.0));
        assert_eq!(profile.oak, Some(3.5));
        assert_eq!(
            profile.primary_flavors,
            vec!["cherry".to_string(), "vanilla".to_string()]
        );
        assert_eq!(profile.tannin, None);
    }

    #[test]
    fn analysis_date_is_fresh_and_never_from_the_source() {
        let before = Utc::now();
        let raw = r#"{"wineName":"X","analysisDate":"1999-01-01T00:00:00Z"}"#;
        let first = normalize(raw);
        let second = normalize(raw);
        let after = Utc::now();

        for analysis in [&first, &second] {
            let stamp = DateTime::parse_from_rfc3339(&analysis.analysis_date)
                .expect("rfc3339 timestamp")
                .with_timezone(&Utc);
            assert!(stamp >= before);
            assert!(stamp <= after);
        }
    }

    #[test]
    fn fallback_message_tracks_the_failure_kind() {
        let auth = fallback(&AnalysisError::Authentication);
        let quota = fallback(&AnalysisError::QuotaExceeded);
        assert_ne!(auth.tasting_notes, quota.tasting_notes);
        assert_eq!(auth.confidence, 0.0);
        assert_eq!(quota.confidence, 0.0);
    }
}
