// Outbound exports: history CSV and model document

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sharp_models::{ModelInsights, ModelState, Prediction, Result, SharpError, Stats};

#[derive(Debug, Serialize)]
struct HistoryRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Game")]
    game: String,
    #[serde(rename = "Prediction")]
    prediction: String,
    #[serde(rename = "Actual")]
    actual: String,
    #[serde(rename = "Correct")]
    correct: bool,
    #[serde(rename = "Confidence")]
    confidence: u8,
    #[serde(rename = "Sport")]
    sport: String,
    #[serde(rename = "Units")]
    units: String,
    #[serde(rename = "ROI")]
    roi: &'static str,
    #[serde(rename = "Model Version")]
    model_version: u32,
    #[serde(rename = "EV")]
    ev: String,
}

impl From<&Prediction> for HistoryRow {
    fn from(p: &Prediction) -> Self {
        Self {
            date: p.date.format("%Y-%m-%d").to_string(),
            game: p.game.clone(),
            prediction: p.prediction.clone(),
            actual: p.actual.clone().unwrap_or_default(),
            correct: p.is_correct(),
            confidence: p.confidence,
            sport: p.sport.label().to_string(),
            units: p.recommended_units.normalize().to_string(),
            roi: if p.is_correct() { "+0.91" } else { "-1.0" },
            model_version: p.model_version,
            ev: format!("{:.2}", p.expected_value),
        }
    }
}

/// One row per completed prediction, in history order. Pending picks are
/// skipped.
pub fn history_csv(history: &[Prediction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut rows = 0;
    for prediction in history.iter().filter(|p| p.is_completed()) {
        writer
            .serialize(HistoryRow::from(prediction))
            .map_err(|e| SharpError::Export(e.to_string()))?;
        rows += 1;
    }
    if rows == 0 {
        writer
            .write_record(HEADER)
            .map_err(|e| SharpError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SharpError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SharpError::Export(e.to_string()))
}

const HEADER: [&str; 11] = [
    "Date",
    "Game",
    "Prediction",
    "Actual",
    "Correct",
    "Confidence",
    "Sport",
    "Units",
    "ROI",
    "Model Version",
    "EV",
];

pub fn history_csv_filename(date: NaiveDate) -> String {
    format!("predictions-{}.csv", date.format("%Y-%m-%d"))
}

/// Model state with the analytics it was judged by.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelExport {
    pub model: ModelState,
    pub insights: Option<ModelInsights>,
    pub stats: Stats,
    pub export_date: DateTime<Utc>,
}

impl ModelExport {
    pub fn new(model: ModelState, insights: Option<ModelInsights>, stats: Stats) -> Self {
        Self {
            model,
            insights,
            stats,
            export_date: Utc::now(),
        }
    }

    pub fn filename(&self) -> String {
        format!(
            "ml-model-v{}-{}.json",
            self.model.iterations,
            self.export_date.format("%Y-%m-%d")
        )
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sharp_models::Sport;

    fn completed(correct: bool) -> Prediction {
        let mut p = Prediction::new(
            "Buffalo Bills @ Kansas City Chiefs".to_string(),
            Sport::Nfl,
            "Kansas City Chiefs".to_string(),
            81,
            dec!(2.5),
        )
        .with_model_version(3);
        p.expected_value = 0.5471;
        p.date = DateTime::parse_from_rfc3339("2026-10-18T19:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        p.record_outcome(correct, None);
        p
    }

    #[test]
    fn test_history_csv_rows() {
        let pending = Prediction::new("A @ B".to_string(), Sport::Nba, "B".to_string(), 60, dec!(1));
        let csv = history_csv(&[completed(true), pending, completed(false)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Date,Game,Prediction,Actual,Correct,Confidence,Sport,Units,ROI,Model Version,EV"
        );
        assert_eq!(
            lines[1],
            "2026-10-18,Buffalo Bills @ Kansas City Chiefs,Kansas City Chiefs,Kansas City Chiefs,true,81,NFL,2.5,+0.91,3,0.55"
        );
        assert!(lines[2].contains(",Opponent,false,"));
        assert!(lines[2].contains(",-1.0,"));
    }

    #[test]
    fn test_empty_csv_has_header() {
        let csv = history_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), HEADER.join(","));
    }

    #[test]
    fn test_model_export_document() {
        let mut model = ModelState::default();
        model.iterations = 4;
        let export = ModelExport::new(model, None, Stats::default());

        assert!(export.filename().starts_with("ml-model-v4-"));
        assert!(export.filename().ends_with(".json"));

        let value: serde_json::Value = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["model"]["iterations"], 4);
        assert!(value["insights"].is_null());
        assert!(value.get("exportDate").is_some());
        assert_eq!(value["stats"]["totalCompleted"], 0);
    }

    #[test]
    fn test_csv_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(history_csv_filename(date), "predictions-2026-10-18.csv");
    }
}
