//! Brew records and their validation
//!
//! A [`BrewRecord`] is one raw row: column name -> raw string. Validation
//! turns it into a [`ValidatedBrew`] without touching any graph state, so a
//! rejected record never leaves partial nodes behind.

use crate::config::BuildConfig;
use crate::error::{BuildError, RecordError, RecordErrorReason, ValidationError};
use crate::graph::{NodeKind, PropertyMap, PropertyValue};
use crate::registry::{normalize, KeyPart, NaturalKey};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns every input table must provide
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "brew_id",
    "barista",
    "brew_date",
    "roaster",
    "coffee_name",
    "roast_level",
    "brew_method",
    "brewer_brand",
    "brewer_model",
    "dose_g",
    "total_brew_time_sec",
    "notes_intensities",
    "sweetness_0_10",
    "acidity_0_10",
    "bitterness_0_10",
    "body_0_10",
    "overall_0_10",
];

/// Columns consumed as node keys or node attributes. Every other non-blank
/// column is passed through onto the BREWED_WITH edge.
pub const CORE_COLUMNS: [&str; 21] = [
    "brew_id",
    "barista",
    "brew_date",
    "roaster",
    "coffee_name",
    "roast_level",
    "roast_date",
    "brew_method",
    "brewer_brand",
    "brewer_model",
    "dose_g",
    "total_brew_time_sec",
    "notes_intensities",
    "notes_overall",
    "grinder",
    "grind_setting",
    "sweetness_0_10",
    "acidity_0_10",
    "bitterness_0_10",
    "body_0_10",
    "overall_0_10",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One raw input row, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrewRecord {
    columns: IndexMap<String, String>,
}

impl BrewRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.columns.shift_remove(column)
    }

    /// Trimmed value of a column; blank values read as absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether the column exists at all, blank or not
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// All columns in input order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BrewRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        BrewRecord {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Required columns absent from a header row
pub fn missing_columns<'a, I>(header: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = header.into_iter().map(str::trim).collect();
    REQUIRED_COLUMNS
        .into_iter()
        .filter(|c| !present.contains(c))
        .collect()
}

/// Sensory rating dimensions, each in [0, 10]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Sweetness,
    Acidity,
    Bitterness,
    Body,
    Overall,
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::Sweetness,
        Rating::Acidity,
        Rating::Bitterness,
        Rating::Body,
        Rating::Overall,
    ];

    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 10.0;

    /// Input column carrying this rating
    pub fn column(&self) -> &'static str {
        match self {
            Rating::Sweetness => "sweetness_0_10",
            Rating::Acidity => "acidity_0_10",
            Rating::Bitterness => "bitterness_0_10",
            Rating::Body => "body_0_10",
            Rating::Overall => "overall_0_10",
        }
    }

    /// Attribute name on the SensoryEvaluation node
    pub fn attribute(&self) -> &'static str {
        match self {
            Rating::Sweetness => "sweetness",
            Rating::Acidity => "acidity",
            Rating::Bitterness => "bitterness",
            Rating::Body => "body",
            Rating::Overall => "overall",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Rating::ALL
            .into_iter()
            .find(|r| r.attribute().eq_ignore_ascii_case(s) || r.column().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown rating '{}'", s))
    }
}

/// The five validated ratings of one brew
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensoryRatings([f64; 5]);

impl SensoryRatings {
    pub fn get(&self, rating: Rating) -> f64 {
        self.0[rating as usize]
    }

    pub fn to_properties(&self) -> PropertyMap {
        Rating::ALL
            .into_iter()
            .map(|r| (r.attribute().to_string(), PropertyValue::Float(self.get(r))))
            .collect()
    }
}

/// A parsed `name:intensity` pair
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorNoteEntry {
    /// Trimmed name, original casing
    pub name: String,
    /// Case-folded name used for deduplication
    pub key: String,
    pub intensity: PropertyValue,
}

/// Why a flavor-note pair was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoteIssueReason {
    MissingColon,
    EmptyName,
    NotNumeric,
    Duplicate,
}

impl fmt::Display for NoteIssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoteIssueReason::MissingColon => "missing ':' separator",
            NoteIssueReason::EmptyName => "empty note name",
            NoteIssueReason::NotNumeric => "intensity is not numeric",
            NoteIssueReason::Duplicate => "note repeated, last intensity kept",
        };
        f.write_str(text)
    }
}

/// A recoverable problem found while parsing `notes_intensities`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteIssue {
    pub pair: String,
    pub reason: NoteIssueReason,
}

/// Parse `"chocolate:4;fruit:3"` into note entries.
///
/// Malformed pairs are skipped and reported as issues. A note repeated
/// within one list keeps its first position and its last intensity.
pub fn parse_note_intensities(raw: &str) -> (Vec<FlavorNoteEntry>, Vec<NoteIssue>) {
    let mut notes: IndexMap<String, FlavorNoteEntry> = IndexMap::new();
    let mut issues = Vec::new();

    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let issue = |reason| NoteIssue {
            pair: pair.to_string(),
            reason,
        };
        let Some((name, intensity)) = pair.split_once(':') else {
            issues.push(issue(NoteIssueReason::MissingColon));
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            issues.push(issue(NoteIssueReason::EmptyName));
            continue;
        }
        let intensity = match PropertyValue::parse_scalar(intensity) {
            Some(v @ (PropertyValue::Integer(_) | PropertyValue::Float(_))) => v,
            _ => {
                issues.push(issue(NoteIssueReason::NotNumeric));
                continue;
            }
        };

        let key = normalize(name);
        let entry = FlavorNoteEntry {
            name: name.to_string(),
            key: key.clone(),
            intensity,
        };
        if let Some(previous) = notes.get_mut(&key) {
            issues.push(issue(NoteIssueReason::Duplicate));
            previous.intensity = entry.intensity;
        } else {
            notes.insert(key, entry);
        }
    }

    (notes.into_values().collect(), issues)
}

/// Natural keys of every shared entity a brew references
#[derive(Debug, Clone, PartialEq)]
pub struct EntityKeys {
    pub roaster: NaturalKey,
    pub bean_lot: NaturalKey,
    pub roast_batch: NaturalKey,
    pub grinder: Option<NaturalKey>,
    pub brewer: NaturalKey,
    pub session: NaturalKey,
}

/// A record that passed validation, ready to be written into the graph
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBrew {
    pub brew_id: String,
    pub keys: EntityKeys,
    pub roaster: String,
    pub coffee_name: String,
    pub roast_level: String,
    pub roast_date: Option<String>,
    pub grinder: Option<String>,
    pub grind_setting: Option<PropertyValue>,
    pub brewer_brand: String,
    pub brewer_model: String,
    pub brew_method: String,
    /// BrewSession node attributes
    pub session: PropertyMap,
    /// Pass-through columns for the BREWED_WITH edge (without brew_method)
    pub method_params: PropertyMap,
    pub ratings: SensoryRatings,
    pub notes: Vec<FlavorNoteEntry>,
    pub note_issues: Vec<NoteIssue>,
}

impl ValidatedBrew {
    /// Validate one record.
    ///
    /// Missing key components fail with `ValidationError`; missing or
    /// malformed non-key fields fail with `RecordError`.
    pub fn from_record(record: &BrewRecord, config: &BuildConfig) -> Result<Self, BuildError> {
        let brew_id = record
            .get("brew_id")
            .ok_or_else(|| ValidationError::new(NodeKind::BrewSession, "brew_id"))?
            .to_string();
        let fields = FieldReader {
            record,
            brew_id: &brew_id,
        };

        // Non-key required fields
        let barista = fields.required("barista")?;
        let brew_date = fields.required("brew_date")?;
        let brew_method = fields.required("brew_method")?;
        let dose_g = fields.non_negative("dose_g")?;
        let total_brew_time_sec = fields.non_negative("total_brew_time_sec")?;
        let mut ratings = [0.0; 5];
        for rating in Rating::ALL {
            ratings[rating as usize] = fields.rating(rating)?;
        }
        // The column is required; a blank value means no notes
        if !record.has_column("notes_intensities") {
            return Err(fields.error("notes_intensities", RecordErrorReason::Missing).into());
        }

        // Natural keys
        let key = |kind: NodeKind, parts: &[KeyPart]| {
            NaturalKey::new(kind, parts).map_err(|e| e.for_brew(brew_id.as_str()))
        };
        let roaster = KeyPart::required("roaster", record.get("roaster"));
        let coffee = KeyPart::required("coffee_name", record.get("coffee_name"));
        let level = KeyPart::required("roast_level", record.get("roast_level"));
        let roast_date = KeyPart::optional("roast_date", record.get("roast_date"));
        let keys = EntityKeys {
            roaster: key(NodeKind::Roaster, &[roaster])?,
            bean_lot: key(NodeKind::BeanLot, &[roaster, coffee])?,
            roast_batch: key(NodeKind::RoastBatch, &[roaster, coffee, level, roast_date])?,
            grinder: match record.get("grinder") {
                Some(g) => Some(key(NodeKind::Grinder, &[KeyPart::required("grinder", Some(g))])?),
                None => None,
            },
            brewer: key(
                NodeKind::Brewer,
                &[
                    KeyPart::required("brewer_brand", record.get("brewer_brand")),
                    KeyPart::required("brewer_model", record.get("brewer_model")),
                ],
            )?,
            session: key(
                NodeKind::BrewSession,
                &[KeyPart::required("brew_id", Some(brew_id.as_str()))],
            )?,
        };

        let mut session = PropertyMap::new();
        session.insert("brew_id".to_string(), brew_id.as_str().into());
        session.insert("brew_date".to_string(), brew_date.into());
        session.insert("barista".to_string(), barista.into());
        session.insert("dose_g".to_string(), dose_g.into());
        session.insert("total_brew_time_sec".to_string(), total_brew_time_sec.into());
        if let Some(notes_overall) = record.get("notes_overall") {
            session.insert("notes_overall".to_string(), notes_overall.into());
        }
        if config.derive_roast_age {
            if let Some(days) = days_between(record.get("roast_date"), Some(brew_date)) {
                session.insert("days_off_roast".to_string(), days.into());
            }
        }

        let method_params: PropertyMap = record
            .columns()
            .filter(|(column, _)| !CORE_COLUMNS.contains(column))
            .filter_map(|(column, raw)| {
                PropertyValue::parse_scalar(raw).map(|v| (column.to_string(), v))
            })
            .collect();

        let (notes, note_issues) =
            parse_note_intensities(record.get("notes_intensities").unwrap_or_default());

        let roaster = fields.key_value("roaster");
        let coffee_name = fields.key_value("coffee_name");
        let roast_level = fields.key_value("roast_level");
        let brewer_brand = fields.key_value("brewer_brand");
        let brewer_model = fields.key_value("brewer_model");

        Ok(ValidatedBrew {
            brew_id,
            roaster,
            coffee_name,
            roast_level,
            roast_date: record.get("roast_date").map(str::to_string),
            grinder: record.get("grinder").map(str::to_string),
            grind_setting: record.get("grind_setting").and_then(PropertyValue::parse_scalar),
            brewer_brand,
            brewer_model,
            brew_method: brew_method.to_string(),
            keys,
            session,
            method_params,
            ratings: SensoryRatings(ratings),
            notes,
            note_issues,
        })
    }
}

/// Ordinal of a roast level from light (1) to dark (5)
pub fn roast_level_rank(level: &str) -> Option<i64> {
    let level: String = level
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { '-' } else { c })
        .collect();
    match level.as_str() {
        "light" => Some(1),
        "medium-light" | "light-medium" => Some(2),
        "medium" => Some(3),
        "medium-dark" | "dark-medium" => Some(4),
        "dark" => Some(5),
        _ => None,
    }
}

/// Days since 1970-01-01 for an ISO date
pub fn epoch_day(date: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    Some((date - epoch).num_days())
}

/// Whole days from `from` to `to`, both ISO dates
fn days_between(from: Option<&str>, to: Option<&str>) -> Option<i64> {
    let from = NaiveDate::parse_from_str(from?, DATE_FORMAT).ok()?;
    let to = NaiveDate::parse_from_str(to?, DATE_FORMAT).ok()?;
    Some((to - from).num_days())
}

struct FieldReader<'r, 'b> {
    record: &'r BrewRecord,
    brew_id: &'b str,
}

impl<'r> FieldReader<'r, '_> {
    fn error(&self, field: &str, reason: RecordErrorReason) -> RecordError {
        RecordError::new(self.brew_id, field, reason)
    }

    fn required(&self, field: &str) -> Result<&'r str, RecordError> {
        self.record
            .get(field)
            .ok_or_else(|| self.error(field, RecordErrorReason::Missing))
    }

    fn number(&self, field: &str) -> Result<f64, RecordError> {
        let raw = self.required(field)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(field, RecordErrorReason::NotNumeric(raw.to_string())))
    }

    fn non_negative(&self, field: &str) -> Result<f64, RecordError> {
        let value = self.number(field)?;
        if value < 0.0 {
            return Err(self.error(field, RecordErrorReason::Negative(value)));
        }
        Ok(value)
    }

    fn rating(&self, rating: Rating) -> Result<f64, RecordError> {
        let value = self.number(rating.column())?;
        if !(Rating::MIN..=Rating::MAX).contains(&value) {
            return Err(self.error(
                rating.column(),
                RecordErrorReason::OutOfRange {
                    value,
                    min: Rating::MIN,
                    max: Rating::MAX,
                },
            ));
        }
        Ok(value)
    }

    /// Key columns are known to be present once the keys validated
    fn key_value(&self, field: &str) -> String {
        self.record.get(field).unwrap_or_default().to_string()
    }
}
