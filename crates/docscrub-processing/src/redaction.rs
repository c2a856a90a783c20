//! Redaction job planning.
//!
//! Callers describe areas in top-left-origin page coordinates (as most PDF
//! viewers and text extractors report them). qpdf wants bottom-left-origin
//! rectangles grouped by 1-based page, wrapped in a JSON job document.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ProcessingError;

/// One area to remove, in top-left-origin coordinates on a 0-based page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub page: u32,
    pub page_height: f64,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Location {
    /// `[llx, lly, urx, ury]` in PDF user space.
    pub fn to_pdf_rect(&self) -> [f64; 4] {
        let y0_pdf = self.page_height - self.y1;
        let y1_pdf = self.page_height - self.y0;
        [
            self.x0.min(self.x1),
            y0_pdf.min(y1_pdf),
            self.x0.max(self.x1),
            y0_pdf.max(y1_pdf),
        ]
    }

    fn from_value(value: &Value) -> Result<Self, ProcessingError> {
        let object = value.as_object().ok_or_else(|| {
            ProcessingError::InvalidLocations("each location must be an object".to_string())
        })?;

        let page = match object.get("page") {
            None | Some(Value::Null) => 0.0,
            Some(v) => number(v, "page")?,
        };
        if page < 0.0 || page.fract() != 0.0 || page >= u32::MAX as f64 {
            return Err(ProcessingError::InvalidLocations(format!(
                "page must be a non-negative integer, got {}",
                page
            )));
        }

        let field = |name: &str| -> Result<f64, ProcessingError> {
            let v = object.get(name).ok_or_else(|| {
                ProcessingError::InvalidLocations(format!("missing field '{}'", name))
            })?;
            number(v, name)
        };

        Ok(Location {
            page: page as u32,
            page_height: field("page_height")?,
            x0: field("x0")?,
            y0: field("y0")?,
            x1: field("x1")?,
            y1: field("y1")?,
        })
    }
}

/// Accept JSON numbers and numeric strings, the way form fields arrive.
fn number(value: &Value, name: &str) -> Result<f64, ProcessingError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).ok_or_else(|| {
        ProcessingError::InvalidLocations(format!("field '{}' must be a number", name))
    })
}

/// Rectangles to redact, grouped by 1-based page number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedactionPlan {
    pages: BTreeMap<u32, Vec<[f64; 4]>>,
}

#[derive(Serialize)]
struct QpdfJob<'a> {
    qpdf: serde_json::Map<String, Value>,
    steps: Vec<RedactStep<'a>>,
}

#[derive(Serialize)]
struct RedactStep<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    description: String,
    page: u32,
    rectangles: &'a [[f64; 4]],
}

impl RedactionPlan {
    pub fn from_locations(locations: &[Location]) -> Self {
        let mut pages: BTreeMap<u32, Vec<[f64; 4]>> = BTreeMap::new();
        for location in locations {
            pages
                .entry(location.page.saturating_add(1))
                .or_default()
                .push(location.to_pdf_rect());
        }
        Self { pages }
    }

    /// Parse the `locations` form field.
    ///
    /// Accepts an array of locations, an object carrying a `locations` array,
    /// or a single location object.
    pub fn parse(raw: &str) -> Result<Self, ProcessingError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ProcessingError::InvalidLocations(e.to_string()))?;

        let items: Vec<Value> = match value {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove("locations") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(ProcessingError::InvalidLocations(
                        "'locations' must be an array".to_string(),
                    ))
                }
                None => vec![Value::Object(object)],
            },
            _ => {
                return Err(ProcessingError::InvalidLocations(
                    "expected an array or object".to_string(),
                ))
            }
        };

        let locations = items
            .iter()
            .map(Location::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_locations(&locations))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn rectangle_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// Pretty-printed qpdf job document.
    pub fn to_job_json(&self) -> Result<Vec<u8>, ProcessingError> {
        let job = QpdfJob {
            qpdf: serde_json::Map::new(),
            steps: self
                .pages
                .iter()
                .map(|(page, rectangles)| RedactStep {
                    kind: "redact",
                    description: format!("Redact page {}", page),
                    page: *page,
                    rectangles,
                })
                .collect(),
        };
        serde_json::to_vec_pretty(&job)
            .map_err(|e| ProcessingError::InvalidLocations(e.to_string()))
    }
}
