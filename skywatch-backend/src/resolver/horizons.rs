///! JPL Horizons ephemeris client (observer tables over the JSON API)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::{EphemerisRow, EphemerisSource};
use crate::astro::time::julian_date;
use crate::error::{LookupError, LookupResult};

const SERVICE: &str = "horizons";
const START_MARKER: &str = "$$SOE";
const END_MARKER: &str = "$$EOE";

/// Column positions of RA and Dec in a `QUANTITIES='2'` CSV row when the
/// header cannot be read: date, solar flag, lunar flag, RA, Dec.
const DEFAULT_RA_COLUMN: usize = 3;
const DEFAULT_DEC_COLUMN: usize = 4;

#[derive(Debug, Deserialize)]
struct HorizonsResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HorizonsClient {
    client: Client,
    base_url: String,
}

impl HorizonsClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Single-epoch apparent RA/Dec query, angles in decimal degrees.
    fn url_for(&self, body_id: &str, observer_code: &str, instant: DateTime<Utc>) -> String {
        let params = [
            ("format", "json".to_string()),
            ("COMMAND", quoted(body_id)),
            ("OBJ_DATA", quoted("NO")),
            ("MAKE_EPHEM", quoted("YES")),
            ("EPHEM_TYPE", quoted("OBSERVER")),
            ("CENTER", quoted(observer_code)),
            ("TLIST", quoted(&format!("{:.6}", julian_date(instant)))),
            ("QUANTITIES", quoted("2")),
            ("ANG_FORMAT", quoted("DEG")),
            ("CSV_FORMAT", quoted("YES")),
        ];

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.base_url, query)
    }
}

fn quoted(value: &str) -> String {
    format!("'{}'", value)
}

#[async_trait]
impl EphemerisSource for HorizonsClient {
    async fn ephemeris(
        &self,
        body_id: &str,
        observer_code: &str,
        instant: DateTime<Utc>,
    ) -> LookupResult<Vec<EphemerisRow>> {
        let url = self.url_for(body_id, observer_code, instant);
        tracing::debug!("Requesting ephemeris for {} at {}", body_id, instant);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::collaborator(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(LookupError::collaborator(
                SERVICE,
                format!("HTTP error {} for body {}", response.status(), body_id),
            ));
        }

        let payload: HorizonsResponse = response
            .json()
            .await
            .map_err(|e| LookupError::collaborator(SERVICE, format!("invalid JSON: {}", e)))?;

        if let Some(error) = payload.error {
            return Err(LookupError::collaborator(SERVICE, error.trim()));
        }

        let rows = parse_ephemeris_rows(payload.result.as_deref().unwrap_or_default())?;
        tracing::debug!("Horizons returned {} rows for {}", rows.len(), body_id);
        Ok(rows)
    }
}

/// Rows between `$$SOE` and `$$EOE` of a CSV observer table.
///
/// A table without the markers (Horizons prints a notice instead when it has
/// nothing for the epoch) yields no rows.
pub fn parse_ephemeris_rows(result: &str) -> LookupResult<Vec<EphemerisRow>> {
    let lines: Vec<&str> = result.lines().map(str::trim).collect();

    let Some(start) = lines.iter().position(|line| line.starts_with(START_MARKER)) else {
        return Ok(Vec::new());
    };
    let Some(end) = lines[start + 1..]
        .iter()
        .position(|line| line.starts_with(END_MARKER))
        .map(|offset| start + 1 + offset)
    else {
        return Ok(Vec::new());
    };

    let (ra_column, dec_column) = header_columns(&lines[..start]);

    lines[start + 1..end]
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| parse_row(line, ra_column, dec_column))
        .collect()
}

/// RA and Dec column indices from the last header line above the table.
fn header_columns(preamble: &[&str]) -> (usize, usize) {
    let Some(header) = preamble.iter().rev().find(|line| line.contains("R.A.")) else {
        return (DEFAULT_RA_COLUMN, DEFAULT_DEC_COLUMN);
    };

    let fields: Vec<&str> = header.split(',').map(str::trim).collect();
    let ra = fields.iter().position(|field| field.starts_with("R.A."));
    let dec = fields.iter().position(|field| field.starts_with("DEC"));

    match (ra, dec) {
        (Some(ra), Some(dec)) => (ra, dec),
        _ => (DEFAULT_RA_COLUMN, DEFAULT_DEC_COLUMN),
    }
}

fn parse_row(line: &str, ra_column: usize, dec_column: usize) -> LookupResult<EphemerisRow> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let field = |index: usize| fields.get(index).and_then(|value| value.parse::<f64>().ok());

    match (field(ra_column), field(dec_column)) {
        (Some(ra_deg), Some(dec_deg)) => Ok(EphemerisRow { ra_deg, dec_deg }),
        _ => Err(LookupError::collaborator(
            SERVICE,
            format!("malformed ephemeris row: {}", line),
        )),
    }
}
