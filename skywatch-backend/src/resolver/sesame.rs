///! CDS Sesame name resolver (SIMBAD-backed)

use async_trait::async_trait;
use reqwest::Client;
use skywatch_common::EquatorialPosition;

use super::NameResolver;
use crate::error::{LookupError, LookupResult};

const SERVICE: &str = "sesame";

pub struct SesameClient {
    client: Client,
    base_url: String,
}

impl SesameClient {
    /// `base_url` ends at the resolver selector, e.g.
    /// `https://cds.unistra.fr/cgi-bin/nph-sesame/-oI/S`; the object name is
    /// appended as the query string.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}?{}", self.base_url, urlencoding::encode(name.trim()))
    }
}

#[async_trait]
impl NameResolver for SesameClient {
    async fn resolve(&self, name: &str) -> LookupResult<Option<EquatorialPosition>> {
        let url = self.url_for(name);
        tracing::debug!("Resolving '{}' via {}", name, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::collaborator(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(LookupError::collaborator(
                SERVICE,
                format!("HTTP error {} for {}", response.status(), name),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::collaborator(SERVICE, e))?;

        parse_sesame_response(&body)
    }
}

/// Extract the J2000 position from Sesame's `-oI` text output.
///
/// The position line looks like
/// `%J 283.39616667 +33.02916667 = 18:53:35.08 +33:01:45.0`. A response
/// without one means the name is unknown.
pub fn parse_sesame_response(body: &str) -> LookupResult<Option<EquatorialPosition>> {
    let Some(line) = body
        .lines()
        .map(str::trim)
        .find(|line| line.split_whitespace().next() == Some("%J"))
    else {
        return Ok(None);
    };

    let mut fields = line.split_whitespace().skip(1);
    let ra = fields.next().and_then(|v| v.parse::<f64>().ok());
    let dec = fields.next().and_then(|v| v.parse::<f64>().ok());

    match (ra, dec) {
        (Some(ra), Some(dec)) if (-90.0..=90.0).contains(&dec) => {
            Ok(Some(EquatorialPosition::new(ra, dec)))
        }
        _ => Err(LookupError::collaborator(
            SERVICE,
            format!("malformed position line: {}", line),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const M57: &str = "# M57\t#Q3358547\n\
        #=S=Simbad (via url):    1\n\
        %@ 1234567\n\
        %I.0 M  57\n\
        %C.0 PN\n\
        %J 283.39616667 +33.02916667 = 18:53:35.08 +33:01:45.0\n\
        %J.E [3.6 3.6 0] A 2007A&A...474..653V\n\
        %I NGC 6720\n";

    #[test]
    fn test_parse_found() {
        let position = parse_sesame_response(M57).unwrap().unwrap();
        assert_abs_diff_eq!(position.ra_deg, 283.396_166_67, epsilon = 1e-9);
        assert_abs_diff_eq!(position.dec_deg, 33.029_166_67, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_southern() {
        let body = "%J 101.28715533 -16.71611586 = 06:45:08.91 -16:42:58.0\n";
        let position = parse_sesame_response(body).unwrap().unwrap();
        assert_abs_diff_eq!(position.dec_deg, -16.716_115_86, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_not_found() {
        let body = "# NotAStar123\t#Q3358548\n#! *** Nothing found *** \n";
        assert_eq!(parse_sesame_response(body).unwrap(), None);
        assert_eq!(parse_sesame_response("").unwrap(), None);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_sesame_response("%J abc def\n").is_err());
        assert!(parse_sesame_response("%J 10.0 +95.0\n").is_err());
    }

    #[test]
    fn test_url_encodes_name() {
        let client = SesameClient::new(Client::new(), "https://cds.example/nph-sesame/-oI/S");
        assert_eq!(
            client.url_for(" NGC 7000 "),
            "https://cds.example/nph-sesame/-oI/S?NGC%207000"
        );
    }

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_resolve_live() {
        let client = SesameClient::new(Client::new(), "https://cds.unistra.fr/cgi-bin/nph-sesame/-oI/S");
        let position = client.resolve("M57").await.unwrap();
        assert!(position.is_some());
    }
}
