//! Client for the CQL-to-ELM translation service

use crate::diagnostics::{MeasureError, Result, Severity, MB0004, MB0503};
use crate::elm::LibraryDocument;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const CQL_MEDIA_TYPE: &str = "application/cql";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// CQL libraries to translate, keyed by library name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRequest {
    libraries: BTreeMap<String, String>,
}

impl TranslationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, cql: impl Into<String>) {
        self.libraries.insert(name.into(), cql.into());
    }

    /// CQL text by library name
    pub fn libraries(&self) -> &BTreeMap<String, String> {
        &self.libraries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

/// Translates CQL libraries into compiled documents
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Compiled documents keyed by the name each library was submitted under
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<BTreeMap<String, LibraryDocument>>;
}

/// Translation service reached over HTTP with multipart bodies
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    url: String,
}

impl HttpTranslator {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                MeasureError::system(MB0503, format!("Could not create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Service URL with annotation and locator output enabled
    pub fn endpoint(&self) -> String {
        format!("{}?annotations=true&locators=true", self.url)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<BTreeMap<String, LibraryDocument>> {
        let mut form = Form::new();
        for (name, cql) in request.libraries() {
            let part = Part::text(cql.clone())
                .mime_str(CQL_MEDIA_TYPE)
                .map_err(|e| network_error(&self.url, e))?;
            form = form.part(name.clone(), part);
        }

        let endpoint = self.endpoint();
        info!(url = %endpoint, libraries = request.len(), "Translating CQL");

        let response = self
            .client
            .post(&endpoint)
            .header(ACCEPT, "multipart/form-data")
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(&self.url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| network_error(&self.url, e))?;

        if !status.is_success() {
            return Err(MeasureError::system(
                MB0503,
                format!("Translation service responded with {}: {}", status, body),
            ));
        }

        let boundary = boundary_from_content_type(&content_type)?;
        documents_from_parts(parse_multipart(&body, &boundary)?)
    }
}

fn network_error(url: &str, err: reqwest::Error) -> MeasureError {
    MeasureError::system(MB0503, format!("Request to {} failed: {}", url, err))
}

fn invalid_response(message: impl Into<String>) -> MeasureError {
    MeasureError::parse(MB0004, message)
}

/// Extract the boundary parameter of a multipart content type
pub fn boundary_from_content_type(content_type: &str) -> Result<String> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|boundary| !boundary.is_empty())
        .ok_or_else(|| {
            invalid_response(format!(
                "Expected a multipart response, got content type '{}'",
                content_type
            ))
        })
}

/// Split a multipart body into `(name, content)` pairs in body order.
///
/// Delimiters count only at the start of a line and when followed by a line
/// break, padding or the closing `--`. Part content is returned exactly as
/// sent; only the line break belonging to the delimiter is removed.
pub fn parse_multipart(body: &str, boundary: &str) -> Result<Vec<(String, String)>> {
    let delimiter = format!("--{}", boundary);
    let starts = delimiter_positions(body, &delimiter);

    let mut parts = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(body.len());
        let section = &body[start + delimiter.len()..end];
        if section.starts_with("--") {
            break;
        }
        let section = strip_line_break_prefix(section.trim_start_matches([' ', '\t']));
        let (headers, content) = section
            .split_once("\r\n\r\n")
            .or_else(|| section.split_once("\n\n"))
            .ok_or_else(|| invalid_response("Multipart part has no header section"))?;
        let content = content
            .strip_suffix("\r\n")
            .or_else(|| content.strip_suffix('\n'))
            .unwrap_or(content);
        let name = headers
            .lines()
            .find_map(part_name)
            .ok_or_else(|| invalid_response("Multipart part has no name"))?;
        parts.push((name, content.to_string()));
    }

    if parts.is_empty() {
        return Err(invalid_response("Translation response contained no libraries"));
    }
    Ok(parts)
}

fn delimiter_positions(body: &str, delimiter: &str) -> Vec<usize> {
    body.match_indices(delimiter)
        .map(|(i, _)| i)
        .filter(|&i| i == 0 || body[..i].ends_with('\n'))
        .filter(|&i| {
            let rest = &body[i + delimiter.len()..];
            rest.is_empty()
                || rest.starts_with("--")
                || rest.starts_with(['\r', '\n', ' ', '\t'])
        })
        .collect()
}

fn strip_line_break_prefix(section: &str) -> &str {
    section
        .strip_prefix("\r\n")
        .or_else(|| section.strip_prefix('\n'))
        .unwrap_or(section)
}

fn part_name(header: &str) -> Option<String> {
    let (key, value) = header.split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-disposition") {
        return None;
    }
    value
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim() == "name")
        .map(|(_, name)| name.trim().trim_matches('"').to_string())
}

fn documents_from_parts(
    parts: Vec<(String, String)>,
) -> Result<BTreeMap<String, LibraryDocument>> {
    let mut documents = BTreeMap::new();
    for (name, content) in parts {
        let document = LibraryDocument::from_json(content).map_err(|e| {
            invalid_response(format!("Library {} is not a valid ELM document: {}", name, e))
        })?;
        debug!(part = %name, library = %document.identifier(), "Received compiled library");
        documents.insert(name, document);
    }
    Ok(documents)
}

/// Fail on translator errors; log warnings and informational messages
pub fn check_annotations<'a>(documents: impl IntoIterator<Item = &'a LibraryDocument>) -> Result<()> {
    let mut errors = Vec::new();
    for document in documents {
        for diag in document.diagnostics() {
            match diag.severity {
                Severity::Error => errors.push(diag),
                Severity::Warning => warn!(library = %document.identifier(), "{}", diag.message),
                Severity::Info => info!(library = %document.identifier(), "{}", diag.message),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(MeasureError::translation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MB0200;
    use pretty_assertions::assert_eq;

    const BOUNDARY: &str = "Boundary_1_123";

    fn multipart(parts: &[(&str, &str)]) -> String {
        let mut body = String::from("preamble\r\n");
        for (name, content) in parts {
            body.push_str(&format!(
                "--{}\r\nContent-Type: application/elm+json\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, content
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    #[test]
    fn test_boundary_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=\"abc\"").unwrap(),
            "abc"
        );
        assert_eq!(
            boundary_from_content_type("multipart/form-data;boundary=Boundary_1").unwrap(),
            "Boundary_1"
        );
        assert_eq!(
            boundary_from_content_type("application/json").unwrap_err().code(),
            MB0004
        );
    }

    #[test]
    fn test_parse_multipart_keeps_content_verbatim() {
        let elm = "{\n  \"library\" : {\"identifier\":{\"id\":\"Main\"}}\n}\n";
        let body = multipart(&[("Main", elm), ("Helpers", "{}")]);

        let parts = parse_multipart(&body, BOUNDARY).unwrap();

        assert_eq!(
            parts,
            vec![
                ("Main".to_string(), elm.to_string()),
                ("Helpers".to_string(), "{}".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_multipart_ignores_boundary_text_inside_content() {
        let content = format!("see --{b} here\n--{b}-suffix\nend", b = BOUNDARY);
        let body = multipart(&[("Main", content.as_str()), ("Helpers", "{}")]);

        let parts = parse_multipart(&body, BOUNDARY).unwrap();

        assert_eq!(
            parts,
            vec![
                ("Main".to_string(), content.clone()),
                ("Helpers".to_string(), "{}".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_multipart_without_parts() {
        let body = format!("--{}--\r\n", BOUNDARY);

        assert_eq!(parse_multipart(&body, BOUNDARY).unwrap_err().code(), MB0004);
    }

    #[test]
    fn test_documents_from_parts() {
        let parts = vec![(
            "Main".to_string(),
            r#"{"library":{"identifier":{"id":"Main","version":"1.0.0"}}}"#.to_string(),
        )];

        let documents = documents_from_parts(parts).unwrap();

        assert_eq!(documents["Main"].identifier().to_string(), "Main|1.0.0");
        assert!(documents_from_parts(vec![("Bad".into(), "not json".into())]).is_err());
    }

    #[test]
    fn test_check_annotations_collects_errors() {
        let failing = LibraryDocument::from_json(
            r#"{"library":{"identifier":{"id":"Main"},"annotation":[
                {"type":"CqlToElmError","errorSeverity":"error","message":"Could not resolve identifier Foo","startLine":4,"startChar":3},
                {"type":"CqlToElmError","errorSeverity":"warning","message":"Implicit conversion"}
            ]}}"#,
        )
        .unwrap();
        let clean = LibraryDocument::from_json(r#"{"library":{"identifier":{"id":"Clean"}}}"#)
            .unwrap();

        assert!(check_annotations([&clean]).is_ok());

        let err = check_annotations([&clean, &failing]).unwrap_err();
        assert_eq!(err.code(), MB0200);
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].to_string().contains("Main:4:3"));
    }

    #[tokio::test]
    async fn test_mock_translator() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .withf(|request| request.names().collect::<Vec<_>>() == vec!["Main"])
            .times(1)
            .returning(|_| {
                let doc =
                    LibraryDocument::from_json(r#"{"library":{"identifier":{"id":"Main"}}}"#)?;
                Ok(BTreeMap::from([("Main".to_string(), doc)]))
            });

        let mut request = TranslationRequest::new();
        request.insert("Main", "library Main");
        let documents = translator.translate(&request).await.unwrap();

        assert_eq!(documents.len(), 1);
    }
}
