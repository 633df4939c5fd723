//! Remote libSQL backend over the HTTP pipeline protocol.
//!
//! Each statement is sent as a single pipeline request holding an `execute`
//! followed by a `close`, so no server-side stream outlives the call.
//! The server classifies reads and writes itself; the detected intent is
//! still used to ask for rows only when they are wanted and to apply the
//! read zero-value.

use async_trait::async_trait;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::executor::{BackendKind, StatementExecutor};
use crate::value::{placeholder_name, ExecResult, Params, Row, Statement, StatementKind, Value};

/// Accepts blob payloads with or without padding.
const BLOB_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Statement executor backed by a remote libSQL server.
#[derive(Debug, Clone)]
pub struct RemoteExecutor {
    client: reqwest::Client,
    pipeline_url: String,
    auth_token: Option<String>,
}

impl RemoteExecutor {
    /// Creates an executor for the server at `url`.
    ///
    /// `libsql://` and `wss://` URLs are rewritten to `https://`, `ws://` to
    /// `http://`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Http` if the HTTP client cannot be built.
    pub fn new(url: &str, auth_token: Option<String>) -> Result<Self, DbError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("academy-db/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            pipeline_url: format!("{}/v2/pipeline", http_base(url)),
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn pipeline_url(&self) -> &str {
        &self.pipeline_url
    }
}

#[async_trait]
impl StatementExecutor for RemoteExecutor {
    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbError> {
        let kind = stmt.kind();
        let body = pipeline_request(&stmt);

        let mut request = self.client.post(&self.pipeline_url).json(&body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(DbError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let pipeline: PipelineResponse =
            serde_json::from_slice(&bytes).map_err(|e| DbError::Protocol(e.to_string()))?;
        interpret_response(pipeline, kind)
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }
}

/// Converts a configured location into the HTTP base URL of the server.
pub(crate) fn http_base(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let rewrites = [
        ("libsql://", "https://"),
        ("wss://", "https://"),
        ("ws://", "http://"),
    ];
    for (from, to) in rewrites {
        if let Some(rest) = url
            .get(..from.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(from))
            .map(|_| &url[from.len()..])
        {
            return format!("{to}{rest}");
        }
    }
    url.to_string()
}

// ── Wire format ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PipelineRequest<'a> {
    baton: Option<String>,
    requests: Vec<StreamRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamRequest<'a> {
    Execute { stmt: WireStatement<'a> },
    Close,
}

#[derive(Debug, Serialize)]
struct WireStatement<'a> {
    sql: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    args: Vec<WireValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    named_args: Vec<NamedArg>,
    want_rows: bool,
}

#[derive(Debug, Serialize)]
struct NamedArg {
    name: String,
    value: WireValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireValue {
    Null,
    /// Integers travel as decimal strings so 64-bit values survive JSON.
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

#[derive(Debug, Deserialize)]
struct PipelineResponse {
    results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: WireError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamResponse {
    Execute { result: WireResult },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    cols: Vec<WireColumn>,
    #[serde(default)]
    rows: Vec<Vec<WireValue>>,
    #[serde(default)]
    affected_row_count: u64,
    #[serde(default)]
    last_insert_rowid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireColumn {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl From<&Value> for WireValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Integer(i) => Self::Integer {
                value: i.to_string(),
            },
            Value::Real(f) => Self::Float { value: *f },
            Value::Text(s) => Self::Text { value: s.clone() },
            Value::Blob(b) => Self::Blob {
                base64: STANDARD_NO_PAD.encode(b),
            },
        }
    }
}

impl TryFrom<WireValue> for Value {
    type Error = DbError;

    fn try_from(value: WireValue) -> Result<Self, DbError> {
        Ok(match value {
            WireValue::Null => Value::Null,
            WireValue::Integer { value } => Value::Integer(parse_integer(&value)?),
            WireValue::Float { value } => Value::Real(value),
            WireValue::Text { value } => Value::Text(value),
            WireValue::Blob { base64 } => Value::Blob(
                BLOB_DECODER
                    .decode(base64)
                    .map_err(|e| DbError::Protocol(format!("invalid blob encoding: {e}")))?,
            ),
        })
    }
}

fn parse_integer(text: &str) -> Result<i64, DbError> {
    text.parse()
        .map_err(|_| DbError::Protocol(format!("invalid integer value `{text}`")))
}

fn pipeline_request(stmt: &Statement) -> PipelineRequest<'_> {
    let (args, named_args) = match &stmt.params {
        Params::None => (Vec::new(), Vec::new()),
        Params::Positional(values) => (values.iter().map(WireValue::from).collect(), Vec::new()),
        Params::Named(pairs) => (
            Vec::new(),
            pairs
                .iter()
                .map(|(key, value)| NamedArg {
                    name: placeholder_name(key),
                    value: WireValue::from(value),
                })
                .collect(),
        ),
    };

    PipelineRequest {
        baton: None,
        requests: vec![
            StreamRequest::Execute {
                stmt: WireStatement {
                    sql: &stmt.sql,
                    args,
                    named_args,
                    want_rows: stmt.kind() == StatementKind::Read,
                },
            },
            StreamRequest::Close,
        ],
    }
}

fn interpret_response(
    pipeline: PipelineResponse,
    kind: StatementKind,
) -> Result<ExecResult, DbError> {
    let first = pipeline
        .results
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Protocol("pipeline returned no results".to_string()))?;

    let result = match first {
        StreamResult::Ok {
            response: StreamResponse::Execute { result },
        } => result,
        StreamResult::Ok { .. } => {
            return Err(DbError::Protocol(
                "expected an execute response".to_string(),
            ))
        }
        StreamResult::Error { error } => {
            return Err(DbError::Remote {
                message: error.message,
                code: error.code,
            })
        }
    };

    match kind {
        StatementKind::Read => {
            let names: Vec<String> = result
                .cols
                .into_iter()
                .enumerate()
                .map(|(idx, col)| col.name.unwrap_or_else(|| format!("column{idx}")))
                .collect();

            let rows = result
                .rows
                .into_iter()
                .map(|cells| {
                    if cells.len() != names.len() {
                        return Err(DbError::Protocol(format!(
                            "row has {} cells for {} columns",
                            cells.len(),
                            names.len()
                        )));
                    }
                    names
                        .iter()
                        .zip(cells)
                        .map(|(name, cell)| -> Result<(String, Value), DbError> {
                            Ok((name.clone(), Value::try_from(cell)?))
                        })
                        .collect::<Result<Row, DbError>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ExecResult::read(rows))
        }
        StatementKind::Write => {
            let last_insert_id = result
                .last_insert_rowid
                .as_deref()
                .map(parse_integer)
                .transpose()?
                .unwrap_or(0);
            Ok(ExecResult::write(result.affected_row_count, last_insert_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> PipelineResponse {
        serde_json::from_value(value).expect("fixture should parse")
    }

    #[test]
    fn http_base_rewrites_libsql_scheme() {
        assert_eq!(http_base("libsql://academy-org.turso.io"), "https://academy-org.turso.io");
        assert_eq!(http_base("LIBSQL://x.turso.io/"), "https://x.turso.io");
        assert_eq!(http_base("ws://localhost:8080"), "http://localhost:8080");
        assert_eq!(http_base("https://x.turso.io"), "https://x.turso.io");
    }

    #[test]
    fn executor_builds_pipeline_url_and_drops_blank_token() {
        let exec = RemoteExecutor::new("libsql://db.turso.io", Some("  ".into())).unwrap();
        assert_eq!(exec.pipeline_url(), "https://db.turso.io/v2/pipeline");
        assert!(exec.auth_token.is_none());
    }

    #[test]
    fn positional_request_encodes_integers_as_strings() {
        let stmt = Statement::new("SELECT * FROM videos WHERE id = ?")
            .positional(vec![Value::Integer(9_007_199_254_740_993)]);
        let body = serde_json::to_value(pipeline_request(&stmt)).unwrap();

        assert_eq!(
            body,
            json!({
                "baton": null,
                "requests": [
                    {
                        "type": "execute",
                        "stmt": {
                            "sql": "SELECT * FROM videos WHERE id = ?",
                            "args": [{"type": "integer", "value": "9007199254740993"}],
                            "want_rows": true
                        }
                    },
                    {"type": "close"}
                ]
            })
        );
    }

    #[test]
    fn named_request_prefixes_names() {
        let stmt = Statement::new("UPDATE videos SET title = :title WHERE id = :id")
            .named([("title", Value::from("Drills")), ("id", Value::from(3_i64))]);
        let body = serde_json::to_value(pipeline_request(&stmt)).unwrap();
        let wire = &body["requests"][0]["stmt"];

        assert!(wire.get("args").is_none());
        assert_eq!(wire["want_rows"], false);
        assert_eq!(
            wire["named_args"],
            json!([
                {"name": ":title", "value": {"type": "text", "value": "Drills"}},
                {"name": ":id", "value": {"type": "integer", "value": "3"}}
            ])
        );
    }

    #[test]
    fn read_response_decodes_rows() {
        let response = parse(json!({
            "baton": null,
            "base_url": null,
            "results": [
                {"type": "ok", "response": {"type": "execute", "result": {
                    "cols": [
                        {"name": "id", "decltype": "INTEGER"},
                        {"name": "title"},
                        {"name": "rating"},
                        {"name": "thumb"}
                    ],
                    "rows": [[
                        {"type": "integer", "value": "12"},
                        {"type": "text", "value": "Warm-up"},
                        {"type": "float", "value": 4.5},
                        {"type": "null"}
                    ]],
                    "affected_row_count": 0,
                    "last_insert_rowid": null
                }}},
                {"type": "ok", "response": {"type": "close"}}
            ]
        }));

        let result = interpret_response(response, StatementKind::Read).unwrap();
        assert_eq!(result.rows_affected, 0);
        assert_eq!(result.last_insert_id, None);
        let row = &result.rows[0];
        assert_eq!(row.get::<i64>("id").unwrap(), 12);
        assert_eq!(row.get::<String>("title").unwrap(), "Warm-up");
        assert_eq!(row.get::<f64>("rating").unwrap(), 4.5);
        assert_eq!(row.get::<Option<String>>("thumb").unwrap(), None);
    }

    #[test]
    fn write_response_coerces_wide_counters() {
        let response = parse(json!({
            "results": [
                {"type": "ok", "response": {"type": "execute", "result": {
                    "cols": [], "rows": [],
                    "affected_row_count": 1,
                    "last_insert_rowid": "4294967297"
                }}},
                {"type": "ok", "response": {"type": "close"}}
            ]
        }));

        let result = interpret_response(response, StatementKind::Write).unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, Some(4_294_967_297));
        assert!(result.rows.is_empty());
    }

    #[test]
    fn error_result_becomes_remote_error() {
        let response = parse(json!({
            "results": [
                {"type": "error", "error": {"message": "no such table: vids", "code": "SQLITE_ERROR"}},
                {"type": "error", "error": {"message": "stream closed"}}
            ]
        }));

        match interpret_response(response, StatementKind::Read).unwrap_err() {
            DbError::Remote { message, code } => {
                assert_eq!(message, "no such table: vids");
                assert_eq!(code.as_deref(), Some("SQLITE_ERROR"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_integer_is_a_protocol_error() {
        let response = parse(json!({
            "results": [{"type": "ok", "response": {"type": "execute", "result": {
                "cols": [{"name": "n"}],
                "rows": [[{"type": "integer", "value": "twelve"}]],
                "affected_row_count": 0
            }}}]
        }));
        let err = interpret_response(response, StatementKind::Read).unwrap_err();
        assert!(matches!(err, DbError::Protocol(_)));
    }

    #[test]
    fn empty_pipeline_is_a_protocol_error() {
        let err =
            interpret_response(parse(json!({"results": []})), StatementKind::Write).unwrap_err();
        assert!(matches!(err, DbError::Protocol(_)));
    }

    #[test]
    fn blob_values_round_trip_through_base64() {
        let wire = WireValue::from(&Value::Blob(vec![1, 2, 3, 250]));
        assert_eq!(Value::try_from(wire).unwrap(), Value::Blob(vec![1, 2, 3, 250]));

        let padded = WireValue::Blob {
            base64: "AQID+g==".into(),
        };
        assert_eq!(Value::try_from(padded).unwrap(), Value::Blob(vec![1, 2, 3, 250]));
    }
}
