use directive_knowledge::{build_bundle, list_files, read_file, DirectiveRoot, KnowledgeError};
use directive_protocol::{codes, Request, Response, RpcError};
use serde_json::{json, Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::tools::{tool_descriptors, FileGetArgs, Operation, Route, Surface};

/// Per-process state: the directive root, resolved once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    root: DirectiveRoot,
}

impl Session {
    pub fn new(root: DirectiveRoot) -> Self {
        Self { root }
    }

    /// Resolves `<repo>/directive`, falling back to the expected path when it does not exist yet.
    pub fn for_repo(repo_root: &Path) -> Self {
        let root = match DirectiveRoot::resolve(repo_root) {
            Ok(root) => root,
            Err(err) => {
                log::warn!("{err}; file operations will fail until it exists");
                DirectiveRoot::expected(repo_root)
            }
        };
        Self::new(root)
    }

    pub fn root(&self) -> &DirectiveRoot {
        &self.root
    }
}

/// Why a single request failed. Every variant becomes an error response; none ends the session.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Method not found: {0}")]
    UnknownMethod(String),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Internal(String),
}

impl From<KnowledgeError> for DispatchError {
    fn from(err: KnowledgeError) -> Self {
        if err.is_not_found() {
            return Self::NotFound(err.to_string());
        }
        match err {
            KnowledgeError::InvalidPath { .. } => Self::InvalidArgument(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl DispatchError {
    pub fn to_rpc_error(&self) -> RpcError {
        match self {
            Self::NotFound(_) => RpcError::new(codes::NOT_FOUND, self.to_string()),
            Self::UnknownMethod(_) | Self::UnknownTool(_) => {
                RpcError::new(codes::METHOD_NOT_FOUND, self.to_string())
            }
            Self::InvalidArgument(_) | Self::Internal(_) => RpcError::server_error(self.to_string()),
        }
    }
}

type DispatchResult = std::result::Result<Value, DispatchError>;

fn wrap_text_content(result: &Value) -> DispatchResult {
    let text = serde_json::to_string(result)?;
    Ok(json!({ "content": [{ "type": "text", "text": text }] }))
}

fn object_or_empty(value: Option<&Value>, what: &str) -> Result<Map<String, Value>, DispatchError> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(DispatchError::InvalidArgument(format!(
            "{what} must be an object"
        ))),
    }
}

fn parse_file_get_args(args: &Map<String, Value>) -> Result<FileGetArgs, DispatchError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|_| DispatchError::InvalidArgument("path must be a string".to_string()))
}

/// Routes decoded requests to the knowledge base and shapes the responses.
pub struct Dispatcher {
    session: Session,
}

impl Dispatcher {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Decodes one frame body and answers it. Undecodable bodies still get a response.
    pub fn handle_frame(&self, body: &[u8]) -> Response {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Undecodable request body: {err}");
                return Response::error(Value::Null, RpcError::parse_error(err.to_string()));
            }
        };
        if !value.is_object() {
            log::warn!("Request body is not a JSON object");
            return Response::error(
                Value::Null,
                RpcError::invalid_request("request must be a JSON object"),
            );
        }
        match serde_json::from_value::<Request>(value) {
            Ok(request) => self.handle(&request),
            Err(err) => Response::error(Value::Null, RpcError::invalid_request(err.to_string())),
        }
    }

    pub fn handle(&self, request: &Request) -> Response {
        match self.dispatch(request) {
            Ok(result) => Response::success(request.id.clone(), result),
            Err(err) => {
                log::warn!("Request {} failed: {err}", request.id);
                Response::error(request.id.clone(), err.to_rpc_error())
            }
        }
    }

    fn dispatch(&self, request: &Request) -> DispatchResult {
        let Some(method) = request.method_name() else {
            return Err(DispatchError::UnknownMethod(request.method.to_string()));
        };
        log::debug!("Dispatching {method}");

        match method {
            "tools/list" => Ok(json!({ "tools": tool_descriptors() })),
            "tools/call" => {
                let params = object_or_empty(Some(&request.params), "params")?;
                let Some(name) = params.get("name").and_then(Value::as_str) else {
                    return Err(DispatchError::InvalidArgument(
                        "name must be a string".to_string(),
                    ));
                };
                let route = Operation::lookup(Surface::Tool, name)
                    .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
                let arguments = object_or_empty(params.get("arguments"), "arguments")?;
                self.execute(route, &arguments)
            }
            other => {
                let route = Operation::lookup(Surface::Legacy, other)
                    .ok_or_else(|| DispatchError::UnknownMethod(other.to_string()))?;
                let params = object_or_empty(Some(&request.params), "params")?;
                self.execute(route, &params)
            }
        }
    }

    fn execute(&self, route: Route, args: &Map<String, Value>) -> DispatchResult {
        let result = self.run(route.operation, args)?;
        match route.surface {
            Surface::Legacy => Ok(result),
            Surface::Tool => wrap_text_content(&result),
        }
    }

    fn run(&self, operation: Operation, args: &Map<String, Value>) -> DispatchResult {
        let root = self.session.root();
        match operation {
            Operation::ListFiles => Ok(json!({ "files": list_files(root) })),
            Operation::ReadFile => {
                let args = parse_file_get_args(args)?;
                let file = read_file(root, &args.path)?;
                Ok(serde_json::to_value(file)?)
            }
            Operation::Bundle(kind) => {
                let bundle = build_bundle(root, kind.file_name())?;
                Ok(serde_json::to_value(bundle)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const AOP: &str = "Do not write code until the TDR is produced and approved.";

    fn populated_repo() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let reference = temp.path().join("directive/reference");
        fs::create_dir_all(reference.join("templates")).unwrap();
        fs::write(reference.join("agent_operating_procedure.md"), AOP).unwrap();
        fs::write(reference.join("agent_context.md"), "CTX").unwrap();
        fs::write(reference.join("templates/spec_template.md"), "SPEC TMPL").unwrap();
        temp
    }

    fn call(dispatcher: &Dispatcher, request: Value) -> Value {
        let body = serde_json::to_vec(&request).unwrap();
        serde_json::to_value(dispatcher.handle_frame(&body)).unwrap()
    }

    fn text_payload(response: &Value) -> Value {
        let content = response["result"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap()
    }

    #[test]
    fn tools_list_returns_catalog() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(&dispatcher, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}));
        let names: Vec<&str> = response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "directive/files.list",
                "directive/file.get",
                "directive/spec.template",
                "directive/impact.template",
                "directive/tdr.template",
            ]
        );
    }

    #[test]
    fn legacy_file_get_returns_raw_result() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(
            &dispatcher,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "directive.file.get",
                "params": {"path": "directive/reference/agent_context.md"}
            }),
        );
        assert_eq!(
            response["result"],
            json!({"path": "directive/reference/agent_context.md", "content": "CTX"})
        );
        assert!(response.get("error").is_none());
    }

    #[test]
    fn tool_and_legacy_surfaces_agree() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let legacy = call(&dispatcher, json!({"id": 1, "method": "spec.template", "params": {}}));
        let tool = call(
            &dispatcher,
            json!({
                "id": 2,
                "method": "tools/call",
                "params": {"name": "directive/spec.template", "arguments": {}}
            }),
        );

        assert_eq!(text_payload(&tool), legacy["result"]);
        assert_eq!(legacy["result"]["template"]["content"], "SPEC TMPL");
        assert_eq!(legacy["result"]["primer"], AOP);
        assert_eq!(
            legacy["result"]["agentContext"]["path"],
            "directive/reference/agent_context.md"
        );
    }

    #[test]
    fn tool_file_get_and_list() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let get = call(
            &dispatcher,
            json!({
                "id": 1,
                "method": "tools/call",
                "params": {
                    "name": "directive/file.get",
                    "arguments": {"path": "directive/reference/agent_context.md"}
                }
            }),
        );
        assert_eq!(text_payload(&get)["content"], "CTX");

        let list = call(
            &dispatcher,
            json!({"id": 2, "method": "tools/call", "params": {"name": "directive/files.list"}}),
        );
        let files = text_payload(&list)["files"].clone();
        assert!(files
            .as_array()
            .unwrap()
            .contains(&json!("directive/reference/agent_context.md")));
    }

    #[test]
    fn unknown_method_and_tool_are_method_not_found() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(&dispatcher, json!({"id": 5, "method": "not.a.method"}));
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["message"], "Method not found: not.a.method");
        assert_eq!(response["id"], 5);
        assert!(response.get("result").is_none());

        let response = call(
            &dispatcher,
            json!({"id": 6, "method": "tools/call", "params": {"name": "directive/nope"}}),
        );
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["message"], "Tool not found: directive/nope");

        // Tool names are not methods.
        let response = call(&dispatcher, json!({"id": 7, "method": "directive/file.get"}));
        assert_eq!(response["error"]["code"], -32601);
    }

    #[test]
    fn missing_or_invalid_path_is_server_error() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        for params in [json!({}), json!({"path": 42}), json!({"path": null})] {
            let response = call(
                &dispatcher,
                json!({"id": 1, "method": "directive.file.get", "params": params}),
            );
            assert_eq!(response["error"]["code"], -32000);
            assert_eq!(response["error"]["message"], "Server error");
            assert_eq!(response["error"]["data"]["details"], "path must be a string");
        }
    }

    #[test]
    fn non_string_tool_name_is_server_error() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(
            &dispatcher,
            json!({"id": 1, "method": "tools/call", "params": {"name": 7}}),
        );
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(response["error"]["data"]["details"], "name must be a string");
    }

    #[test]
    fn escaping_path_is_rejected_as_server_error() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(
            &dispatcher,
            json!({"id": 1, "method": "directive.file.get", "params": {"path": "directive/../../etc/passwd"}}),
        );
        assert_eq!(response["error"]["code"], -32000);
        assert!(response.get("result").is_none());
    }

    #[test]
    fn missing_resources_use_not_found_code() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(&dispatcher, json!({"id": 1, "method": "tdr.template"}));
        assert_eq!(response["error"]["code"], 1001);
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Missing template"));

        let response = call(
            &dispatcher,
            json!({"id": 2, "method": "directive.file.get", "params": {"path": "directive/missing.md"}}),
        );
        assert_eq!(response["error"]["code"], 1001);
    }

    #[test]
    fn unreadable_file_is_internal_server_error() {
        let temp = populated_repo();
        fs::write(temp.path().join("directive/bin.md"), [0xff, 0xfe, 0x00]).unwrap();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(
            &dispatcher,
            json!({"id": 1, "method": "directive.file.get", "params": {"path": "directive/bin.md"}}),
        );
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(response["error"]["message"], "Server error");
        assert!(response["error"]["data"]["details"]
            .as_str()
            .unwrap()
            .contains("directive/bin.md"));
        assert!(response.get("result").is_none());

        let response = call(
            &dispatcher,
            json!({
                "id": 2,
                "method": "tools/call",
                "params": {"name": "directive/file.get", "arguments": {"path": "directive/bin.md"}}
            }),
        );
        assert_eq!(response["error"]["code"], -32000);
    }

    #[test]
    fn missing_root_defers_failure_to_file_operations() {
        let temp = tempdir().unwrap();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let list = call(&dispatcher, json!({"id": 1, "method": "directive.files.list"}));
        assert_eq!(list["result"], json!({"files": []}));

        let bundle = call(&dispatcher, json!({"id": 2, "method": "spec.template"}));
        assert_eq!(bundle["error"]["code"], 1001);
    }

    #[test]
    fn malformed_bodies_still_get_responses() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = serde_json::to_value(dispatcher.handle_frame(b"{not json")).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["id"], Value::Null);

        let response = serde_json::to_value(dispatcher.handle_frame(b"[1, 2]")).unwrap();
        assert_eq!(response["error"]["code"], -32600);

        let response = call(&dispatcher, json!({"id": 3, "method": 12}));
        assert_eq!(response["error"]["code"], -32601);
    }

    #[test]
    fn id_is_echoed_unchanged() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        for id in [json!("req-9"), json!(0), json!(null), json!(2.5)] {
            let response = call(&dispatcher, json!({"id": id, "method": "tools/list"}));
            assert_eq!(response["id"], id);
        }
    }

    #[test]
    fn non_object_params_are_server_error() {
        let temp = populated_repo();
        let dispatcher = Dispatcher::new(Session::for_repo(temp.path()));

        let response = call(
            &dispatcher,
            json!({"id": 1, "method": "directive.files.list", "params": ["x"]}),
        );
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(response["error"]["data"]["details"], "params must be an object");
    }
}
