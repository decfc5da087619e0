use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use apexec::diagnostics;
use apexec::executor::Executor;
use apexec::soap::ExecutionRequest;
use apexec::transport::{xml, Transport};
use apexec::Session;

fn session() -> Session {
    Session::new("https://na1.salesforce.com", "50.0", "00D4x!AQcAQH4xJ9wJ")
}

/// Returns a canned reply and records the request it was asked to send.
struct CannedTransport {
    reply: Value,
    seen: Mutex<Option<ExecutionRequest>>,
}

impl CannedTransport {
    fn new(reply: Value) -> Self {
        Self { reply, seen: Mutex::new(None) }
    }

    fn seen(&self) -> ExecutionRequest {
        self.seen.lock().unwrap().clone().expect("no request sent")
    }
}

// On a shared reference so tests can read the capture back after handing
// the transport to an executor.
#[async_trait]
impl Transport for &CannedTransport {
    async fn request(&self, request: &ExecutionRequest) -> Result<Value> {
        *self.seen.lock().unwrap() = Some(request.clone());
        Ok(self.reply.clone())
    }
}

// Owned form for tests that hand the transport over by value.
#[async_trait]
impl Transport for CannedTransport {
    async fn request(&self, request: &ExecutionRequest) -> Result<Value> {
        *self.seen.lock().unwrap() = Some(request.clone());
        Ok(self.reply.clone())
    }
}

struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn request(&self, _request: &ExecutionRequest) -> Result<Value> {
        bail!("connection reset by peer")
    }
}

fn success_reply(debug_log: &str) -> Value {
    json!({
        "soapenv:Envelope": {
            "soapenv:Header": { "DebuggingInfo": { "debugLog": debug_log } },
            "soapenv:Body": {
                "executeAnonymousResponse": {
                    "result": {
                        "column": "-1",
                        "compileProblem": Value::Null,
                        "compiled": "true",
                        "exceptionMessage": Value::Null,
                        "exceptionStackTrace": Value::Null,
                        "line": "-1",
                        "success": "true"
                    }
                }
            }
        }
    })
}

#[tokio::test]
async fn success_reply_flows_through_pipeline() -> Result<()> {
    let transport = CannedTransport::new(success_reply("USER_DEBUG|[1]|DEBUG|hello"));
    let executor = Executor::new(session(), &transport);

    let result = executor.execute("System.debug('hello');", true).await?;

    assert!(result.compiled);
    assert!(result.success);
    assert_eq!(result.logs, "USER_DEBUG|[1]|DEBUG|hello");
    assert_eq!(result.compile_problem, "");
    assert_eq!(result.exception_message, "");
    Ok(())
}

#[tokio::test]
async fn built_request_reaches_transport_verbatim() -> Result<()> {
    let transport = CannedTransport::new(success_reply(""));
    let executor = Executor::new(session(), &transport);
    let source = "Integer i = 1 < 2 ? 3 : 4;";

    executor.execute(source, true).await?;
    let seen = transport.seen();
    assert_eq!(
        seen.endpoint_url,
        "https://na1.salesforce.com/services/Soap/s/50.0/00D4x"
    );
    assert_eq!(seen.headers.get("soapaction").map(String::as_str), Some("executeAnonymous"));
    assert_eq!(seen.headers.get("content-type").map(String::as_str), Some("text/xml"));
    assert!(seen.body.contains(&format!("<apexcode>{source}</apexcode>")));
    assert!(seen.body.contains("<apex:DebuggingHeader>"));

    executor.execute(source, false).await?;
    assert!(!transport.seen().body.contains("DebuggingHeader"));
    Ok(())
}

#[tokio::test]
async fn transport_failure_surfaces_untouched() {
    let executor = Executor::new(session(), FailingTransport);
    let err = executor.execute("System.debug(1);", true).await.unwrap_err();
    assert!(err.to_string().contains("connection reset by peer"));
}

#[tokio::test]
async fn compile_fault_reply_yields_diagnostic() -> Result<()> {
    let reply = json!({
        "soapenv:Envelope": {
            "soapenv:Header": {},
            "soapenv:Body": {
                "executeAnonymousResponse": {
                    "result": {
                        "column": "18",
                        "compileProblem": "Unexpected token ')'.",
                        "compiled": "false",
                        "line": "1",
                        "success": "false"
                    }
                }
            }
        }
    });
    let executor = Executor::new(session(), CannedTransport::new(reply));
    let result = executor.execute("System.debug(;", true).await?;

    assert!(!result.compiled);
    assert!(!result.success);
    assert_eq!((result.line, result.column), (1, 18));

    let diags = diagnostics::from_result(&result);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Unexpected token ')'.");
    assert_eq!((diags[0].line, diags[0].column), (1, 18));
    Ok(())
}

const WIRE_SUCCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="http://soap.sforce.com/2006/08/apex" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soapenv:Header>
    <DebuggingInfo>
      <debugLog>52.0 APEX_CODE,DEBUGONLY
Execute Anonymous: System.debug('hi');
USER_DEBUG|[1]|DEBUG|hi</debugLog>
    </DebuggingInfo>
  </soapenv:Header>
  <soapenv:Body>
    <executeAnonymousResponse>
      <result>
        <column>-1</column>
        <compileProblem xsi:nil="true"/>
        <compiled>true</compiled>
        <exceptionMessage xsi:nil="true"/>
        <exceptionStackTrace xsi:nil="true"/>
        <line>-1</line>
        <success>true</success>
      </result>
    </executeAnonymousResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

const WIRE_RUNTIME_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="http://soap.sforce.com/2006/08/apex" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soapenv:Body>
    <executeAnonymousResponse>
      <result>
        <column>1</column>
        <compileProblem xsi:nil="true"/>
        <compiled>true</compiled>
        <exceptionMessage>System.AssertException: Assertion Failed</exceptionMessage>
        <exceptionStackTrace>AnonymousBlock: line 2, column 1</exceptionStackTrace>
        <line>2</line>
        <success>false</success>
      </result>
    </executeAnonymousResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

#[tokio::test]
async fn canned_wire_success_normalizes() -> Result<()> {
    let executor = Executor::new(session(), CannedTransport::new(xml::to_value(WIRE_SUCCESS)?));
    let result = executor.execute("System.debug('hi');", true).await?;

    assert!(result.compiled);
    assert!(result.success);
    assert_eq!((result.line, result.column), (-1, -1));
    assert!(result.logs.contains("USER_DEBUG|[1]|DEBUG|hi"));
    Ok(())
}

#[tokio::test]
async fn canned_wire_runtime_fault_normalizes() -> Result<()> {
    let executor = Executor::new(
        session(),
        CannedTransport::new(xml::to_value(WIRE_RUNTIME_FAULT)?),
    );
    let result = executor.execute("System.assert(false);", true).await?;

    assert!(result.compiled);
    assert!(!result.success);
    assert_eq!(result.exception_message, "System.AssertException: Assertion Failed");
    assert_eq!(result.exception_stack_trace, "AnonymousBlock: line 2, column 1");
    assert_eq!((result.line, result.column), (2, 1));
    assert_eq!(result.logs, "");
    Ok(())
}
