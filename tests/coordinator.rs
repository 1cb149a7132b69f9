//! Integration tests for the coordinator
//!
//! These drive a full job run, poller and dispatcher together, against a
//! scripted salt-api stand-in and check what reaches the output stream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use salt_courier::app::{
    translate, CallPayload, CancelReason, CancelToken, Coordinator, CoordinatorConfig, JobApi,
    LoginOutcome,
};
use salt_courier::auth::Credentials;
use salt_courier::errors::{AppError, RenderError, TransportError, TransportResult};
use salt_courier::output::{OutputKind, OutputPolicy};

/// Shared record of the calls a `FakeSalt` received
type CallLog = Arc<Mutex<Vec<String>>>;

struct FakeSalt {
    login: LoginOutcome,
    submission: Value,
    lookups: Mutex<VecDeque<Value>>,
    calls: CallLog,
}

impl FakeSalt {
    fn new(submission: Value, lookups: Vec<Value>) -> (Self, CallLog) {
        let calls = CallLog::default();
        let fake = Self {
            login: LoginOutcome::Authenticated(json!({"return": [{"token": "t0k3n", "eauth": "pam"}]})),
            submission,
            lookups: Mutex::new(lookups.into()),
            calls: calls.clone(),
        };
        (fake, calls)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl JobApi for FakeSalt {
    async fn login(&mut self, credentials: &Credentials) -> TransportResult<LoginOutcome> {
        self.record(format!("login {}", credentials.username));
        Ok(self.login.clone())
    }

    async fn submit(&self, payload: &CallPayload) -> TransportResult<Value> {
        self.record(format!("submit {}", payload.fun));
        Ok(self.submission.clone())
    }

    async fn lookup(&self, jid: &str) -> TransportResult<Value> {
        self.record(format!("lookup {}", jid));
        let mut lookups = self.lookups.lock().unwrap();
        if lookups.len() > 1 {
            return lookups.pop_front().ok_or(TransportError::Closed);
        }
        lookups.front().cloned().ok_or(TransportError::Closed)
    }

    async fn close(&mut self) {
        self.record("close".to_string());
    }
}

fn credentials() -> Credentials {
    Credentials {
        username: "salt".to_string(),
        password: "secret".to_string(),
        eauth: "pam".to_string(),
    }
}

fn test_config() -> CoordinatorConfig {
    CoordinatorConfig::default()
        .with_poll_interval(Duration::from_millis(1))
        .with_status(false)
        .with_color(false)
}

fn ping_lookup(returned: &[&str]) -> Value {
    let ret: serde_json::Map<String, Value> =
        returned.iter().map(|m| (m.to_string(), json!(true))).collect();
    let result: serde_json::Map<String, Value> = returned
        .iter()
        .map(|m| (m.to_string(), json!({"return": true, "success": true})))
        .collect();
    json!({
        "info": [{
            "jid": "20240101120000000001",
            "Function": "test.ping",
            "Minions": ["web01", "web02"],
            "Result": result
        }],
        "return": [ret]
    })
}

#[tokio::test]
async fn test_ping_job_end_to_end() {
    let (api, calls) = FakeSalt::new(
        json!({"return": [{"jid": "20240101120000000001", "minions": ["web01", "web02"]}]}),
        vec![ping_lookup(&["web01"]), ping_lookup(&["web01", "web02"])],
    );
    let payload = translate(&["salt", "web*", "test.ping"]).unwrap();
    let mut out = Vec::new();

    let report = Coordinator::new(test_config())
        .run(api, &credentials(), Some(&payload), &mut out)
        .await
        .unwrap();

    assert_eq!(report.poll.iterations, 2);
    assert_eq!(report.dispatch.rendered, 2);
    assert_eq!(report.dispatch.final_output, OutputKind::Boolean);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("web01  | ✔"));
    assert!(text.contains("web02  | ✔"));
    assert!(text.contains("All minions returned"));

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            "login salt",
            "submit test.ping",
            "lookup 20240101120000000001",
            "lookup 20240101120000000001",
            "close"
        ]
    );
}

#[tokio::test]
async fn test_budget_exhausted_lists_missing_minions() {
    let (api, _calls) = FakeSalt::new(
        json!({"return": [{"jid": "20240101120000000001"}]}),
        vec![ping_lookup(&["web01"])],
    );
    let payload = translate(&["salt", "*", "test.ping"]).unwrap();
    let mut out = Vec::new();

    let report = Coordinator::new(test_config().with_poll_budget(1))
        .run_with_token(api, &credentials(), Some(&payload), &mut out, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.poll.iterations, 2);
    assert_eq!(report.poll.remaining_budget, 0);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Minions that did not return:"));
    assert!(text.contains("✘ web02"));
}

#[tokio::test]
async fn test_rejected_login_is_rendered_not_failed() {
    let (mut api, calls) = FakeSalt::new(json!({}), vec![]);
    api.login = LoginOutcome::Rejected(json!({"return": [{"Status": "Unable to authorize connection"}]}));
    let payload = translate(&["salt", "*", "test.ping"]).unwrap();
    let mut out = Vec::new();

    let report = Coordinator::new(test_config())
        .run_with_token(api, &credentials(), Some(&payload), &mut out, CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.dispatch.final_output, OutputKind::Json);
    assert!(report.poll.job.is_none());
    let rendered: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(rendered["return"][0]["Status"], "Unable to authorize connection");
    assert_eq!(*calls.lock().unwrap(), vec!["login salt", "close"]);
}

#[tokio::test]
async fn test_renderer_failure_fails_the_run() {
    let bad_state = json!({
        "info": [{
            "jid": "20240101120000000001",
            "Function": "state.apply",
            "Minions": ["web01"],
            "Result": {"web01": {"return": {"not a state id": {"result": true}}}}
        }],
        "return": [{"web01": {}}]
    });
    let (api, calls) = FakeSalt::new(
        json!({"return": [{"jid": "20240101120000000001"}]}),
        vec![bad_state],
    );
    let payload = translate(&["salt", "web01", "state.apply"]).unwrap();
    let cancel = CancelToken::new();
    let mut out = Vec::new();

    let result = Coordinator::new(test_config())
        .run_with_token(api, &credentials(), Some(&payload), &mut out, cancel.clone())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Render(RenderError::MalformedStateId { .. }))
    ));
    assert_eq!(cancel.reason(), Some(CancelReason::Failure));
    assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn test_interrupt_stops_polling() {
    let (api, calls) = FakeSalt::new(
        json!({"return": [{"jid": "20240101120000000001"}]}),
        vec![ping_lookup(&[])],
    );
    let payload = translate(&["salt", "*", "test.ping"]).unwrap();
    let cancel = CancelToken::new();
    let mut out = Vec::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel(CancelReason::Interrupted);
    });

    let config = test_config()
        .with_poll_budget(10_000)
        .with_poll_interval(Duration::from_millis(5));
    let result = Coordinator::new(config)
        .run_with_token(api, &credentials(), Some(&payload), &mut out, cancel)
        .await;

    assert!(matches!(result, Err(AppError::Interrupted)));
    assert!(out.is_empty());
    assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn test_forced_output_and_no_command() {
    let (api, calls) = FakeSalt::new(json!({}), vec![]);
    let mut out = Vec::new();

    let config = test_config().with_output(OutputPolicy::new(Some(OutputKind::Yaml)));
    let report = Coordinator::new(config)
        .run_with_token(api, &credentials(), None, &mut out, CancelToken::new())
        .await
        .unwrap();

    // the login body is always shown raw
    assert_eq!(report.dispatch.final_output, OutputKind::Json);
    let rendered: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(rendered["return"][0]["token"], "t0k3n");
    assert_eq!(*calls.lock().unwrap(), vec!["login salt", "close"]);
}
