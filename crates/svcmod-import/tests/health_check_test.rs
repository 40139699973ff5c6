//! Health verification sweeps against a mocked deploy service

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use svcmod_import::{
    HealthCheckOutcome, HealthVerifier, ImportClient, ImportConfig, ImportError, ImportResult,
    ImportWorker, InstanceUserResolver, ModuleQuery, ModuleRecord, ModuleRegistry,
    RegisteredModule, Token, TokenExchange, WorkerDependencies,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StaticTokens;

#[async_trait]
impl TokenExchange for StaticTokens {
    async fn exchange_user_token(&self, user_id: &str) -> ImportResult<Token> {
        if user_id == "ghost" {
            return Err(ImportError::UpstreamLookupFailed("unknown user".into()));
        }
        Ok(Token::new(format!("jwt-{}", user_id), user_id))
    }
}

struct NoUsers;

#[async_trait]
impl InstanceUserResolver for NoUsers {
    async fn get_instance_user(&self, _process_instance_id: &str) -> ImportResult<String> {
        Err(ImportError::UpstreamLookupFailed("not used".into()))
    }
}

#[derive(Debug)]
enum Report {
    Healthy,
    Degraded(String),
    Failed(String),
}

#[derive(Default)]
struct RecordingRegistry {
    modules: Vec<RegisteredModule>,
    reports: Mutex<Vec<(String, Report)>>,
}

impl RecordingRegistry {
    fn report_of(&self, id: &str) -> Option<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .find(|(module_id, _)| module_id == id)
            .map(|(_, report)| format!("{:?}", report))
    }
}

#[async_trait]
impl ModuleRegistry for RecordingRegistry {
    async fn list_modules(&self, query: &ModuleQuery) -> ImportResult<Vec<RegisteredModule>> {
        Ok(self
            .modules
            .iter()
            .filter(|m| query.matches(&m.record))
            .cloned()
            .collect())
    }

    async fn report_health(
        &self,
        module: &RegisteredModule,
        result: ImportResult<HealthCheckOutcome>,
    ) {
        let report = match result {
            Ok(outcome) if outcome.degraded => Report::Degraded(outcome.detail),
            Ok(_) => Report::Healthy,
            Err(e) => Report::Failed(e.to_string()),
        };
        self.reports
            .lock()
            .unwrap()
            .push((module.record.id.clone(), report));
    }
}

fn module(id: &str, user_id: &str, module_data: Value) -> RegisteredModule {
    let module_data: Map<String, Value> = module_data.as_object().cloned().unwrap_or_default();
    RegisteredModule {
        user_id: user_id.to_string(),
        record: ModuleRecord {
            id: id.to_string(),
            process_instance_id: "pi".to_string(),
            module_type: "import".to_string(),
            module_data,
            delete_info: None,
        },
    }
}

async fn mount_probe(server: &MockServer, import_id: &str, status: u16, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/instances/{}", import_id)))
        .and(header("Authorization", "Bearer jwt-user-1"))
        .and(header("X-UserId", "user-1"))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sweep_survives_malformed_module() {
    let server = MockServer::start().await;
    mount_probe(&server, "imp-1", 200, 1).await;
    mount_probe(&server, "imp-3", 503, 1).await;

    let registry = RecordingRegistry {
        modules: vec![
            module("m1", "user-1", json!({"import": {"id": "imp-1"}})),
            module("m2", "user-1", json!({"import": {"id": 2}})),
            module("m3", "user-1", json!({"import": {"id": "imp-3"}})),
        ],
        ..Default::default()
    };

    let verifier = Arc::new(HealthVerifier::new(
        Arc::new(StaticTokens),
        ImportClient::new(&server.uri()).unwrap(),
    ));

    let checked = registry
        .run_health_check(&ModuleQuery::by_type("import"), verifier.into_check_fn())
        .await
        .unwrap();
    assert_eq!(checked, 3);

    assert_eq!(registry.report_of("m1").unwrap(), "Healthy");
    assert!(registry.report_of("m2").unwrap().contains("Malformed module data"));
    assert!(registry.report_of("m3").unwrap().contains("503"));
    assert!(registry.report_of("m3").unwrap().starts_with("Degraded"));
}

#[tokio::test]
async fn test_token_failure_reported_as_error() {
    let server = MockServer::start().await;

    let verifier = HealthVerifier::new(
        Arc::new(StaticTokens),
        ImportClient::new(&server.uri()).unwrap(),
    );

    let err = verifier
        .check(&module("m1", "ghost", json!({"import": {"id": "imp-1"}})))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::UpstreamLookupFailed(_)));
}

#[tokio::test]
async fn test_transport_failure_is_not_degraded() {
    let verifier = HealthVerifier::new(
        Arc::new(StaticTokens),
        ImportClient::new("http://127.0.0.1:9").unwrap(),
    );

    let err = verifier
        .check(&module("m1", "user-1", json!({"import": {"id": "imp-1"}})))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::HealthCheckTransportFailed(_)));
}

#[tokio::test]
async fn test_worker_runs_initial_sweep() {
    let server = MockServer::start().await;
    mount_probe(&server, "imp-1", 200, 1).await;

    let registry = Arc::new(RecordingRegistry {
        modules: vec![module("m1", "user-1", json!({"import": {"id": "imp-1"}}))],
        ..Default::default()
    });

    let config = ImportConfig {
        worker_param_prefix: String::new(),
        import_deploy_url: server.uri(),
        health_check_interval: "1h".to_string(),
        worker_topic: "import".to_string(),
    };

    let worker = ImportWorker::start(
        config,
        WorkerDependencies {
            users: Arc::new(NoUsers),
            tokens: Arc::new(StaticTokens),
            registry: registry.clone(),
            transformer: None,
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(registry.report_of("m1").unwrap(), "Healthy");
    worker.shutdown().await;
}

#[tokio::test]
async fn test_worker_rejects_bad_interval() {
    let config = ImportConfig {
        health_check_interval: "whenever".to_string(),
        ..Default::default()
    };

    let result = ImportWorker::start(
        config,
        WorkerDependencies {
            users: Arc::new(NoUsers),
            tokens: Arc::new(StaticTokens),
            registry: Arc::new(RecordingRegistry::default()),
            transformer: None,
        },
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(ImportError::Configuration(_))));
}
