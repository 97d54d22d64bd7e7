use std::time::Duration;

use chrono::NaiveDate;
use olm_metrics_sampler::{
    load_config_with_env, CollectError, CsvSink, KubeMetricsSource, MetricsSource, MockEnvironment,
    PodFilter, Sampler, SamplerConfig,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/pods";

fn client_for(server: &mockito::ServerGuard) -> kube::Client {
    let url: http::Uri = server.url().parse().unwrap();
    kube::Client::try_from(kube::Config::new(url)).unwrap()
}

fn olm_filter() -> PodFilter {
    let cfg = load_config_with_env(&MockEnvironment::new()).unwrap();
    PodFilter::from_config(&cfg)
}

fn pod(namespace: &str, name: &str, containers: &[(&str, &str, &str)]) -> serde_json::Value {
    let containers: Vec<_> = containers
        .iter()
        .map(|(n, cpu, mem)| json!({"name": n, "usage": {"cpu": cpu, "memory": mem}}))
        .collect();
    json!({
        "metadata": {"name": name, "namespace": namespace, "creationTimestamp": "2024-03-01T14:07:30Z"},
        "timestamp": "2024-03-01T14:07:20Z",
        "window": "10.5s",
        "containers": containers
    })
}

fn metrics_list(items: Vec<serde_json::Value>) -> String {
    json!({
        "kind": "PodMetricsList",
        "apiVersion": "metrics.k8s.io/v1beta1",
        "metadata": {},
        "items": items
    })
    .to_string()
}

fn olm_cluster() -> String {
    metrics_list(vec![
        pod(
            "olmv1-system",
            "catalogd-abc123",
            &[("manager", "2345678n", "31Mi"), ("kube-rbac-proxy", "156712n", "12Mi")],
        ),
        pod("olmv1-system", "nginx-xyz", &[("nginx", "1m", "4Mi")]),
        pod(
            "operator-controller-system",
            "operator-controller-1",
            &[("manager", "3m", "40Mi"), ("kube-rbac-proxy", "1m", "9Mi")],
        ),
        pod(
            "olmv1-system",
            "operator-controller-controller-manager-5d7",
            &[("manager", "4m", "44Mi"), ("kube-rbac-proxy", "1m", "10Mi")],
        ),
    ])
}

#[tokio::test]
async fn test_collect_filters_live_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", METRICS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(olm_cluster())
        .create_async()
        .await;

    let mut source = KubeMetricsSource::new(client_for(&server), olm_filter());
    let samples = source.collect().await.unwrap();

    mock.assert_async().await;
    let names: Vec<_> = samples.iter().map(|s| s.pod_name.as_str()).collect();
    assert_eq!(names, vec!["catalogd-abc123", "operator-controller-controller-manager-5d7"]);

    let row = samples[0].to_row();
    assert_eq!(
        row.cells(),
        &["catalogd-abc123", "manager", "2345678n", "31Mi", "kube-rbac-proxy", "156712n", "12Mi"]
    );
    assert_eq!(source.skipped(), 0);
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", METRICS_PATH)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "Unauthorized",
                "reason": "Unauthorized",
                "code": 401
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut source = KubeMetricsSource::new(client_for(&server), olm_filter());
    let err = source.collect().await.unwrap_err();
    assert!(matches!(err, CollectError::Authentication(_)), "{:?}", err);
}

#[tokio::test]
async fn test_missing_metrics_api_maps_to_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", METRICS_PATH)
        .with_status(404)
        .with_body("404 page not found")
        .create_async()
        .await;

    let mut source = KubeMetricsSource::new(client_for(&server), olm_filter());
    let err = source.collect().await.unwrap_err();
    assert!(matches!(err, CollectError::ApiUnavailable(_)), "{:?}", err);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", METRICS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"items\": 42}")
        .create_async()
        .await;

    let mut source = KubeMetricsSource::new(client_for(&server), olm_filter());
    let err = source.collect().await.unwrap_err();
    assert!(matches!(err, CollectError::Decode(_)), "{:?}", err);
}

#[tokio::test]
async fn test_pods_with_extra_containers_are_skipped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", METRICS_PATH)
        .with_status(200)
        .with_body(metrics_list(vec![
            pod(
                "olmv1-system",
                "catalogd-injected",
                &[("manager", "1m", "1Mi"), ("proxy", "1m", "1Mi"), ("istio-proxy", "1m", "1Mi")],
            ),
            pod("olmv1-system", "catalogd-single", &[("manager", "1m", "1Mi")]),
        ]))
        .create_async()
        .await;

    let mut source = KubeMetricsSource::new(client_for(&server), olm_filter());
    let samples = source.collect().await.unwrap();

    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].pod_name, "catalogd-single");
    assert_eq!(source.skipped(), 1);
}

#[tokio::test]
async fn test_full_run_writes_csv() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", METRICS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(olm_cluster())
        .expect(3)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let started = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(14, 7, 33)
        .unwrap();
    let (mut sink, path) = CsvSink::create(dir.path(), "olm_v1_metrics", started, 2).unwrap();

    let config = SamplerConfig {
        interval: Duration::ZERO,
        sample_count: 3,
        checkpoint_every: 2,
    };
    let mut sampler = Sampler::new(KubeMetricsSource::new(client_for(&server), olm_filter()), config);
    let summary = sampler.run(&mut sink, &CancellationToken::new()).await.unwrap();
    sink.finish().unwrap();

    mock.assert_async().await;
    assert_eq!(path.file_name().unwrap(), "olm_v1_metrics-20240301-1407.csv");
    assert_eq!(summary.polls, 3);
    assert_eq!(summary.rows, 6);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], ",pod,c0,cpu0,mem0,c1,cpu1,mem1");
    assert_eq!(lines.len(), 1 + 3 * 2);
    assert_eq!(lines[1], "0,catalogd-abc123,manager,2345678n,31Mi,kube-rbac-proxy,156712n,12Mi");
    assert!(lines[6].starts_with("5,operator-controller-controller-manager-5d7,manager,4m,44Mi"));
    assert!(lines.iter().all(|l| !l.contains("nginx")));
}

#[tokio::test]
async fn test_failed_poll_keeps_checkpointed_rows_on_disk() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", METRICS_PATH)
        .with_status(200)
        .with_body(olm_cluster())
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let started = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let (mut sink, path) = CsvSink::create(dir.path(), "olm_v1_metrics", started, 2).unwrap();

    let config = SamplerConfig {
        interval: Duration::ZERO,
        sample_count: 2,
        checkpoint_every: 10,
    };
    let mut sampler = Sampler::new(KubeMetricsSource::new(client_for(&server), olm_filter()), config);
    sampler.run(&mut sink, &CancellationToken::new()).await.unwrap();
    ok.assert_async().await;
    ok.remove_async().await;

    server
        .mock("GET", METRICS_PATH)
        .with_status(503)
        .with_body("service unavailable")
        .create_async()
        .await;

    let config = SamplerConfig {
        interval: Duration::ZERO,
        sample_count: 5,
        checkpoint_every: 10,
    };
    let mut sampler = Sampler::new(KubeMetricsSource::new(client_for(&server), olm_filter()), config);
    let err = sampler.run(&mut sink, &CancellationToken::new()).await.unwrap_err();
    assert!(err.to_string().contains("metrics API unavailable"));

    // Rows from the earlier polls are on disk even though the sink was never finished
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1 + 2 * 2);
}

#[test]
fn test_default_config_matches_fixed_constants() {
    let cfg = load_config_with_env(&MockEnvironment::new()).unwrap();
    assert_eq!(cfg.sampler.interval, Duration::from_secs(2));
    assert_eq!(cfg.sampler.sample_count, 150);
    assert_eq!(cfg.namespace, "olmv1-system");
    assert_eq!(cfg.pod_prefixes, vec!["catalogd", "operator-controller"]);
}

#[test]
fn test_probe_reports_matching_pods() {
    tokio_test::block_on(async {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", METRICS_PATH)
            .with_status(200)
            .with_body(olm_cluster())
            .create_async()
            .await;

        let client = client_for(&server);
        let matching = olm_metrics_sampler::ensure_metrics_available(&client, &olm_filter())
            .await
            .unwrap();
        assert_eq!(matching, 2);
    });
}
