//! PacController dispatch and cache tests
//!
//! Runs the controller against the in-memory simulator and checks:
//! - bulk fetch once per collection until the cache is cleared
//! - write paths and payloads per category
//! - failures that must never reach the transport

use pacvars_client::{
    Category, ControllerConfig, ErrorKind, LogConfig, LogFormat, LogSink, MemoryTransport,
    PacController, PacError, Value,
};
use serde_json::json;
use std::sync::Arc;

const INT32S: &str = "/api/v1/device/strategy/vars/int32s";
const FLOATS: &str = "/api/v1/device/strategy/vars/floats";

fn config() -> ControllerConfig {
    ControllerConfig::new("pac", "kid", "secret")
}

fn setup() -> (Arc<MemoryTransport>, PacController) {
    let device = Arc::new(MemoryTransport::default());
    let pac = PacController::with_transport(config(), device.clone()).unwrap();
    (device, pac)
}

#[tokio::test]
async fn test_boolean_overlay_on_integer_collection() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "bReady", json!(1));
    device.insert_scalar(Category::Integer, "iCount", json!(5));

    assert_eq!(pac.get("bReady").await.unwrap(), Value::Bool(true));
    assert_eq!(pac.get("iCount").await.unwrap(), Value::Integer(5));

    // Both names come from the single int32s read
    assert_eq!(device.count("GET", INT32S), 1);
    assert_eq!(pac.request_count(), 1);
}

#[tokio::test]
async fn test_bulk_fetch_once_until_clear() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Float, "fLevel", json!(1.5));
    device.insert_scalar(Category::Float, "fSetpoint", json!(20.0));

    assert_eq!(pac.get("fLevel").await.unwrap(), Value::Float(1.5));
    assert_eq!(pac.get("fSetpoint").await.unwrap(), Value::Float(20.0));
    assert_eq!(pac.get("fLevel").await.unwrap(), Value::Float(1.5));
    assert_eq!(device.count("GET", FLOATS), 1);

    device.insert_scalar(Category::Float, "fLevel", json!(3.0));
    assert_eq!(pac.get("fLevel").await.unwrap(), Value::Float(1.5));

    pac.clear_cache();
    assert_eq!(pac.get("fLevel").await.unwrap(), Value::Float(3.0));
    assert_eq!(device.count("GET", FLOATS), 2);
}

#[tokio::test]
async fn test_write_updates_only_that_entry() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "iA", json!(1));
    device.insert_scalar(Category::Integer, "iB", json!(2));
    device.insert_scalar(Category::Integer, "bDone", json!(0));

    pac.get("iA").await.unwrap();
    pac.set("iA", &json!(10)).await.unwrap();

    let calls = device.calls();
    let last = calls.last().unwrap();
    assert_eq!(last.method, "POST");
    assert_eq!(last.path, format!("{}/iA", INT32S));
    assert_eq!(last.payload, Some(json!({"value": 10})));

    assert_eq!(pac.get("iA").await.unwrap(), Value::Integer(10));
    assert_eq!(pac.get("iB").await.unwrap(), Value::Integer(2));
    assert_eq!(pac.get("bDone").await.unwrap(), Value::Bool(false));
    assert_eq!(device.count("GET", INT32S), 1);
}

#[tokio::test]
async fn test_boolean_write_encodes_integer() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "bReady", json!(0));

    pac.get("bReady").await.unwrap();
    pac.set("bReady", &json!(true)).await.unwrap();

    assert_eq!(device.scalar(Category::Integer, "bReady"), Some(json!(1)));
    assert_eq!(pac.get("bReady").await.unwrap(), Value::Bool(true));

    let err = pac.set("bReady", &json!(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[tokio::test]
async fn test_write_without_cache_does_not_fetch() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::String, "sMode", json!("auto"));

    pac.set("sMode", &json!(42)).await.unwrap();
    assert_eq!(device.call_count(), 1);
    assert_eq!(device.scalar(Category::String, "sMode"), Some(json!("42")));

    assert_eq!(pac.get("sMode").await.unwrap(), Value::from("42"));
    assert_eq!(device.call_count(), 2);
}

#[tokio::test]
async fn test_io_write_sub_paths() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::AnalogOutput, "aoValve", json!(0.0));
    device.insert_scalar(Category::DigitalOutput, "doPump", json!(false));

    pac.set("aoValve", &json!(42.5)).await.unwrap();
    pac.set("doPump", &json!(true)).await.unwrap();

    let calls = device.calls();
    assert_eq!(
        calls[0].path,
        "/api/v1/device/strategy/ios/analogOutputs/aoValve/eu"
    );
    assert_eq!(calls[0].payload, Some(json!({"value": 42.5})));
    assert_eq!(
        calls[1].path,
        "/api/v1/device/strategy/ios/digitalOutputs/doPump/state"
    );
    assert_eq!(calls[1].payload, Some(json!({"value": true})));
    assert_eq!(pac.get("doPump").await.unwrap(), Value::Bool(true));
}

#[tokio::test]
async fn test_read_only_never_reaches_transport() {
    let (device, mut pac) = setup();

    for name in ["aiTemp", "diSwitch", "utRuntime", "dtDelay"] {
        let err = pac.set(name, &json!(1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadOnly, "{}", name);
    }
    assert_eq!(device.call_count(), 0);
    assert_eq!(pac.request_count(), 0);
}

#[tokio::test]
async fn test_resolution_failures_never_reach_transport() {
    let (device, mut pac) = setup();

    assert_eq!(pac.get("Level").await.unwrap_err().kind(), ErrorKind::NoPrefix);
    assert_eq!(pac.get("qLevel").await.unwrap_err().kind(), ErrorKind::UnknownPrefix);
    assert_eq!(
        pac.set("iCount", &json!(1.25)).await.unwrap_err().kind(),
        ErrorKind::InvalidValue
    );
    assert_eq!(device.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_variable() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "iCount", json!(1));

    let err = pac.get("iMissing").await.unwrap_err();
    assert_eq!(err, PacError::UnknownVariable("iMissing".to_string()));
}

#[tokio::test]
async fn test_failed_bulk_fetch_is_not_cached() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "iCount", json!(7));
    device.fail("GET", INT32S, 503);

    let err = pac.get("iCount").await.unwrap_err();
    assert_eq!(
        err,
        PacError::RemoteError {
            status: 503,
            method: "GET".to_string(),
            url: format!("memory://pac{}", INT32S),
        }
    );

    device.heal();
    assert_eq!(pac.get("iCount").await.unwrap(), Value::Integer(7));
    assert_eq!(device.count("GET", INT32S), 2);
}

#[tokio::test]
async fn test_failed_write_leaves_cache_untouched() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "iCount", json!(7));
    pac.get("iCount").await.unwrap();

    device.fail("POST", format!("{}/iCount", INT32S), 500);
    let err = pac.set("iCount", &json!(8)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteError);
    assert_eq!(pac.get("iCount").await.unwrap(), Value::Integer(7));
}

#[tokio::test]
async fn test_remote_errors_reach_error_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errors.log");
    let device = Arc::new(MemoryTransport::default());
    let config = config().with_log(LogConfig {
        sink: LogSink::File(path.clone()),
        format: LogFormat::Text,
    });
    let mut pac = PacController::with_transport(config, device.clone()).unwrap();

    pac.get("iCount").await.unwrap_err();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains(&format!("GET memory://pac{} -> 404", INT32S)));
}

#[tokio::test]
async fn test_blank_parameters() {
    let device = Arc::new(MemoryTransport::default());
    for config in [
        ControllerConfig::new("", "kid", "secret"),
        ControllerConfig::new("pac", "", "secret"),
        ControllerConfig::new("pac", "kid", ""),
    ] {
        let err = PacController::with_transport(config, device.clone())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::BlankParameter);
    }
}

#[tokio::test]
async fn test_eager_load_reads_metadata() {
    let device = Arc::new(MemoryTransport::default());
    device.set_device_info(json!({"controllerType": "groov EPIC PR1"}));
    device.set_strategy_info(json!({"strategyName": "Plant"}));

    let pac = PacController::connect_with(config().with_eager_load(true), device.clone())
        .await
        .unwrap();
    assert_eq!(pac.request_count(), 2);
    assert_eq!(
        pac.device().unwrap()["controllerType"],
        json!("groov EPIC PR1")
    );
    assert_eq!(pac.strategy().unwrap()["strategyName"], json!("Plant"));

    let lazy = PacController::connect_with(config(), device.clone())
        .await
        .unwrap();
    assert_eq!(lazy.request_count(), 0);
    assert!(lazy.device().is_none());
}

#[tokio::test]
async fn test_list_filters_by_category() {
    let (device, mut pac) = setup();
    device.insert_scalar(Category::Integer, "iB", json!(2));
    device.insert_scalar(Category::Integer, "bFlag", json!(1));
    device.insert_scalar(Category::Integer, "iA", json!(1));

    assert_eq!(pac.list(Category::Integer).await.unwrap(), vec!["iA", "iB"]);
    assert_eq!(pac.list(Category::BooleanScalar).await.unwrap(), vec!["bFlag"]);
    assert_eq!(device.count("GET", INT32S), 1);

    let err = pac.list(Category::IntegerTable).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[tokio::test]
async fn test_custom_prefix_table() {
    let device = Arc::new(MemoryTransport::default());
    device.insert_scalar(Category::Integer, "nCount", json!(3));
    let mut pac =
        PacController::with_transport(config().with_prefix("n", Category::Integer), device.clone())
            .unwrap();

    assert_eq!(pac.get("nCount").await.unwrap(), Value::Integer(3));
    assert_eq!(pac.requests()[0].to_string(), format!("GET {}", INT32S));
    assert_eq!(pac.url(INT32S), format!("memory://pac{}", INT32S));
}
