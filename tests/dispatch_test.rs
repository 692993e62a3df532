use meterstream::Dashboard;
use meterstream::phase::aggregate;
use meterstream::value::Scalar;
use serde_json::json;

#[test]
fn null_reading_keeps_previous_phase_and_aggregates() {
    let mut dashboard = Dashboard::new();
    dashboard
        .apply_frame(r#"{"DeviceId":"m1","IEC61850":"VoltageL1","Value":"230.1"}"#)
        .unwrap();
    dashboard
        .apply_frame(r#"{"DeviceId":"m1","IEC61850":"VoltageL2","Value":null}"#)
        .unwrap();

    let state = &dashboard.readings()["m1"];
    assert_eq!(
        serde_json::to_value(state).unwrap(),
        json!({"VoltageL1": 230.1})
    );

    let voltage = aggregate(state, "Voltage", false);
    assert!(voltage.display);
    let shown: Vec<&str> = voltage.phases.iter().map(|p| p.display.as_str()).collect();
    assert_eq!(shown, vec!["230.10", "0.00", "0.00"]);
}

#[test]
fn both_device_keys_land_in_the_same_state() {
    let mut dashboard = Dashboard::new();
    dashboard.apply_value(&json!({"DeviceId": "7", "IEC61850": "PowerL1", "Value": 100}));
    dashboard.apply_value(&json!({"Device": 7, "IEC61850": "PowerL2", "Value": "50.5"}));

    let state = &dashboard.readings()["7"];
    assert_eq!(state.len(), 2);
    assert_eq!(
        aggregate(state, "Power", true).total_display.as_deref(),
        Some("150.50")
    );
}

#[test]
fn text_values_are_kept_but_not_summed() {
    let mut dashboard = Dashboard::new();
    dashboard.apply_value(&json!({"DeviceId": "m1", "IEC61850": "PowerL1", "Value": "n/a"}));
    dashboard.apply_value(&json!({"DeviceId": "m1", "IEC61850": "PowerL2", "Value": 2}));

    let state = &dashboard.readings()["m1"];
    assert_eq!(state.get("PowerL1"), Some(&Scalar::Text("n/a".to_string())));
    let power = aggregate(state, "Power", true);
    assert!(power.phases[0].present);
    assert_eq!(power.total_display.as_deref(), Some("2.00"));
    assert_eq!(dashboard.message(), "Received m1 / PowerL2: 2");
}

#[test]
fn status_batches_of_both_shapes_merge() {
    let mut dashboard = Dashboard::new();
    dashboard.apply_value(&json!({
        "ConfiguredMeters": [{"Id": 1, "Type": "SDM", "Status": "available"}]
    }));
    dashboard.apply_value(&json!({
        "Meters": [{"Device": 1, "Online": false, "Serial": "123"}]
    }));

    let status = &dashboard.statuses()["1"];
    assert_eq!(status.status(), Some("offline"));
    assert_eq!(status.get("Type"), Some(&json!("SDM")));
    assert_eq!(status.get("Serial"), Some(&json!("123")));
}

#[test]
fn firehose_batch_applies_in_order_as_one_snapshot() {
    let mut dashboard = Dashboard::new();
    let mut rx = dashboard.subscribe();
    let applied = dashboard.apply_value(&json!({"events": [
        {"timestamp": 1, "category": "all", "data": {"Device": "a", "IEC61850": "Power", "Value": 1}},
        {"timestamp": 2, "category": "all", "data": {"Device": "a", "IEC61850": "Power", "Value": 2}},
        {"timestamp": 3, "category": "all", "data": {"Meters": [{"Device": "a", "Online": true}]}}
    ]}));

    assert_eq!(applied, 3);
    assert!(rx.has_changed().unwrap());
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.readings["a"].numeric("Power"), 2.0);
    assert_eq!(snapshot.statuses["a"].status(), Some("online"));
    assert_eq!(snapshot.last_seen, Some(2));
    assert_eq!(snapshot.frames_applied, 1);
}
