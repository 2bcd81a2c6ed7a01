use workload_inspector::{classify_qos, observed_qos, QosClass};

mod helpers;
use helpers::{live_pod, resource};

#[test]
fn test_fully_declared_containers_are_guaranteed() {
    let resources = vec![
        resource("128Mi", "250m", "256Mi", "500m"),
        resource("64Mi", "100m", "64Mi", "100m"),
    ];
    assert_eq!(classify_qos(&resources), QosClass::Guaranteed);
}

#[test]
fn test_first_container_missing_a_quantity_is_burstable() {
    // Later, fully declared, containers are never looked at
    for missing in 0..4 {
        let mut quantities = ["128Mi", "250m", "256Mi", "500m"];
        quantities[missing] = "0";
        let resources = vec![
            resource(quantities[0], quantities[1], quantities[2], quantities[3]),
            resource("64Mi", "100m", "64Mi", "100m"),
        ];
        assert_eq!(classify_qos(&resources), QosClass::Burstable, "missing index {}", missing);
    }
}

#[test]
fn test_zero_memory_request_before_guaranteed_container() {
    let resources = vec![
        resource("0", "250m", "256Mi", "500m"),
        resource("64Mi", "100m", "64Mi", "100m"),
    ];
    assert_eq!(classify_qos(&resources), QosClass::Burstable);
}

#[test]
fn test_unset_quantities_count_as_zero() {
    let resources = vec![resource("", "", "", "")];
    assert_eq!(classify_qos(&resources), QosClass::Burstable);
}

#[test]
fn test_no_containers_is_best_effort() {
    assert_eq!(classify_qos(&[]), QosClass::BestEffort);
}

#[test]
fn test_observed_qos_reads_live_pod_status() {
    let pods = vec![live_pod("Running", Some("Burstable"))];
    assert_eq!(observed_qos(&pods), QosClass::Burstable);

    let pods = vec![live_pod("Pending", None), live_pod("Running", Some("Guaranteed"))];
    assert_eq!(observed_qos(&pods), QosClass::Guaranteed);
}

#[test]
fn test_observed_qos_without_live_pods() {
    assert_eq!(observed_qos(&[]), QosClass::NoActivePods);

    let pods = vec![live_pod("Succeeded", Some("BestEffort")), live_pod("Failed", Some("Burstable"))];
    assert_eq!(observed_qos(&pods), QosClass::NoActivePods);
}
