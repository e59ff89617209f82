use crate::error::SimError;
use crate::factory::{ActivityId, ActivityKey, Needs, ProductIndex};
use crate::plan::{PLAN_SCHEMA_VERSION, ProductionPlan};
use crate::sim::SimTime;
use serde_json::json;

fn base() -> serde_json::Value {
    json!({
        "schema_version": PLAN_SCHEMA_VERSION,
        "name": "January",
        "factory": { "name": "Plant", "resource_names": ["Filter", "Mixer"], "capacity": [1, 2] },
        "products": [
            {
                "id": 7,
                "name": "Enzyme",
                "activities": [
                    { "id": 0, "processing_time": 4, "needs": [1, 0] },
                    { "id": 1, "processing_time": 5, "needs": [0, 1],
                      "incompatible_with": [{ "product_id": 7, "activity_id": 0 }] }
                ],
                "temporal_relations": [
                    { "predecessor": 0, "successor": 1, "min_lag": 1, "max_lag": 10 }
                ]
            }
        ],
        "product_ids": [7, 7],
        "deadlines": [8, 20],
        "earliest_start": [
            { "product_index": 1, "activity_id": 0, "earliest_start": 3 }
        ]
    })
}

fn load(v: &serde_json::Value) -> Result<ProductionPlan, SimError> {
    ProductionPlan::from_json_str(&v.to_string())
}

#[test]
fn parses_catalog_and_instantiates_products() {
    let plan = load(&base()).expect("valid plan");
    assert_eq!(plan.name(), "January");
    assert_eq!(plan.factory_name(), "Plant");
    assert_eq!(plan.resource_names(), ["Filter", "Mixer"]);
    assert_eq!(plan.capacity(), [1, 2]);
    assert_eq!(plan.products().len(), 2);
    assert_eq!(plan.activity_count(), 4);

    let second = plan.product(ProductIndex(1)).expect("product 1");
    assert_eq!(second.product_id, 7);
    assert_eq!(second.deadline, SimTime(20));

    let a1 = plan.activity(ActivityKey::new(1, 1)).expect("activity");
    assert_eq!(a1.processing_time, SimTime(5));
    assert_eq!(a1.needs, Needs(vec![0, 1]));
    assert_eq!(a1.predecessors.len(), 1);
    assert_eq!(a1.predecessors[0].activity, ActivityId(0));
    assert_eq!(a1.predecessors[0].relation.min_lag, 1);
    assert_eq!(a1.predecessors[0].relation.max_lag, Some(10));

    let es = plan.earliest_start();
    assert_eq!(es.len(), 1);
    assert_eq!(es[0].key, ActivityKey::new(1, 0));
    assert_eq!(es[0].at, SimTime(3));
}

#[test]
fn incompatibility_expands_to_every_instance() {
    let plan = load(&base()).expect("valid plan");
    let a = plan.activity(ActivityKey::new(0, 1)).expect("activity");
    assert_eq!(
        a.incompatible_with,
        vec![ActivityKey::new(0, 0), ActivityKey::new(1, 0)]
    );
}

#[test]
fn optional_sections_default() {
    let mut v = base();
    v.as_object_mut().expect("object").remove("earliest_start");
    v["products"][0]["activities"][1]
        .as_object_mut()
        .expect("object")
        .remove("incompatible_with");
    v["products"][0]["temporal_relations"][0] = json!({ "predecessor": 0, "successor": 1 });
    let plan = load(&v).expect("valid plan");
    assert!(plan.earliest_start().is_empty());
    let a = plan.activity(ActivityKey::new(0, 1)).expect("activity");
    assert!(a.incompatible_with.is_empty());
    assert_eq!(a.predecessors[0].relation.min_lag, 0);
    assert_eq!(a.predecessors[0].relation.max_lag, None);
}

#[test]
fn rejects_wrong_schema_version() {
    let mut v = base();
    v["schema_version"] = json!(2);
    assert!(matches!(load(&v), Err(SimError::UnsupportedSchema(2))));
}

#[test]
fn rejects_needs_of_wrong_length() {
    let mut v = base();
    v["products"][0]["activities"][0]["needs"] = json!([1]);
    assert!(matches!(
        load(&v),
        Err(SimError::NeedsLength {
            product: 7,
            activity: 0,
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn rejects_shape_mismatches() {
    let mut v = base();
    v["factory"]["capacity"] = json!([1]);
    assert!(matches!(load(&v), Err(SimError::PlanShape { names: 2, capacities: 1 })));

    let mut v = base();
    v["deadlines"] = json!([8]);
    assert!(matches!(
        load(&v),
        Err(SimError::DeadlineCount { products: 2, deadlines: 1 })
    ));
}

#[test]
fn rejects_unknown_references() {
    let mut v = base();
    v["product_ids"] = json!([7, 9]);
    assert!(matches!(load(&v), Err(SimError::UnknownProduct(9))));

    let mut v = base();
    v["products"][0]["temporal_relations"][0]["successor"] = json!(4);
    assert!(matches!(
        load(&v),
        Err(SimError::UnknownActivity { product: 7, activity: 4 })
    ));

    let mut v = base();
    v["earliest_start"][0]["product_index"] = json!(5);
    assert!(matches!(
        load(&v),
        Err(SimError::UnknownProductIndex { product: 5, products: 2 })
    ));
}

#[test]
fn rejects_duplicate_activity_ids() {
    let mut v = base();
    v["products"][0]["activities"][1]["id"] = json!(0);
    assert!(matches!(
        load(&v),
        Err(SimError::DuplicateActivity { product: 7, activity: 0 })
    ));
}

#[test]
fn rejects_duplicate_catalog_products() {
    let mut v = base();
    let mut copy = v["products"][0].clone();
    copy["name"] = json!("Enzyme v2");
    copy["activities"][0]["processing_time"] = json!(9);
    v["products"].as_array_mut().expect("array").push(copy);
    assert!(matches!(load(&v), Err(SimError::DuplicateProduct(7))));
}

#[test]
fn rejects_max_lag_below_min_lag() {
    let mut v = base();
    v["products"][0]["temporal_relations"][0]["max_lag"] = json!(0);
    assert!(matches!(
        load(&v),
        Err(SimError::InvalidLag { min_lag: 1, max_lag: 0, .. })
    ));
}

#[test]
fn rejects_demanded_group_without_capacity() {
    let mut v = base();
    v["factory"]["capacity"] = json!([0, 2]);
    assert!(matches!(load(&v), Err(SimError::ZeroCapacity { group }) if group == "Filter"));
}

#[test]
fn malformed_json_is_a_json_error() {
    assert!(matches!(
        ProductionPlan::from_json_str("{ \"schema_version\": 1"),
        Err(SimError::Json(_))
    ));
}

#[test]
fn builder_round_trips_through_spec() {
    let mut b = ProductionPlan::builder("built");
    b.resource("A", 1);
    let p = b.product("P", 3);
    b.activity(p, 0, 2, vec![1]).earliest_start(ActivityKey::new(p, 0), 0);
    let raw = serde_json::to_string(b.spec()).expect("serialize");
    let plan = ProductionPlan::from_json_str(&raw).expect("valid plan");
    assert_eq!(plan.activity_count(), 1);
    assert_eq!(plan.products()[0].deadline, SimTime(3));
}
