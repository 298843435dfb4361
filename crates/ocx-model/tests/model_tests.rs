use chrono::{NaiveDate, Utc};
use ocx_model::{CapTable, Decimal, Model, ModelError, RatioError, RoundingType};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn subject() -> Model {
    Model::new(Utc::now().date_naive(), Utc::now())
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn consume(model: &mut Model, value: Value) {
    model.consume_value(value).unwrap();
}

fn fake_stakeholder(id: &str) -> Value {
    json!({
        "id": id,
        "object_type": "STAKEHOLDER",
        "name": { "legal_name": format!("Whodat {id}") },
    })
}

fn fake_common_stock_class(id: &str, board_approved: Option<&str>) -> Value {
    json!({
        "id": id,
        "object_type": "STOCK_CLASS",
        "name": format!("{id} Common Stock"),
        "board_approval_date": board_approved,
        "class_type": "COMMON",
    })
}

fn fake_preferred_stock_class(
    id: &str,
    converts: Option<(&str, &str)>,
    board_approved: Option<&str>,
) -> Value {
    let conversion_rights = match converts {
        Some((from, to)) => json!([{
            "conversion_mechanism": {
                "type": "RATIO_CONVERSION",
                "ratio": { "numerator": to, "denominator": from },
            }
        }]),
        None => json!([]),
    };
    json!({
        "id": id,
        "object_type": "STOCK_CLASS",
        "name": format!("{id} Preferred Stock"),
        "board_approval_date": board_approved,
        "class_type": "PREFERRED",
        "conversion_rights": conversion_rights,
    })
}

fn fake_stock_plan(id: &str, board_approved: Option<&str>) -> Value {
    json!({
        "id": id,
        "object_type": "STOCK_PLAN",
        "plan_name": id,
        "board_approval_date": board_approved,
        "current_shares_reserved": "1000000",
    })
}

fn fake_stock_issuance(security_id: &str, stakeholder_id: &str, stock_class_id: &str, quantity: &str) -> Value {
    json!({
        "security_id": security_id,
        "stakeholder_id": stakeholder_id,
        "stock_class_id": stock_class_id,
        "quantity": quantity,
        "object_type": "TX_STOCK_ISSUANCE",
    })
}

#[test]
fn creation_keeps_timestamps() {
    let as_of = NaiveDate::from_ymd_opt(2022, 7, 14).unwrap();
    let generated = Utc::now();
    let model = Model::new(as_of, generated);
    assert_eq!(model.as_of_date(), as_of);
    assert_eq!(model.generated_at(), generated);
    assert_eq!(CapTable::as_of_date(&model), Some(as_of));
}

#[test]
fn issuer_prefers_dba_over_legal_name() {
    let mut model = subject();
    consume(&mut model, json!({ "object_type": "ISSUER", "legal_name": "Fred Inc." }));
    assert_eq!(model.issuer_name(), "Fred Inc.");

    consume(
        &mut model,
        json!({ "object_type": "ISSUER", "legal_name": "Fred Inc.", "dba": "Fred" }),
    );
    assert_eq!(model.issuer_name(), "Fred");

    consume(&mut model, json!({ "object_type": "ISSUER" }));
    assert_eq!(model.issuer_name(), "Fred");
}

#[test]
fn stakeholders_empty_case() {
    assert!(subject().stakeholders().is_empty());
}

#[test]
fn multiple_stakeholders() {
    let mut model = subject();
    consume(&mut model, fake_stakeholder("001"));
    consume(&mut model, fake_stakeholder("002"));

    let names: Vec<_> = model
        .stakeholders()
        .iter()
        .map(|s| (s.id.as_str(), s.display_name.as_str()))
        .collect();
    assert_eq!(names, [("001", "Whodat 001"), ("002", "Whodat 002")]);
}

#[test]
fn duplicate_stakeholder_ids_are_both_kept() {
    let mut model = subject();
    consume(&mut model, fake_stakeholder("001"));
    consume(&mut model, fake_stakeholder("001"));
    assert_eq!(model.stakeholders().len(), 2);
}

#[test]
fn stakeholder_without_name_gets_placeholder() {
    let mut model = subject();
    consume(&mut model, json!({ "id": "x", "object_type": "STAKEHOLDER" }));
    assert_eq!(model.stakeholders()[0].display_name, " - ");
}

#[test]
fn stock_classes_empty_case() {
    assert!(subject().stock_classes().is_empty());
}

#[test]
fn common_stock() {
    let mut model = subject();
    consume(&mut model, fake_common_stock_class("Class A", None));
    let class = &model.stock_classes()[0];
    assert_eq!(class.id, "Class A");
    assert_eq!(class.display_name, "Class A Common Stock");
    assert!(!class.is_preferred);
    assert_eq!(class.conversion_ratio.to_f64(), 1.0);
}

#[test]
fn preferred_stock_without_conversion_rights() {
    let mut model = subject();
    consume(&mut model, fake_preferred_stock_class("Series Seed", None, None));
    let class = &model.stock_classes()[0];
    assert!(class.is_preferred);
    assert!(class.conversion_ratio.is_one());
}

#[test]
fn preferred_stock_with_conversion_rights() {
    let mut model = subject();
    consume(
        &mut model,
        fake_preferred_stock_class("Series A", Some(("3", "4")), None),
    );
    let class = &model.stock_classes()[0];
    assert!(class.is_preferred);
    assert_eq!(model.stock_class_conversion_ratio(class), 1.3333333333333333);
    assert_eq!(class.rounding_type, RoundingType::Nearest);
}

#[test]
fn ratio_that_rounds_to_one_does_not_convert() {
    let mut model = subject();
    consume(
        &mut model,
        fake_preferred_stock_class("Series Seed", Some(("1", "1.0000000000000000001")), None),
    );
    consume(
        &mut model,
        fake_preferred_stock_class("Series A", Some(("1", "2")), None),
    );
    let classes = model.stock_classes();
    let seed = classes.iter().find(|c| c.id == "Series Seed").unwrap();
    let series_a = classes.iter().find(|c| c.id == "Series A").unwrap();

    assert!(!seed.conversion_ratio.is_one());
    assert_eq!(seed.conversion_ratio.denominator(), Decimal::ONE);
    assert_eq!(model.stock_class_conversion_ratio(seed), 1.0);
    assert!(!model.stock_class_converts(seed));

    assert_eq!(series_a.conversion_ratio.numerator(), Decimal::from(2));
    assert!(model.stock_class_converts(series_a));
}

#[test]
fn non_ratio_mechanism_defaults_to_one() {
    let mut model = subject();
    consume(
        &mut model,
        json!({
            "id": "safe",
            "object_type": "STOCK_CLASS",
            "name": "Series B",
            "class_type": "PREFERRED",
            "conversion_rights": {
                "conversion_mechanism": {
                    "type": "FIXED_AMOUNT_CONVERSION",
                    "ratio": { "numerator": "2", "denominator": "1" },
                },
            },
        }),
    );
    consume(
        &mut model,
        json!({
            "id": "null-ratio",
            "object_type": "STOCK_CLASS",
            "name": "Series C",
            "class_type": "PREFERRED",
            "conversion_rights": [{
                "conversion_mechanism": { "type": "RATIO_CONVERSION", "ratio": null },
            }],
        }),
    );
    assert!(model.stock_classes().iter().all(|c| c.conversion_ratio.is_one()));
}

#[test]
fn rounding_type_is_read_from_the_conversion_mechanism() {
    let mut model = subject();
    consume(
        &mut model,
        json!({
            "id": "pref",
            "object_type": "STOCK_CLASS",
            "name": "Series A",
            "class_type": "PREFERRED",
            "conversion_rights": [{
                "conversion_mechanism": {
                    "type": "RATIO_CONVERSION",
                    "ratio": { "numerator": "7", "denominator": "10" },
                    "rounding_type": "FLOOR",
                },
            }],
        }),
    );
    assert_eq!(model.stock_classes()[0].rounding_type, RoundingType::Floor);
}

#[test]
fn malformed_ratio_is_an_error() {
    let mut model = subject();
    let err = model
        .consume_value(fake_preferred_stock_class("Broken", Some(("0", "4")), None))
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::ConversionRatio {
            ref stock_class_id,
            source: RatioError::ZeroDenominator,
        } if stock_class_id == "Broken"
    ));
    assert!(model.stock_classes().is_empty());
}

#[test]
fn stock_class_sort_order() {
    let mut model = subject();
    let today = today();

    let records = [
        fake_preferred_stock_class("004", None, None),
        fake_preferred_stock_class("003", None, Some(&today)),
        fake_preferred_stock_class("002", None, Some(&today)),
        fake_preferred_stock_class("001", None, Some("2010-01-01")),
        fake_common_stock_class("Def", None),
        fake_common_stock_class("Cde", None),
        fake_common_stock_class("Bcd", Some(&today)),
        fake_common_stock_class("Abc", Some("2011-01-01")),
    ];
    for record in records {
        consume(&mut model, record);
    }

    let ids: Vec<_> = model.stock_classes().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.join(" "), "Abc Bcd Cde Def 001 002 003 004");
}

#[test]
fn stock_plans_empty_case() {
    assert!(subject().stock_plans().is_empty());
}

#[test]
fn model_stock_plan() {
    let mut model = subject();
    consume(&mut model, fake_stock_plan("Stock Plan", None));
    let plan = &model.stock_plans()[0];
    assert_eq!(plan.id, "Stock Plan");
    assert_eq!(plan.plan_name, "Stock Plan");
    assert_eq!(plan.initial_shares_reserved, Decimal::from(1_000_000));
}

#[test]
fn stock_plans_keep_consumption_order() {
    let mut model = subject();
    let today = today();
    consume(&mut model, fake_stock_plan("Stock Plan Z", Some("2011-01-01")));
    consume(&mut model, fake_stock_plan("Stock Plan B", Some(&today)));
    consume(&mut model, fake_stock_plan("Stock Plan C", None));
    consume(&mut model, fake_stock_plan("Stock Plan D", None));

    let ids: Vec<_> = model.stock_plans().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids.join(" "),
        "Stock Plan Z Stock Plan B Stock Plan C Stock Plan D"
    );
}

#[test]
fn stakeholder_stock_holdings_simple_case() {
    let mut model = subject();
    consume(&mut model, fake_common_stock_class("Fake", None));
    consume(&mut model, fake_stakeholder("joe"));
    consume(&mut model, fake_stock_issuance("yup", "joe", "Fake", "100"));

    let holdings =
        model.stakeholder_stock_holdings(&model.stakeholders()[0], &model.stock_classes()[0]);
    assert_eq!(holdings, Decimal::from(100));
}

#[test]
fn holdings_without_transactions_are_zero() {
    let mut model = subject();
    consume(&mut model, fake_common_stock_class("Fake", None));
    consume(&mut model, fake_stakeholder("joe"));
    consume(&mut model, fake_stakeholder("ann"));
    consume(&mut model, fake_stock_issuance("yup", "joe", "Fake", "100"));

    let ann = &model.stakeholders()[1];
    assert_eq!(
        model.stakeholder_stock_holdings(ann, &model.stock_classes()[0]),
        Decimal::ZERO
    );
}

#[test]
fn cancellation_arriving_before_issuance_is_counted() {
    let mut model = subject();
    consume(
        &mut model,
        json!({
            "object_type": "TX_STOCK_CANCELLATION",
            "security_id": "s1",
            "quantity": "40",
        }),
    );
    consume(&mut model, fake_common_stock_class("Fake", None));
    consume(&mut model, fake_stakeholder("joe"));
    consume(&mut model, fake_stock_issuance("s1", "joe", "Fake", "100"));
    consume(&mut model, fake_stock_issuance("s2", "joe", "Fake", "5"));

    let holdings =
        model.stakeholder_stock_holdings(&model.stakeholders()[0], &model.stock_classes()[0]);
    assert_eq!(holdings, Decimal::from(65));
}

#[test]
fn unknown_object_types_are_ignored() {
    let mut model = subject();
    consume(&mut model, json!({ "object_type": "VESTING_TERMS", "id": "v" }));
    consume(&mut model, json!({ "id": "no-type" }));
    consume(&mut model, json!(42));
    assert!(model.stakeholders().is_empty());
    assert!(model.stock_classes().is_empty());
}

#[test]
fn stock_plan_holdings_and_remaining_pool() {
    let mut model = subject();
    consume(&mut model, fake_stakeholder("joe"));
    consume(&mut model, fake_stakeholder("ann"));
    consume(&mut model, fake_stock_plan("plan", None));
    for (security, holder, quantity) in [("o1", "joe", "1000"), ("o2", "ann", "500")] {
        consume(
            &mut model,
            json!({
                "object_type": "TX_EQUITY_COMPENSATION_ISSUANCE",
                "security_id": security,
                "stakeholder_id": holder,
                "stock_plan_id": "plan",
                "quantity": quantity,
            }),
        );
    }
    consume(
        &mut model,
        json!({
            "object_type": "TX_EQUITY_COMPENSATION_CANCELLATION",
            "security_id": "o2",
            "quantity": "200",
        }),
    );
    consume(
        &mut model,
        json!({
            "object_type": "TX_EQUITY_COMPENSATION_EXERCISE",
            "security_id": "o1",
            "quantity": "100",
        }),
    );

    let plan = &model.stock_plans()[0];
    let joe = &model.stakeholders()[0];
    let ann = &model.stakeholders()[1];
    assert_eq!(model.stakeholder_stock_plan_holdings(joe, plan), Decimal::from(900));
    assert_eq!(model.stakeholder_stock_plan_holdings(ann, plan), Decimal::from(300));
    assert_eq!(
        model.options_remaining_for_issuance(plan),
        Decimal::from(1_000_000 - 1_000 - 300)
    );
}
