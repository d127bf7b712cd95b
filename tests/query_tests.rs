// tests/query_tests.rs

use rolls_engine::{
    Evaluator, EvalError, QueryError, StoreError, Value,
    parser::{grammar, parse_logical},
    query,
    store::{InMemorySource, JsonStore},
};
use rstest::{fixture, rstest};
use serde_json::{Value as JsonValue, json};

type Store = JsonStore<InMemorySource>;

#[fixture]
fn store() -> Store {
    let people = vec![
        json!({ "id": 1, "name": "Fred Thimbleberry", "age": 23, "roles": [{ "title": "employee" }] }),
        json!({ "id": 2, "name": "Tim Burklebunny", "age": 45, "roles": [{ "title": "manager" }, { "title": "employee" }] }),
        json!({ "id": 3, "name": "Steve Forklemeyer", "age": 45, "roles": [{ "title": "employee" }] }),
    ];
    JsonStore::new(InMemorySource::new().with_collection("people", people))
}

fn ids(rows: &[JsonValue]) -> String {
    rows.iter()
        .map(|row| row["id"].to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn single(store: &Store, text: &str) -> JsonValue {
    let mut rows = query(store, text).unwrap();
    assert_eq!(rows.len(), 1, "{}", text);
    rows.remove(0)
}

// ============================================================================
// Whole queries
// ============================================================================

#[rstest]
fn test_kitchen_sink(store: Store) {
    let rows = query(
        &store,
        r#"
        SELECT {
            -- select a path
              $.name

            -- call a function with a custom name
            , isManager: any($.roles[?(@.title == 'manager')])

            -- another way to name a field
            , $.name AS 'the dudes name'

            -- selecting and filtering an array
            , $.roles[?(@.title == 'employee' || @.title == 'manager')]

            -- commented out
            --, $.age

            , utc()
        }
        FROM people
        KEYS 1, 2, 3
        WHERE starts($.name, 'Fred') OR starts($.name, 'Tim') OR starts($.name, 'Steve') AND 1=1
        ORDER BY $.name DESC
        LIMIT 2"#,
    )
    .unwrap();

    assert_eq!(rows.len(), 2);

    let tim = &rows[0];
    assert_eq!(tim["name"], "Tim Burklebunny");
    assert_eq!(tim["the dudes name"], "Tim Burklebunny");
    assert_eq!(tim["isManager"], true);
    assert_eq!(tim["roles"].as_array().map(Vec::len), Some(2));
    assert!(tim["utc"].is_string());
    assert!(tim.get("age").is_none());

    assert_eq!(rows[1]["name"], "Steve Forklemeyer");
    assert_eq!(rows[1]["isManager"], false);
}

#[rstest]
fn test_highest_ages_first(store: Store) {
    let rows = query(
        &store,
        "SELECT $.id FROM people ORDER BY $.age DESC, $.name LIMIT 2",
    )
    .unwrap();
    assert_eq!(ids(&rows), "3,2");
}

#[rstest]
fn test_no_source_yields_one_row(store: Store) {
    let row = single(&store, "SELECT utc()");
    assert!(row["utc"].is_string());
}

// ============================================================================
// SELECT
// ============================================================================

#[rstest]
#[case("name", "$.name")]
#[case("name0", r#"$.name AS "name0""#)]
#[case("name1", "$.name AS 'name1'")]
#[case("name2", "$.name AS name2")]
#[case("name3", "name3: $.name")]
#[case("name4", "'name4': $.name")]
#[case("name5", r#""name5": $.name"#)]
#[case("name6", "$.name as name6")]
fn test_select_names(store: Store, #[case] name: &str, #[case] expression: &str) {
    let row = single(&store, &format!("SELECT {{ {} }} FROM people KEYS 1", expression));
    assert_eq!(row[name], "Fred Thimbleberry");
}

#[rstest]
fn test_select_function_is_named_after_function(store: Store) {
    let row = single(
        &store,
        "SELECT any($.roles[?(@.title == 'manager')]) FROM people KEYS 1",
    );
    assert_eq!(row, json!({ "any": false }));
}

#[rstest]
fn test_select_literals_are_named_by_position(store: Store) {
    let row = single(&store, "SELECT 1, $.id, 'x'");
    assert_eq!(row, json!({ "0": 1, "2": "x" }));
}

#[rstest]
fn test_select_whole_document(store: Store) {
    let row = single(&store, "SELECT $ FROM people KEYS 3");
    assert_eq!(row["$"]["name"], "Steve Forklemeyer");
}

// ============================================================================
// KEYS / WHERE / ORDER BY / LIMIT
// ============================================================================

#[rstest]
#[case("1", "1")]
#[case("1,3", "1,3")]
#[case("1,2,3", "1,2,3")]
#[case("1,2,3", "'1','2','3'")]
#[case("", "4")]
fn test_keys(store: Store, #[case] expected: &str, #[case] keys: &str) {
    let rows = query(&store, &format!("SELECT $.id FROM people KEYS {}", keys)).unwrap();
    assert_eq!(ids(&rows), expected);
}

#[rstest]
#[case("1", "starts($.name, 'Fred')")]
#[case("1", "starts($.name, 'Fred') OR starts($.name, 'Satan')")]
#[case("1,3", "starts($.name, 'Fred') OR starts($.name, 'Steve')")]
#[case("2", "starts($.name, 'Tim') AND $.age > 18")]
#[case("2,3", "NOT starts($.name, 'Fred')")]
#[case("2", "any($.roles[?(@.title == 'manager')])")]
#[case("2,3", "$.age >= 45")]
#[case("1,2,3", "$.missing != 1")]
#[case("", "$.missing = null")]
#[case("1,3", "($.age < 30 OR $.id = 3)")]
fn test_where(store: Store, #[case] expected: &str, #[case] condition: &str) {
    let rows = query(&store, &format!("SELECT $.id FROM people WHERE {}", condition)).unwrap();
    assert_eq!(ids(&rows), expected);
}

#[rstest]
#[case("1,2,3", "$.id")]
#[case("1,2,3", "$.id ASC")]
#[case("3,2,1", "$.id DESC")]
#[case("1,3,2", "$.age, $.name")]
#[case("1,2,3", "$.age, $.name DESC")]
#[case("3,2,1", "$.age DESC, $.name")]
#[case("2,3,1", "$.age DESC, $.name DESC")]
#[case("1,3,2", "$.roles[0].title")]
fn test_order_by(store: Store, #[case] expected: &str, #[case] order: &str) {
    let rows = query(&store, &format!("SELECT $.id FROM people ORDER BY {}", order)).unwrap();
    assert_eq!(ids(&rows), expected);
}

#[rstest]
#[case("1,3,2", "$.nickname")]
#[case("1,3,2", "$.nickname ASC, $.id")]
#[case("3,1,2", "$.nickname, $.id DESC")]
#[case("2,1,3", "$.nickname DESC")]
fn test_order_by_null_keys_first(#[case] expected: &str, #[case] order: &str) {
    let people = vec![
        json!({ "id": 1, "name": "Fred" }),
        json!({ "id": 2, "name": "Tim", "nickname": "Timbo" }),
        json!({ "id": 3, "name": "Steve", "nickname": null }),
    ];
    let store = JsonStore::new(InMemorySource::new().with_collection("people", people));
    let rows = query(&store, &format!("SELECT $.id FROM people ORDER BY {}", order)).unwrap();
    assert_eq!(ids(&rows), expected);
}

#[rstest]
fn test_where_parenthesis_wraps_whole_condition(store: Store) {
    let rows = query(
        &store,
        "SELECT $.id FROM people WHERE $.age > 0 AND ($.age < 30 OR $.id = 3)",
    )
    .unwrap();
    assert_eq!(ids(&rows), "1,3");

    let err = query(
        &store,
        "SELECT $.id FROM people WHERE ($.age < 30 OR $.id = 3) AND $.age > 0",
    )
    .unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
}

#[rstest]
#[case("SELECT $.id FROM people WHERE")]
#[case("SELECT $.id FROM people WHERE $.age > 18 AND")]
#[case("SELECT $.id FROM people WHERE $.id = 1 OR")]
fn test_malformed_where_fails_to_parse(store: Store, #[case] text: &str) {
    assert!(matches!(query(&store, text), Err(QueryError::Parse(_))));
}

#[rstest]
#[case(1, "1")]
#[case(2, "2")]
#[case(3, "10")]
#[case(0, "0")]
fn test_limit(store: Store, #[case] expected: usize, #[case] limit: &str) {
    let rows = query(&store, &format!("SELECT $ FROM people LIMIT {}", limit)).unwrap();
    assert_eq!(rows.len(), expected);
}

// ============================================================================
// Aggregates
// ============================================================================

#[rstest]
#[case(3, "COUNT($)")]
#[case(113, "SUM($.age)")]
#[case(23, "MIN($.age)")]
#[case(45, "MAX($.age)")]
fn test_aggregates(store: Store, #[case] expected: i64, #[case] expression: &str) {
    let row = single(&store, &format!("SELECT {} as 'X' FROM people", expression));
    assert_eq!(row["X"], expected);
}

#[rstest]
fn test_average(store: Store) {
    let row = single(&store, "SELECT AVG($.age) AS X FROM people");
    let average = row["X"].as_f64().unwrap();
    assert!((average - 37.67).abs() < 0.01, "{}", average);
}

#[rstest]
fn test_aggregates_over_nothing_are_zero(store: Store) {
    let row = single(
        &store,
        "SELECT COUNT($), SUM($.age), MIN($.age), MAX($.age), AVG($.age) FROM people WHERE $.age > 100",
    );
    assert_eq!(
        row,
        json!({ "Count($)": 0, "Sum(age)": 0, "Min(age)": 0, "Max(age)": 0, "Avg(age)": 0 })
    );
}

#[rstest]
fn test_aggregate_names(store: Store) {
    let row = single(
        &store,
        "SELECT total: COUNT($), SUM($.age) AS 'years' FROM people KEYS 1, 2",
    );
    assert_eq!(row, json!({ "total": 2, "years": 68 }));
}

// ============================================================================
// Functions
// ============================================================================

#[rstest]
#[case("A", "SUB('ABC', 0, 1)")]
#[case("AB", "SUB('ABC', 0, 2)")]
#[case("BC", "SUB('ABC', 1, 2)")]
#[case("BC", "SUB('ABC', 1)")]
#[case("C", "SUB('ABC', 2, 1)")]
#[case("C", "SUB('ABC', 2)")]
#[case("A", "RTRIM('A  ')")]
#[case("  A", "RTRIM('  A  ')")]
#[case("A", "LTRIM('  A')")]
#[case("A  ", "LTRIM('  A  ')")]
#[case("A", "TRIM('  A  ')")]
#[case("TEST", "UPPER('Test')")]
#[case("test", "LOWER('Test')")]
#[case("t,e,s,t", "JOIN(',', SPLIT('t e s t', ' '))")]
#[case("t", "FIRST(SPLIT('t e s t', ' '))")]
fn test_text_functions(store: Store, #[case] expected: &str, #[case] expression: &str) {
    let row = single(&store, &format!("SELECT {} as 'X' ", expression));
    assert_eq!(row["X"], expected);
}

#[rstest]
#[case("FRED THIMBLEBERRY", "UPPER($.name)")]
#[case("fred thimbleberry", "LOWER($.name)")]
#[case("Fr,d Thimbl,b,rry", "JOIN(',', SPLIT($.name, 'e'))")]
#[case("Fred", "FIRST(SPLIT($.name, ' '))")]
#[case("Thimbleberry", "LAST(SPLIT($.name, ' '))")]
fn test_functions_on_documents(store: Store, #[case] expected: &str, #[case] expression: &str) {
    let row = single(&store, &format!("SELECT {} as 'X' FROM people KEYS 1", expression));
    assert_eq!(row["X"], expected);
}

#[rstest]
#[case(2008, "YEAR('2008-10-01T17:04:32')")]
#[case(2020, "YEAR('2020-10-01T17:04:32')")]
#[case(11, "MONTH('2010-11-01T17:04:32')")]
#[case(1, "DAY('2010-11-01T17:04:32')")]
#[case(17, "HOUR('2010-11-01T17:04:32')")]
#[case(4, "MINUTE('2010-11-01T17:04:32')")]
#[case(32, "SECOND('2010-11-01T17:04:32')")]
#[case(-1, "YEAR('yesterday')")]
fn test_date_functions(store: Store, #[case] expected: i64, #[case] expression: &str) {
    let row = single(&store, &format!("SELECT {} as 'X' ", expression));
    assert_eq!(row["X"], expected);
}

#[rstest]
fn test_store_functions(store: Store) {
    let store = store.with_function("double", |_, args| {
        let n = args.first().map(Value::to_number).unwrap_or_default();
        Ok(Value::Number(n * rust_decimal::Decimal::TWO))
    });
    let row = single(&store, "SELECT DOUBLE($.age) AS twice FROM people KEYS 1");
    assert_eq!(row, json!({ "twice": 46 }));
}

// ============================================================================
// Failures
// ============================================================================

#[rstest]
fn test_unknown_function_fails(store: Store) {
    let err = query(&store, "SELECT frobnicate($.name) FROM people").unwrap_err();
    assert!(matches!(
        err,
        QueryError::Eval(EvalError::Store(StoreError::NotImplemented(name))) if name == "frobnicate"
    ));
}

#[rstest]
fn test_unknown_source_fails_before_rows(store: Store) {
    let err = Evaluator::new(&store).run("SELECT $ FROM animals").err().unwrap();
    assert!(matches!(
        err,
        QueryError::Eval(EvalError::Store(StoreError::UnknownSource(_)))
    ));
}

#[rstest]
fn test_parse_failure(store: Store) {
    let err = query(&store, "SELECT $.name FROM people LIMIT x").unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
    assert_eq!(err.to_string(), "Parse error: expected Number at position 32");
}

#[rstest]
fn test_rows_fail_lazily(store: Store) {
    let mut rows = Evaluator::new(&store)
        .run("SELECT $.id FROM people WHERE $.id = 1 OR nope()")
        .unwrap();
    assert_eq!(rows.next().unwrap().unwrap(), json!({ "id": 1 }));
    assert!(rows.next().unwrap().is_err());
}

// ============================================================================
// Conditions
// ============================================================================

#[rstest]
#[case(true, "1 = 1")]
#[case(false, "1 = 2")]
#[case(true, "1 != 2")]
#[case(false, "1 != 1")]
#[case(true, "2 > 1")]
#[case(false, "1 > 2")]
#[case(true, "2 >= 2")]
#[case(false, "1 >= 2")]
#[case(true, "2 >= 1")]
#[case(true, "1 < 2")]
#[case(false, "2 < 1")]
#[case(true, "1 <= 2")]
#[case(true, "2 <= 2")]
#[case(false, "2 <= 1")]
#[case(true, "'ted' = 'ted'")]
#[case(false, "'ted' = 'tim'")]
#[case(true, "true = true")]
#[case(true, "false = false")]
#[case(false, "true = false")]
fn test_compare(store: Store, #[case] expected: bool, #[case] expression: &str) {
    let (_, compare) = grammar().compare.parse_str(expression).unwrap();
    let actual = Evaluator::new(&store).eval_compare(&compare, &json!({})).unwrap();

    assert_eq!(actual, expected);
    assert_eq!(compare.to_string(), expression);
}

#[rstest]
#[case(true, "(1 = 1)")]
#[case(false, "(1 = 2)")]
#[case(true, "(true)")]
#[case(true, "(NOT 1 = 2)")]
#[case(true, "(NOT false)")]
#[case(true, "(1 = 1 AND 2 = 2)")]
#[case(false, "(1 = 1 AND 2 = 3)")]
#[case(true, "(1 = 2 OR 1 = 1)")]
#[case(true, "(1 = 2 OR 1 = 3 OR 1 = 1)")]
#[case(true, "(('a' = 'b' AND 1 = 2) OR (1 = 1 AND 'a' = 'a'))")]
#[case(true, "((true AND false) OR (true AND true))")]
#[case(false, "(NOT (true OR false))")]
fn test_logical(store: Store, #[case] expected: bool, #[case] expression: &str) {
    let logical = parse_logical(expression).unwrap();
    let actual = Evaluator::new(&store).eval_logical(&logical, &json!({})).unwrap();

    assert_eq!(actual, expected);
    assert_eq!(logical.to_string(), expression);
}

#[rstest]
fn test_logical_short_circuits(store: Store) {
    let evaluator = Evaluator::new(&store);
    let doc = json!({});

    let logical = parse_logical("1 = 1 OR nope()").unwrap();
    assert!(evaluator.eval_logical(&logical, &doc).unwrap());

    let logical = parse_logical("1 = 2 AND nope()").unwrap();
    assert!(!evaluator.eval_logical(&logical, &doc).unwrap());

    let logical = parse_logical("1 = 2 OR nope()").unwrap();
    assert!(evaluator.eval_logical(&logical, &doc).is_err());
}
