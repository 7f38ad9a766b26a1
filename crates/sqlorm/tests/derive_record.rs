//! Tests for the `Record` derive macro.
//!
//! These run no statements; they check the generated metadata, positional
//! mapping, and error reporting.

use sqlorm::{OrmError, Query, Record, ScanRow, Value};

#[derive(Debug, Default, PartialEq, Record)]
#[orm(table = "passport_user")]
struct User {
    #[orm(primary_key)]
    user_id: i64,
    nickname: String,
    #[orm(column = "birth_year")]
    birth: i64,
    bio: Option<String>,
}

// No primary key: fields and all_fields are identical and primary_field is
// empty, which callers must handle.
#[derive(Debug, Default, Record)]
#[orm(table = "audit_log")]
struct AuditEntry {
    actor: String,
    action: String,
}

#[test]
fn metadata_reflects_attributes() {
    assert_eq!(User::TABLE, "passport_user");
    assert_eq!(User::primary_field(), "user_id");
    assert_eq!(User::fields(), &["nickname", "birth_year", "bio"]);
    assert_eq!(
        User::all_fields(),
        &["user_id", "nickname", "birth_year", "bio"]
    );
}

#[test]
fn missing_primary_key_yields_empty_name() {
    assert_eq!(AuditEntry::primary_field(), "");
    assert_eq!(AuditEntry::fields(), AuditEntry::all_fields());
}

#[test]
fn from_values_maps_positionally() {
    let user = User::from_values(vec![
        Value::Int(3),
        Value::Text("alice".into()),
        Value::Int(1990),
        Value::Null,
    ])
    .unwrap();
    assert_eq!(
        user,
        User {
            user_id: 3,
            nickname: "alice".into(),
            birth: 1990,
            bio: None,
        }
    );
}

#[test]
fn from_values_rejects_wrong_width() {
    let err = User::from_values(vec![Value::Int(1)]).unwrap_err();
    assert!(err.is_shape());
    assert!(err.to_string().contains("does not match field count 4"));
}

#[test]
fn decode_failure_names_the_column() {
    let err = User::from_values(vec![
        Value::Int(3),
        Value::Int(42),
        Value::Int(1990),
        Value::Null,
    ])
    .unwrap_err();
    match err {
        OrmError::Decode { column, .. } => assert_eq!(column, "nickname"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn check_columns_enforces_field_count() {
    let four: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    assert!(User::check_columns(&four).is_ok());
    let two: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
    assert!(User::check_columns(&two).unwrap_err().is_shape());
}

#[test]
fn value_round_trip() {
    let user = User {
        user_id: 9,
        nickname: "bob".into(),
        birth: 1985,
        bio: Some("hi".into()),
    };
    let back = User::from_values(user.to_values()).unwrap();
    assert_eq!(back, user);
    assert_eq!(
        user.insert_values(),
        vec![
            Value::Text("bob".into()),
            Value::Int(1985),
            Value::Text("hi".into())
        ]
    );
}

#[test]
fn values_record_builds_insert_without_primary_key() {
    let user = User {
        user_id: 0,
        nickname: "carol".into(),
        birth: 2000,
        bio: None,
    };
    let mut q = Query::new();
    q.insert_into("passport_user").values_record(&user);
    assert_eq!(
        q.to_sql(),
        r#"INSERT INTO "passport_user" ("nickname", "birth_year", "bio") VALUES ($1, $2, $3)"#
    );
    assert_eq!(
        q.args(),
        &[Value::Text("carol".into()), Value::Int(2000), Value::Null]
    );
}
