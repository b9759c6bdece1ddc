//! Encode/decode through the public API with derived records.

use ddbtk_api::{
    decode_new, encode, AttributeMap, AttributeValue, DataFailure, Error, ErrorKind, Record,
};
use proptest::prelude::*;

#[derive(Record, Debug, Default, Clone, PartialEq)]
#[allow(non_snake_case)]
struct MyStruct {
    #[ddb("field_1,N")]
    Field1: i64,
    #[ddb("-,N")]
    Field2: i64,
    #[ddb(",N")]
    Field3: i64,
    #[ddb(",S")]
    Field4: String,
    #[ddb("field_5,S")]
    Field5: String,
    #[ddb("field_6,")]
    Field6: String,
    Field7: String,
    #[ddb(" field_8 , N ")]
    Field8: i64,
    #[ddb("-")]
    Field9: String,
    #[ddb("f,S,")]
    Field10: String,
    #[ddb("f,S,xyz")]
    Field11: String,
    #[ddb(",Q")]
    Field12: String,
    #[ddb("field_13,N")]
    Field13: bool,
    #[ddb("field_14,N")]
    Field14: bool,
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
struct Numbers {
    #[ddb("a,N")]
    a: i8,
    #[ddb("b,N")]
    b: u32,
    #[ddb("c,N")]
    c: i64,
    #[ddb("d,S")]
    d: u64,
    #[ddb("e,N")]
    e: f64,
    #[ddb("f,N")]
    f: f32,
    r#type: String,
}

fn n(text: &str) -> AttributeValue {
    AttributeValue::Numeric(text.to_string())
}

fn s(text: &str) -> AttributeValue {
    AttributeValue::Text(text.to_string())
}

#[test]
fn annotated_struct_encodes_and_decodes() {
    let input = MyStruct {
        Field1: 1,
        Field2: 2,
        Field3: 3,
        Field4: "s4".into(),
        Field5: "s5".into(),
        Field6: "s6".into(),
        Field7: "s7".into(),
        Field8: 8,
        Field9: "s9".into(),
        Field10: "s10".into(),
        Field11: "s11".into(),
        Field12: "s12".into(),
        Field13: true,
        Field14: false,
    };
    let am = encode(&input).unwrap();

    let expected: AttributeMap = [
        ("field_1", n("1")),
        ("Field2", n("2")),
        ("Field3", n("3")),
        ("Field4", s("s4")),
        ("field_5", s("s5")),
        ("field_6", s("s6")),
        ("Field7", s("s7")),
        ("field_8", n("8")),
        // Field9 and onwards are omitted
        ("field_13", n("1")),
        ("field_14", n("0")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(am, expected);

    let output: MyStruct = decode_new(&am).unwrap();
    let mut want = input;
    want.Field9 = String::new();
    want.Field10 = String::new();
    want.Field11 = String::new();
    want.Field12 = String::new();
    assert_eq!(output, want);
}

#[test]
fn raw_identifiers_keep_their_plain_name() {
    let schema = Numbers::schema().unwrap();
    let last = schema.fields().last().unwrap();
    assert_eq!(last.name(), "type");
    assert_eq!(last.wire_name(), "type");
}

#[derive(Record, Debug, Default, PartialEq)]
struct Qualified {
    #[ddb("id,N")]
    id: core::primitive::u64,
    name: std::string::String,
}

#[test]
fn path_qualified_field_types_are_accepted() {
    let record = Qualified { id: 7, name: "seven".into() };
    let am = encode(&record).unwrap();
    assert_eq!(am.get("id"), Some(&n("7")));
    assert_eq!(am.get("name"), Some(&s("seven")));
    assert_eq!(decode_new::<Qualified>(&am).unwrap(), record);
}

#[test]
fn unknown_column_is_a_config_error() {
    let mut am = encode(&Numbers::default()).unwrap();
    am.insert("Field9".into(), s("x"));
    let err = decode_new::<Numbers>(&am).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

proptest! {
    #[test]
    fn in_range_values_round_trip(
        a in any::<i8>(),
        b in any::<u32>(),
        c in any::<i64>(),
        d in any::<u64>(),
        e in any::<f64>().prop_filter("N columns hold finite numbers", |v| v.is_finite()),
        f in any::<f32>().prop_filter("N columns hold finite numbers", |v| v.is_finite()),
        text in ".*",
    ) {
        let record = Numbers { a, b, c, d, e, f, r#type: text };
        let decoded: Numbers = decode_new(&encode(&record).unwrap()).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn wider_values_overflow_narrow_fields(wide in prop_oneof![
        (i8::MAX as i64 + 1)..=i64::MAX,
        i64::MIN..=(i8::MIN as i64 - 1),
    ]) {
        let am: AttributeMap = [("a".to_string(), n(&wide.to_string()))].into_iter().collect();
        match decode_new::<Numbers>(&am) {
            Err(Error::Data(e)) => {
                prop_assert_eq!(e.failure, DataFailure::Overflow);
                prop_assert_eq!(e.raw, wide.to_string());
            }
            other => prop_assert!(false, "expected overflow, got {:?}", other),
        }
    }
}
