use adiflog::{
    core::tokenizer::MalformedTag,
    record::{FINGERPRINT_FIELDS, Record, RecordError},
    registry::{FieldRegistry, FieldSpec},
    types::DataType,
};

const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn record(fields: &[(&str, &str)]) -> Record {
    let mut rec = Record::new();
    for (name, value) in fields {
        rec.set(name, *value);
    }
    rec
}

fn sorted_fields(rec: &Record) -> Vec<&str> {
    let mut fields = rec.fields();
    fields.sort_unstable();
    fields
}

#[test]
fn set_lowercases_names_and_get_is_case_insensitive() {
    let rec = record(&[("call", "W1AW"), ("STATION_CALL", "KF4MDV")]);

    assert_eq!(sorted_fields(&rec), vec!["call", "station_call"]);
    assert_eq!(rec.get("Station_Call").expect("get"), b"KF4MDV");
    assert_eq!(rec.get_str("CALL").expect("get_str"), "W1AW");
    assert!(rec.contains("CALL"));
    assert_eq!(rec.len(), 2);
}

#[test]
fn set_overwrites_previous_value() {
    let mut rec = record(&[("call", "W1AW")]);
    rec.set("CALL", "K1AB");
    assert_eq!(rec.get("call").expect("get"), b"K1AB");
    assert_eq!(rec.len(), 1);
}

#[test]
fn missing_field_is_reported() {
    let rec = record(&[("call", "W1AW")]);
    match rec.get("MODE") {
        Err(RecordError::NoSuchField(name)) => assert_eq!(name, "mode"),
        other => panic!("expected NoSuchField, got {other:?}"),
    }
}

#[test]
fn delete_removes_once() {
    let mut rec = record(&[("call", "W1AW"), ("band", "20m")]);
    assert_eq!(rec.delete("BAND").expect("delete"), b"20m".to_vec());
    assert!(!rec.contains("band"));
    assert!(matches!(rec.delete("band"), Err(RecordError::NoSuchField(_))));
    assert_eq!(sorted_fields(&rec), vec!["call"]);
}

#[test]
fn serialize_emits_registry_fields_in_order_then_custom_fields() {
    let rec = record(&[
        ("notes", "hi"),
        ("zzz_local", "z"),
        ("call", "W1AW"),
        ("app_x", "1"),
        ("band", "20m"),
    ]);
    let out = rec.serialize(&FieldRegistry::adif());
    assert_eq!(
        out,
        b"<band:3>20m<call:4>W1AW<notes:2>hi<app_x:1>1<zzz_local:1>z".to_vec()
    );
}

#[test]
fn serialize_uses_byte_lengths() {
    let rec = record(&[("name", "Jürgen")]);
    assert_eq!(rec.serialize(&FieldRegistry::adif()), "<name:7>Jürgen".as_bytes());

    let mut raw = Record::new();
    raw.set("text", b"AB\xedD".to_vec());
    assert_eq!(raw.serialize(&FieldRegistry::adif()), b"<text:4>AB\xedD".to_vec());
}

#[test]
fn serialize_follows_an_injected_registry() {
    let registry = FieldRegistry::new([
        FieldSpec {
            name: "MODE".to_string(),
            datatype: DataType::String,
        },
        FieldSpec {
            name: "call".to_string(),
            datatype: DataType::String,
        },
    ])
    .expect("registry");
    let rec = record(&[("call", "W1AW"), ("mode", "CW"), ("band", "20m")]);

    assert_eq!(
        rec.serialize(&registry),
        b"<mode:2>CW<call:4>W1AW<band:3>20m".to_vec()
    );
    assert_eq!(
        rec.serialize(&FieldRegistry::empty()),
        b"<band:3>20m<call:4>W1AW<mode:2>CW".to_vec()
    );
}

#[test]
fn fingerprint_covers_only_present_identity_fields() {
    assert_eq!(Record::new().fingerprint(), EMPTY_DIGEST);
    assert_eq!(record(&[("mycall", "KF4MDV")]).fingerprint(), EMPTY_DIGEST);

    assert_eq!(
        record(&[("call", "W1AW")]).fingerprint(),
        "959c59cf037e499fafbda4506f3bcc63aab27c4456e7c7b19a1188c70a0a9d92"
    );
    assert_eq!(
        record(&[("BAND", "20m"), ("call", "W1AW"), ("notes", "x")]).fingerprint(),
        "20cff3f1ae7e24afbb04f3be51a84781bc9111806b436745e8d67ca62f07e3e0"
    );

    let full = record(&[
        ("time_off", "1201"),
        ("time_on", "1200"),
        ("qso_date", "20240101"),
        ("mode", "FT8"),
        ("freq", "14.074"),
        ("band", "20m"),
        ("station_callsign", "KF4MDV"),
        ("call", "W1AW"),
    ]);
    assert_eq!(full.len(), FINGERPRINT_FIELDS.len());
    assert_eq!(
        full.fingerprint(),
        "4d71795db4d8e62d426b928bea14e5980d403667b2c2261c59addaebb486d9c0"
    );
}

#[test]
fn fingerprint_ignores_non_identity_fields() {
    let a = record(&[("call", "W1AW"), ("band", "20m"), ("comment", "first")]);
    let b = record(&[("call", "W1AW"), ("band", "20m"), ("rst_sent", "599")]);
    let c = record(&[("call", "w1aw"), ("band", "20m")]);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn parse_reads_content_up_to_first_terminator() {
    let rec = Record::parse(b"<CALL:4>W1AW <band:3:s>20m<eor><call:4>XXXX").expect("parse");
    assert_eq!(sorted_fields(&rec), vec!["band", "call"]);
    assert_eq!(rec.get("call").expect("call"), b"W1AW");
}

#[test]
fn parse_rejects_empty_and_malformed_content() {
    assert!(matches!(Record::parse(b""), Err(RecordError::EmptyInput)));
    assert!(matches!(Record::parse(b" \r\n "), Err(RecordError::EmptyInput)));
    assert!(matches!(
        Record::parse(b"<call:four>W1AW"),
        Err(RecordError::Malformed(MalformedTag::BadLength { .. }))
    ));
}

#[test]
fn json_form_uses_sorted_names_and_text_values() {
    let rec = record(&[("CALL", "W1AW"), ("band", "20m")]);
    let json = serde_json::to_string(&rec).expect("to json");
    assert_eq!(json, r#"{"band":"20m","call":"W1AW"}"#);

    let back: Record = serde_json::from_str(r#"{"Call":"W1AW","BAND":"20m"}"#).expect("from json");
    assert_eq!(back, rec);
}
