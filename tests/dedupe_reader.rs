use std::collections::VecDeque;
use std::io;

use adiflog::{
    core::tokenizer::MalformedTag,
    reader::{ReadError, RecordSource, adif::AdifReader, dedupe::DedupeReader},
    record::Record,
};

/// Source that replays a fixed script of outcomes.
struct Scripted {
    items: VecDeque<Result<Record, ReadError>>,
    returned: usize,
}

impl Scripted {
    fn new(items: Vec<Result<Record, ReadError>>) -> Self {
        Self {
            items: items.into(),
            returned: 0,
        }
    }
}

impl RecordSource for Scripted {
    fn next_record(&mut self) -> Result<Option<Record>, ReadError> {
        match self.items.pop_front() {
            Some(Ok(rec)) => {
                self.returned += 1;
                Ok(Some(rec))
            }
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    fn record_count(&self) -> usize {
        self.returned
    }
}

fn qso(call: &str, band: &str) -> Record {
    let mut rec = Record::new();
    rec.set("call", call);
    rec.set("band", band);
    rec
}

#[test]
fn records_without_identity_fields_collapse_to_one() {
    let input = b"<mycall:6>KF4MDV<eor><mycall:6>KF4MDV<fail:1>Y<eor>";
    let mut rdr = DedupeReader::new(AdifReader::new(&input[..]));

    let rec = rdr.next_record().expect("read").expect("first record");
    assert_eq!(rec.get("mycall").expect("mycall"), b"KF4MDV");
    assert!(rdr.next_record().expect("read").is_none());
    assert!(rdr.next_record().expect("read").is_none());

    assert_eq!(rdr.duplicates(), 1);
    assert_eq!(rdr.record_count(), 1);
    assert_eq!(rdr.inner().record_count(), 2);
}

#[test]
fn same_record_twice_is_yielded_once() {
    let rec = qso("W1AW", "20m");
    let mut rdr = DedupeReader::new(Scripted::new(vec![Ok(rec.clone()), Ok(rec.clone())]));

    assert_eq!(rdr.next_record().expect("read"), Some(rec));
    assert_eq!(rdr.next_record().expect("read"), None);
}

#[test]
fn distinct_identities_all_pass_in_order() {
    let items = vec![
        Ok(qso("W1AW", "20m")),
        Ok(qso("W1AW", "40m")),
        Ok(qso("W1AW", "20m")),
        Ok(qso("K1AB", "20m")),
    ];
    let calls: Vec<(String, String)> = DedupeReader::new(Scripted::new(items))
        .records()
        .map(|rec| {
            let rec = rec.expect("record");
            (
                rec.get_str("call").expect("call").into_owned(),
                rec.get_str("band").expect("band").into_owned(),
            )
        })
        .collect();

    assert_eq!(
        calls,
        vec![
            ("W1AW".to_string(), "20m".to_string()),
            ("W1AW".to_string(), "40m".to_string()),
            ("K1AB".to_string(), "20m".to_string()),
        ]
    );
}

#[test]
fn errors_pass_through_and_state_survives_them() {
    let items = vec![
        Ok(qso("W1AW", "20m")),
        Err(ReadError::Malformed(MalformedTag::TooManyColons {
            tag: "a:b:c:d".to_string(),
        })),
        Err(ReadError::Io(io::Error::other("disk gone"))),
        Ok(qso("W1AW", "20m")),
        Ok(qso("K1AB", "20m")),
    ];
    let mut rdr = DedupeReader::new(Scripted::new(items));

    assert!(rdr.next_record().expect("first").is_some());
    assert!(matches!(rdr.next_record(), Err(ReadError::Malformed(_))));
    assert!(matches!(rdr.next_record(), Err(ReadError::Io(_))));
    let rec = rdr.next_record().expect("after errors").expect("record");
    assert_eq!(rec.get("call").expect("call"), b"K1AB");
    assert!(rdr.next_record().expect("end").is_none());
}

#[test]
fn separate_readers_do_not_share_seen_sets() {
    let input = b"<call:4>W1AW<eor>";
    for _ in 0..2 {
        let mut rdr = DedupeReader::new(AdifReader::new(&input[..]));
        assert!(rdr.next_record().expect("read").is_some());
    }
}

#[test]
fn wraps_borrowed_and_boxed_sources() {
    let mut base = Scripted::new(vec![Ok(qso("W1AW", "20m")), Ok(qso("W1AW", "20m"))]);
    {
        let mut rdr = DedupeReader::new(&mut base);
        assert!(rdr.next_record().expect("read").is_some());
        assert!(rdr.next_record().expect("read").is_none());
    }
    assert_eq!(base.record_count(), 2);

    let boxed: Box<dyn RecordSource> = Box::new(Scripted::new(vec![Ok(qso("K1AB", "20m"))]));
    let mut rdr = DedupeReader::new(boxed);
    assert!(rdr.next_record().expect("read").is_some());
}
