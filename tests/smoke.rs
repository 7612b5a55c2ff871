use coffer::{ItemStack, TransactionKind};
use coffer_testkit::{chest_tree, EventRecord, JsonlSink};

#[test]
fn insert_poll_roundtrip_smoke() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut tree = chest_tree();
    let root = tree.root();

    let result = tree.insert(root, &ItemStack::new(1, 70));
    assert_eq!(result.kind, TransactionKind::Success);
    assert!(result.rejected.is_empty());

    let polled = tree.poll(root).expect("chest lens is well formed");
    assert_eq!(polled.map(|s| s.count), Some(64));
}

#[test]
fn event_stream_can_be_written() {
    let mut sink = JsonlSink::create(std::env::temp_dir().join("coffer-eventlog.jsonl"))
        .expect("can create temp log");
    let record = EventRecord {
        kind: "SmokeTest",
        payload: "ok",
    };
    sink.write(&record).expect("can write event");
}
