//! Positional read/write tests, including the partial-transfer loops.

use radosclient::{Cluster, Error, IoCtx};
use transport::mem::{MemCluster, MemConnector, MemIo};
use transport::Connector;

struct TestBed {
    _cluster: Cluster<MemCluster>,
    ctx: IoCtx<MemIo>,
}

fn setup() -> TestBed {
    setup_with(MemConnector::default())
}

/// Cap every native read/write call at `limit` bytes so the loops have to
/// take more than one trip.
fn setup_limited(limit: usize) -> TestBed {
    setup_with(MemConnector::with_transfer_limit(limit))
}

fn setup_with(conn: MemConnector) -> TestBed {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let backend = conn.connect().expect("connect");
    let cluster = Cluster::new(backend).expect("cluster");
    let pool = format!("positional-{:08x}", rand::random::<u32>());
    cluster.pool_create(&pool).expect("pool create");
    let ctx = cluster.io_context(&pool).expect("io context");
    TestBed {
        _cluster: cluster,
        ctx,
    }
}

#[test]
fn read_of_empty_object_signals_end() {
    let bed = setup();
    let obj = bed.ctx.create("test-object").expect("create");

    let mut buf = [0u8; 5];
    let err = obj.read_at(&mut buf, 0).unwrap_err();
    assert!(err.is_end_of_object());
    assert_eq!(err.transferred(), Some(0));
}

#[test]
fn positional_round_trip() {
    let bed = setup();
    let obj = bed.ctx.create("test-object").expect("create");

    assert_eq!(obj.write_at(b"12345", 0).expect("write_at"), 5);

    let mut byte = [0u8; 1];
    assert_eq!(obj.read_at(&mut byte, 2).expect("read_at"), 1);
    assert_eq!(byte[0], b'3');

    byte[0] = b'C';
    assert_eq!(obj.write_at(&byte, 2).expect("write_at"), 1);
    obj.read_at(&mut byte, 2).expect("read_at");
    assert_eq!(byte[0], b'C');

    // Two bytes requested at offset 4 of a five-byte object: one comes
    // back, then the end-of-object terminal.
    let mut tail = [0u8; 2];
    let err = obj.read_at(&mut tail, 4).unwrap_err();
    assert!(matches!(err, Error::EndOfObject { transferred: 1, .. }));
    assert_eq!(tail[0], b'5');

    assert_eq!(obj.write_at(b"EF", 4).expect("write_at"), 2);
    assert_eq!(&bed.ctx.get("test-object").expect("get")[..], b"12C4EF");
}

#[test]
fn partial_reads_accumulate_across_the_loop() {
    let bed = setup_limited(2);
    bed.ctx.put("test-object", b"12345").expect("put");
    let obj = bed.ctx.open("test-object").expect("open");

    // The backend moves at most two bytes per call; an eight-byte request
    // over five bytes of data takes three partial reads before the end.
    let mut buf = [0u8; 8];
    let err = obj.read_at(&mut buf, 0).unwrap_err();
    assert!(matches!(err, Error::EndOfObject { transferred: 5, .. }));
    assert_eq!(&buf[..5], b"12345");
}

#[test]
fn partial_writes_run_to_completion() {
    let bed = setup_limited(3);
    let obj = bed.ctx.create("test-object").expect("create");

    assert_eq!(obj.write_at(b"abcdefgh", 0).expect("write_at"), 8);

    let mut buf = [0u8; 8];
    assert_eq!(obj.read_at(&mut buf, 0).expect("read_at"), 8);
    assert_eq!(&buf, b"abcdefgh");
}

#[test]
fn write_past_end_zero_fills_the_gap() {
    let bed = setup();
    bed.ctx.put("test-object", b"ab").expect("put");
    let obj = bed.ctx.open("test-object").expect("open");

    assert_eq!(obj.write_at(b"z", 5).expect("write_at"), 1);
    assert_eq!(&bed.ctx.get("test-object").expect("get")[..], b"ab\0\0\0z");
}

#[test]
fn zero_length_transfers_are_noops() {
    let bed = setup();
    let obj = bed.ctx.create("test-object").expect("create");

    let mut empty = [0u8; 0];
    assert_eq!(obj.read_at(&mut empty, 0).expect("read_at"), 0);
    assert_eq!(obj.write_at(&empty, 0).expect("write_at"), 0);
}

#[test]
fn stalled_write_reports_io_failure() {
    let bed = setup_limited(0);
    let obj = bed.ctx.create("test-object").expect("create");

    let err = obj.write_at(b"x", 0).unwrap_err();
    assert!(matches!(
        err,
        Error::Write {
            transferred: 0,
            ..
        }
    ));
}

#[test]
fn end_of_object_after_partial_windows_keeps_count() {
    let bed = setup_limited(4);
    bed.ctx.put("test-object", b"0123456789").expect("put");
    let obj = bed.ctx.open("test-object").expect("open");

    // Well inside the object: the loop needs three calls and succeeds.
    let mut buf = [0u8; 10];
    assert_eq!(obj.read_at(&mut buf, 0).expect("read_at"), 10);
    assert_eq!(&buf, b"0123456789");

    // Straddling the end: two full windows, then the terminal with the
    // running total intact.
    let mut long = [0u8; 12];
    let err = obj.read_at(&mut long, 2).unwrap_err();
    assert!(matches!(err, Error::EndOfObject { transferred: 8, .. }));
    assert_eq!(&long[..8], b"23456789");
}
