use asset_server::range::{content_range, content_range_unsatisfied, resolve, ResolvedRange};

#[test]
fn no_header_is_full() {
    assert_eq!(resolve(None, 100), ResolvedRange::Full);
    assert_eq!(ResolvedRange::Full.len(100), 100);
}

#[test]
fn open_ended_range() {
    let r = resolve(Some("bytes=50-"), 100);
    assert_eq!(r, ResolvedRange::Partial { start: 50, end: 99 });
    assert_eq!(r.len(100), 50);
}

#[test]
fn bounded_range() {
    let r = resolve(Some("bytes=10-19"), 100);
    assert_eq!(r, ResolvedRange::Partial { start: 10, end: 19 });
    assert_eq!(r.len(100), 10);
}

#[test]
fn end_clamped_to_last_byte() {
    let r = resolve(Some("bytes=90-150"), 100);
    assert_eq!(r, ResolvedRange::Partial { start: 90, end: 99 });
}

#[test]
fn full_file_range() {
    let r = resolve(Some("bytes=0-99"), 100);
    assert_eq!(r, ResolvedRange::Partial { start: 0, end: 99 });
    assert_eq!(r.len(100), 100);
}

#[test]
fn suffix_range_takes_last_bytes() {
    let r = resolve(Some("bytes=-20"), 100);
    assert_eq!(r, ResolvedRange::Partial { start: 80, end: 99 });
    // suffix longer than the file covers the whole file
    let r = resolve(Some("bytes=-200"), 100);
    assert_eq!(r, ResolvedRange::Partial { start: 0, end: 99 });
}

#[test]
fn inverted_bounds_are_unsatisfiable() {
    assert_eq!(resolve(Some("bytes=10-9"), 100), ResolvedRange::Unsatisfiable);
}

#[test]
fn start_past_eof_is_unsatisfiable() {
    assert_eq!(resolve(Some("bytes=100-"), 100), ResolvedRange::Unsatisfiable);
    assert_eq!(
        resolve(Some("bytes=200-300"), 100),
        ResolvedRange::Unsatisfiable
    );
    assert_eq!(resolve(Some("bytes=-0"), 100), ResolvedRange::Unsatisfiable);
}

#[test]
fn empty_file_ranges() {
    assert_eq!(resolve(None, 0), ResolvedRange::Full);
    assert_eq!(resolve(Some("bytes=0-"), 0), ResolvedRange::Unsatisfiable);
    assert_eq!(resolve(Some("bytes=-5"), 0), ResolvedRange::Unsatisfiable);
}

#[test]
fn malformed_headers_degrade_to_full() {
    assert_eq!(resolve(Some("bytes=abc-def"), 100), ResolvedRange::Full);
    assert_eq!(resolve(Some("bytes=--"), 100), ResolvedRange::Full);
    assert_eq!(resolve(Some("bytes=-"), 100), ResolvedRange::Full);
    assert_eq!(resolve(Some("items=0-10"), 100), ResolvedRange::Full);
    assert_eq!(resolve(Some("garbage"), 100), ResolvedRange::Full);
}

#[test]
fn multi_range_degrades_to_full() {
    assert_eq!(resolve(Some("bytes=0-10,20-30"), 100), ResolvedRange::Full);
}

#[test]
fn header_formatting() {
    assert_eq!(content_range(50, 99, 100), "bytes 50-99/100");
    assert_eq!(content_range_unsatisfied(100), "bytes */100");
}
