use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn test_reassembles_fragments_in_order() {
    let mut audio = AudioReassembler::new();
    audio.push("AAA=");
    audio.push("AAE=");

    let blob = audio.reassemble().unwrap().unwrap();

    assert_eq!(blob.bytes(), &[0, 0, 0, 1]);
    assert_eq!(blob.media_type(), "audio/mpeg");
}

#[test]
fn test_no_fragments_yields_nothing() {
    let mut audio = AudioReassembler::new();

    assert_eq!(audio.reassemble().unwrap(), None);
    assert!(audio.is_consumed());
}

#[test]
fn test_second_reassembly_is_rejected() {
    let mut audio = AudioReassembler::new();
    audio.push("AAA=");

    assert!(audio.reassemble().unwrap().is_some());
    assert_matches!(audio.reassemble(), Err(Error::AudioConsumed));
}

#[test_log::test]
fn test_fragments_after_reassembly_are_ignored() {
    let mut audio = AudioReassembler::new();
    audio.push("AAA=");
    audio.reassemble().unwrap();

    audio.push("AAE=");
    assert!(audio.is_empty());
}

#[test]
fn test_invalid_fragment_reports_its_index() {
    let mut audio = AudioReassembler::new();
    audio.push("AAA=");
    audio.push("not base64!");

    assert_matches!(audio.reassemble(), Err(Error::AudioDecode { index: 1, .. }));
}

#[test]
fn test_store_resolves_references() {
    let mut store = AudioStore::default();
    let first = store.insert(AudioBlob::new("audio/webm", vec![1, 2]));
    let second = store.insert(AudioBlob::new("audio/mpeg", vec![3]));

    assert_ne!(first, second);
    assert!(first.starts_with("blob:ipp/"));
    assert_eq!(store.get(&first).map(AudioBlob::bytes), Some(&[1, 2][..]));
    assert_eq!(store.remove(&second).map(AudioBlob::into_bytes), Some(vec![3]));
    assert_eq!(store.len(), 1);
}

proptest! {
    #[test]
    fn prop_round_trip_through_arbitrary_fragments(
        bytes in proptest::collection::vec(any::<u8>(), 0..512),
        cuts in proptest::collection::vec(0..512_usize, 0..12),
    ) {
        let mut cuts = cuts
            .into_iter()
            .map(|c| c.min(bytes.len()))
            .collect::<Vec<_>>();
        cuts.push(bytes.len());
        cuts.sort_unstable();

        let mut audio = AudioReassembler::new();
        let mut start = 0;
        for cut in cuts {
            audio.push(STANDARD.encode(&bytes[start..cut]));
            start = cut;
        }

        let blob = audio.reassemble().unwrap();
        prop_assert_eq!(blob.map(AudioBlob::into_bytes).unwrap_or_default(), bytes);
    }
}
