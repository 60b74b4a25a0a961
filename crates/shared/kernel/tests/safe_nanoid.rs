use keel_kernel::SAFE_ALPHABET;
use keel_kernel::safe_nanoid;

#[test]
fn generates_expected_length_and_charset() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);

    for ch in id.chars() {
        assert!(SAFE_ALPHABET.contains(&ch), "unexpected character in nanoid: {ch}");
    }
}

#[test]
fn custom_length_from_runtime_value() {
    let length = 20_usize;
    let id = safe_nanoid!(length);
    assert_eq!(id.len(), 20);
}

#[test]
fn ids_do_not_repeat() {
    let first = safe_nanoid!();
    let second = safe_nanoid!();
    assert_ne!(first, second);
}
