//! Token wire-format tests: what the CLI signs must be exactly what the
//! lock firmware expects to parse

use spacelock::token::{MAC_LEN, SECRET_KEY_LEN};
use spacelock::{SecretKey, SignedToken, Token, TokenPayload};

fn fixed_key() -> SecretKey {
    SecretKey::from_bytes([0xA5; SECRET_KEY_LEN])
}

#[test]
fn test_record_layout_matches_firmware_parser() {
    // The firmware reads: mac[16] || valid_from u64 LE || valid_until u64 LE
    // || user id bytes
    let token = Token::new(0x0102_0304_0506_0708, 0x1112_1314_1516_1718, "door-7").unwrap();
    let bytes = token.sign(&fixed_key()).to_bytes();

    assert_eq!(bytes.len(), MAC_LEN + 8 + 8 + 6);
    assert_eq!(
        &bytes[MAC_LEN..MAC_LEN + 8],
        &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
    );
    assert_eq!(
        &bytes[MAC_LEN + 8..MAC_LEN + 16],
        &[0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11]
    );
    assert_eq!(&bytes[MAC_LEN + 16..], b"door-7");
}

#[test]
fn test_armored_token_survives_ascii_payload_encoding() {
    // Delivery writes the armored text's character codes; the firmware
    // base64-decodes on its side. Armor -> ASCII bytes -> text -> decode
    // must reproduce the original record.
    let key = fixed_key();
    let signed = Token::new(1_700_000_000, 1_700_086_400, "alice")
        .unwrap()
        .sign(&key);
    let armored = signed.to_base64();

    let wire_bytes = TokenPayload::Ascii(armored.clone()).encode().unwrap();
    let received = String::from_utf8(wire_bytes).unwrap();
    let reparsed = SignedToken::from_base64(&received).unwrap();

    assert_eq!(reparsed, signed);
    assert!(reparsed.verify(&key).is_ok());
}

#[test]
fn test_binary_payload_form_carries_the_same_record() {
    let signed = Token::new(10, 20, "bob").unwrap().sign(&fixed_key());
    let armored = signed.to_base64();

    let decoded = TokenPayload::Base64(armored).encode().unwrap();
    assert_eq!(decoded, signed.to_bytes());
}

#[test]
fn test_cross_key_tokens_do_not_verify() {
    let signer = SecretKey::from_bytes([0x01; SECRET_KEY_LEN]);
    let other = SecretKey::from_bytes([0x02; SECRET_KEY_LEN]);
    let signed = Token::new(10, 20, "carol").unwrap().sign(&signer);

    assert!(signed.verify(&signer).is_ok());
    assert!(signed.verify(&other).is_err());
}

#[test]
fn test_user_id_round_trips_through_armor() {
    let key = fixed_key();
    for user in ["a", "gate keeper", "user-42!", "x".repeat(64).as_str()] {
        let signed = Token::new(5, 6, user).unwrap().sign(&key);
        let reparsed = SignedToken::from_base64(&signed.to_base64()).unwrap();
        assert_eq!(reparsed.token().user_id, user);
    }
}
