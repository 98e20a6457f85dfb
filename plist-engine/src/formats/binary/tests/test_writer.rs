#[cfg(test)]
mod writer_tests {
    use std::io::Cursor;

    use crate::{
        formats::binary::{reader::parse, writer::write},
        value::{date::Date, dictionary::Dictionary, integer::Integer, real::Real, uid::Uid, Value},
    };

    /// The object table of a document, between the header and the offset table
    fn object_table(bytes: &[u8]) -> &[u8] {
        let trailer = &bytes[bytes.len() - 32..];
        let offset_table_start = u64::from_be_bytes(trailer[24..32].try_into().unwrap()) as usize;
        &bytes[8..offset_table_start]
    }

    fn sample() -> Value {
        let mut nested = Dictionary::new();
        nested.insert("zebra", Value::from(vec![Value::from(1.5), Value::from(false)]));
        nested.insert("apple", Value::from(Uid::new(7)));

        let mut dictionary = Dictionary::new();
        dictionary.insert("name", Value::from("plist"));
        dictionary.insert("snowman", Value::from("\u{2603}"));
        dictionary.insert("payload", Value::from(vec![0xDEu8, 0xAD, 0xBE, 0xEF]));
        dictionary.insert(
            "created",
            Value::from(Date::from_seconds_since_reference(728512994.0)),
        );
        dictionary.insert("nested", Value::from(nested));
        dictionary.insert("empty", Value::from(Vec::<Value>::new()));
        Value::from(dictionary)
    }

    #[test]
    fn can_write_single_object() {
        let bytes = write(&Value::from(true)).unwrap();
        let expected = [
            0x62, 0x70, 0x6c, 0x69, 0x73, 0x74, 0x30, 0x30, // bplist00
            0x09, // true
            0x08, // offset table
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09, //
        ];

        assert_eq!(bytes, expected);
    }

    #[test]
    fn can_write_minimal_integers() {
        assert_eq!(object_table(&write(&Value::from(42)).unwrap()), [0x10, 0x2a]);
        assert_eq!(
            object_table(&write(&Value::from(314)).unwrap()),
            [0x11, 0x01, 0x3a]
        );
        assert_eq!(
            object_table(&write(&Value::from(-1)).unwrap()),
            [0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            object_table(&write(&Value::from(u64::MAX)).unwrap()),
            [
                0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
                0xFF, 0xFF, 0xFF, 0xFF
            ]
        );
    }

    #[test]
    fn can_write_keys_then_values() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("b", Value::from(1));
        dictionary.insert("a", Value::from(vec![Value::from(2)]));
        let bytes = write(&Value::from(dictionary)).unwrap();

        assert_eq!(
            object_table(&bytes),
            [
                0xD2, 0x01, 0x02, 0x03, 0x04, // dict: keys 1, 2 then values 3, 4
                0x51, b'b', //
                0x51, b'a', //
                0x10, 0x01, //
                0xA1, 0x05, //
                0x10, 0x02, //
            ]
        );
    }

    #[test]
    fn can_share_repeated_scalars() {
        let entry = || Value::from([("k", Value::from(1))].into_iter().collect::<Dictionary>());
        let value = Value::from(vec![entry(), entry()]);
        let bytes = write(&value).unwrap();

        assert_eq!(
            object_table(&bytes),
            [
                0xA2, 0x01, 0x04, // array of the two dictionaries
                0xD1, 0x02, 0x03, // first dictionary
                0x51, b'k', //
                0x10, 0x01, //
                0xD1, 0x02, 0x03, // second dictionary reuses the key and value
            ]
        );
        // Seven values in the tree, but only five objects
        let trailer = &bytes[bytes.len() - 32..];
        assert_eq!(u64::from_be_bytes(trailer[8..16].try_into().unwrap()), 5);
        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn can_share_keys_with_string_values() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("same", Value::from("same"));
        dictionary.insert("other", Value::from(vec![Value::from("same"), Value::from(2.5)]));
        let value = Value::from(dictionary);
        let bytes = write(&value).unwrap();

        assert_eq!(
            object_table(&bytes),
            [
                0xD2, 0x01, 0x02, 0x01, 0x03, // keys 1, 2 then values 1, 3
                0x54, b's', b'a', b'm', b'e', //
                0x55, b'o', b't', b'h', b'e', b'r', //
                0xA2, 0x01, 0x04, //
                0x23, 0x40, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            ]
        );
        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn can_write_extended_count() {
        let text = "abcdefghijklmnopqrst";
        let bytes = write(&Value::from(text)).unwrap();
        let table = object_table(&bytes);

        assert_eq!(&table[..3], [0x5F, 0x10, 0x14]);
        assert_eq!(&table[3..], text.as_bytes());
    }

    #[test]
    fn can_write_utf16_string() {
        let bytes = write(&Value::from("h\u{e9}")).unwrap();

        assert_eq!(object_table(&bytes), [0x62, 0x00, 0x68, 0x00, 0xE9]);
    }

    #[test]
    fn can_write_uid() {
        let bytes = write(&Value::from(Uid::new(300))).unwrap();

        assert_eq!(object_table(&bytes), [0x81, 0x01, 0x2c]);
    }

    #[test]
    fn can_write_reals_in_their_width() {
        let narrow = write(&Value::from(1.5f32)).unwrap();
        let wide = write(&Value::from(1.5f64)).unwrap();

        assert_eq!(object_table(&narrow), [0x22, 0x3F, 0xC0, 0x00, 0x00]);
        assert_eq!(object_table(&wide)[0], 0x23);
    }

    #[test]
    fn can_round_trip_sample() {
        let value = sample();
        let bytes = write(&value).unwrap();

        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn can_round_trip_number_extremes() {
        let value = Value::from(vec![
            Value::from(i8::MAX),
            Value::from(i8::MIN),
            Value::from(i16::MAX),
            Value::from(i16::MIN),
            Value::from(i32::MAX),
            Value::from(i32::MIN),
            Value::from(i64::MAX),
            Value::from(i64::MIN),
            Value::from(u8::MAX),
            Value::from(u16::MAX),
            Value::from(u32::MAX),
            Value::from(u64::MAX),
            Value::from(f32::MAX),
            Value::from(-f32::MAX),
            Value::from(f32::INFINITY),
            Value::from(f64::MAX),
            Value::from(f64::NEG_INFINITY),
        ]);
        let parsed = parse(&write(&value).unwrap()).unwrap();
        assert_eq!(parsed, value);

        let items = parsed.as_array().unwrap();
        assert_eq!(items[7].as_i64().unwrap(), i64::MIN);
        assert_eq!(items[11].as_u64().unwrap(), u64::MAX);
        assert!(items[11].as_i64().is_err());
        assert_eq!(items[12].as_f32().unwrap(), f32::MAX);
    }

    #[test]
    fn can_write_deterministically() {
        let value = sample();
        let first = write(&value).unwrap();

        (0..100).for_each(|_| assert_eq!(write(&value).unwrap(), first));
    }

    #[test]
    fn can_write_wide_tables() {
        let items: Vec<Value> = (0..300).map(Value::from).collect();
        let value = Value::from(items);
        let bytes = write(&value).unwrap();

        // 301 objects need two byte references
        assert_eq!(bytes[bytes.len() - 25], 2);
        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn can_write_16_byte_payloads() {
        let integer = Integer::from_parts(8, false, u128::from(u64::MAX)).unwrap();
        let parsed = parse(&write(&Value::from(integer)).unwrap()).unwrap();

        assert_eq!(parsed.as_integer().unwrap().width(), 16);
        assert_eq!(parsed.as_u64().unwrap(), u64::MAX);
    }

    #[test]
    fn cant_write_too_deep() {
        let value = (0..600).fold(Value::from(true), |inner, _| Value::from(vec![inner]));
        let error = write(&value).unwrap_err();

        assert!(matches!(error, crate::error::plist::PlistError::InvalidValue(..)));
    }

    #[test]
    fn can_be_read_by_plist_crate() {
        let bytes = write(&sample()).unwrap();
        let parsed = plist::Value::from_reader(Cursor::new(bytes)).unwrap();
        let dictionary = parsed.as_dictionary().unwrap();

        assert_eq!(dictionary.get("name").unwrap().as_string(), Some("plist"));
        assert_eq!(dictionary.get("snowman").unwrap().as_string(), Some("\u{2603}"));
        assert_eq!(
            dictionary.get("payload").unwrap().as_data(),
            Some(&[0xDE, 0xAD, 0xBE, 0xEF][..])
        );
        let nested = dictionary.get("nested").unwrap().as_dictionary().unwrap();
        let zebra = nested.get("zebra").unwrap().as_array().unwrap();
        assert_eq!(zebra[0].as_real(), Some(1.5));
        assert_eq!(zebra[1].as_boolean(), Some(false));
        assert!(dictionary.get("empty").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn can_read_plist_crate_output() {
        let mut dictionary = plist::Dictionary::new();
        dictionary.insert("count".to_string(), plist::Value::Integer(9000.into()));
        dictionary.insert("ratio".to_string(), plist::Value::Real(0.25));
        dictionary.insert("word".to_string(), plist::Value::String("hi".to_string()));
        let mut bytes = vec![];
        plist::Value::Dictionary(dictionary)
            .to_writer_binary(&mut bytes)
            .unwrap();

        let parsed = parse(&bytes).unwrap();
        let dictionary = parsed.as_dictionary().unwrap();
        assert_eq!(dictionary.get("count").unwrap().as_u16().unwrap(), 9000);
        assert_eq!(
            dictionary.get("ratio").unwrap().as_real(),
            Some(&Real::F64(0.25))
        );
        assert_eq!(dictionary.get("word").unwrap().as_string(), Some("hi"));
    }
}
