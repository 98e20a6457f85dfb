#[cfg(test)]
mod reader_tests {
    use std::env::current_dir;
    use std::fs::File;
    use std::io::Read;

    use crate::{
        formats::binary::reader::{parse, BinaryPlistReader},
        util::options::DecodeOptions,
        value::{uid::Uid, Value},
    };

    fn read_test_file(name: &str) -> Vec<u8> {
        let plist_path = current_dir()
            .unwrap()
            .as_path()
            .join("test_data/binary")
            .join(name);
        let mut file = File::open(plist_path).unwrap();
        let mut bytes = vec![];
        file.read_to_end(&mut bytes).unwrap();
        bytes
    }

    /// Wrap an object table in a header, a one byte offset table, and a trailer
    fn with_trailer(objects: &[u8], offsets: &[u8]) -> Vec<u8> {
        let mut bytes = b"bplist00".to_vec();
        bytes.extend_from_slice(objects);
        let offset_table_start = bytes.len() as u64;
        bytes.extend_from_slice(offsets);
        bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 1, 1]);
        bytes.extend_from_slice(&(offsets.len() as u64).to_be_bytes());
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&offset_table_start.to_be_bytes());
        bytes
    }

    /// `[42, 314, 0xFF]`
    const NUMBERS: [u8; 55] = [
        0x62, 0x70, 0x6c, 0x69, 0x73, 0x74, 0x30, 0x30, // bplist00
        0xa3, 0x01, 0x02, 0x03, // 3 element array
        0x10, 0x2a, // 42
        0x11, 0x01, 0x3a, // 314
        0x10, 0xff, // 0xFF
        0x08, 0x0c, 0x0e, 0x11, // offset table
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x13, //
    ];

    #[test]
    fn can_read_numbers() {
        let parsed = parse(&NUMBERS).unwrap();
        let items = parsed.as_array().unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_i64().unwrap(), 42);
        assert_eq!(items[1].as_i64().unwrap(), 314);
        assert_eq!(items[2].as_u8().unwrap(), 0xFF);
        assert_eq!(items[1].as_integer().unwrap().width(), 2);
    }

    #[test]
    fn can_accept_any_version_byte() {
        let mut bytes = NUMBERS.to_vec();
        bytes[6] = b'1';
        bytes[7] = b'x';

        assert!(parse(&bytes).is_ok());
    }

    #[test]
    fn cant_read_bad_reference_index() {
        let mut bytes = NUMBERS.to_vec();
        bytes[11] = 0xBD;

        let error = parse(&bytes).unwrap_err();
        assert!(error.is_data_corrupted());
    }

    #[test]
    fn cant_read_bad_top_object_index() {
        let mut bytes = NUMBERS.to_vec();
        bytes[39..47].copy_from_slice(&[0xFF; 8]);

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_out_of_bounds_object_offset() {
        let mut bytes = NUMBERS.to_vec();
        bytes[22] = 0xEE;

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_out_of_bounds_offset_table_start() {
        let mut bytes = NUMBERS.to_vec();
        bytes[47..55].copy_from_slice(&[0xFF; 8]);

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_too_large_object_count() {
        let mut bytes = NUMBERS.to_vec();
        bytes[31..39].copy_from_slice(&[0xFF; 8]);

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_too_large_offset() {
        let bytes: [u8; 83] = [
            0x62, 0x70, 0x6c, 0x69, 0x73, 0x74, 0x30, 0x30, // bplist00
            0xa3, 0x01, 0x02, 0x03, // 3 element array
            0x10, 0x2a, // 42
            0x11, 0x01, 0x3a, // 314
            0x10, 0xff, // 0xFF
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, //
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // corrupted
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x01, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x13, //
        ];

        let error = parse(&bytes).unwrap_err();
        assert!(error.is_data_corrupted());
        assert_eq!(error.path().unwrap().to_string(), "root[1]");
    }

    #[test]
    fn cant_read_too_large_index() {
        let bytes: [u8; 76] = [
            0x62, 0x70, 0x6c, 0x69, 0x73, 0x74, 0x30, 0x30, // bplist00
            0xa3, // 3 element array
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, //
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // corrupted
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, //
            0x10, 0x2a, // 42
            0x11, 0x01, 0x3a, // 314
            0x10, 0xff, // 0xFF
            0x08, 0x21, 0x23, 0x26, // offset table
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x08, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x28, //
        ];

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_truncated_stream() {
        for len in 0..NUMBERS.len() {
            assert!(
                parse(&NUMBERS[..len]).unwrap_err().is_data_corrupted(),
                "prefix of {len} bytes"
            );
        }
    }

    #[test]
    fn cant_read_bad_magic() {
        let mut bytes = NUMBERS.to_vec();
        bytes[0] = b'B';

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_null() {
        let bytes = with_trailer(&[0x00], &[0x08]);
        let error = parse(&bytes).unwrap_err();

        assert_eq!(error.message(), "Unexpected null in property list");
    }

    #[test]
    fn cant_read_fill_byte() {
        let bytes = with_trailer(&[0x0F], &[0x08]);

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_null_inside_array() {
        let bytes = with_trailer(&[0xA2, 0x01, 0x02, 0x09, 0x00], &[0x08, 0x0B, 0x0C]);
        let error = parse(&bytes).unwrap_err();

        assert_eq!(error.path().unwrap().to_string(), "root[1]");
    }

    #[test]
    fn cant_read_reference_cycle() {
        let bytes = with_trailer(&[0xA1, 0x00], &[0x08]);
        let error = parse(&bytes).unwrap_err();

        assert!(error.is_data_corrupted());
        assert!(error.message().contains("cycle"));
    }

    #[test]
    fn cant_read_non_string_key() {
        let bytes = with_trailer(
            &[0xD1, 0x01, 0x02, 0x10, 0x01, 0x10, 0x02],
            &[0x08, 0x0B, 0x0D],
        );
        let error = parse(&bytes).unwrap_err();

        assert!(error.message().starts_with("Invalid dictionary key"));
    }

    #[test]
    fn can_read_set_as_array() {
        let bytes = with_trailer(&[0xC1, 0x01, 0x09], &[0x08, 0x0A]);

        assert_eq!(parse(&bytes).unwrap(), Value::from(vec![Value::from(true)]));
    }

    #[test]
    fn can_read_latin1_string() {
        let bytes = with_trailer(&[0x52, b'h', 0xE9], &[0x08]);

        assert_eq!(parse(&bytes).unwrap(), Value::from("h\u{e9}"));
    }

    #[test]
    fn can_read_utf16_string() {
        let bytes = with_trailer(&[0x62, 0x26, 0x03, 0x00, 0x21], &[0x08]);

        assert_eq!(parse(&bytes).unwrap(), Value::from("\u{2603}!"));
    }

    #[test]
    fn cant_read_unpaired_surrogate() {
        let bytes = with_trailer(&[0x61, 0xD8, 0x00], &[0x08]);
        let error = parse(&bytes).unwrap_err();

        assert!(error.message().starts_with("Invalid string"));
    }

    #[test]
    fn can_read_extended_count() {
        let mut objects = vec![0x4F, 0x10, 0x0F];
        objects.extend(0..15u8);
        let bytes = with_trailer(&objects, &[0x08]);

        assert_eq!(parse(&bytes).unwrap(), Value::from((0..15u8).collect::<Vec<u8>>()));
    }

    #[test]
    fn cant_read_oversized_count() {
        let objects = [
            0x4F, 0x13, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
        ];
        let bytes = with_trailer(&objects, &[0x08]);

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn cant_read_negative_count() {
        let objects = [0xAF, 0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let bytes = with_trailer(&objects, &[0x08]);

        assert!(parse(&bytes).unwrap_err().is_data_corrupted());
    }

    #[test]
    fn can_read_uid() {
        let bytes = read_test_file("Uid");
        let parsed = parse(&bytes).unwrap();

        assert_eq!(
            parsed,
            Value::from(vec![Value::from(Uid::new(1)), Value::from(Uid::new(300))])
        );
        assert!(parsed.as_array().unwrap()[0].as_i32().is_err());
    }

    #[test]
    fn can_read_shared_references() {
        let bytes = read_test_file("SharedReferences");
        let parsed = parse(&bytes).unwrap();

        let letters = Value::from(vec![Value::from("a"), Value::from("a"), Value::from("a")]);
        let square = Value::from(vec![letters.clone(), letters.clone(), letters.clone()]);
        let cube = Value::from(vec![square.clone(), square.clone(), square.clone()]);

        let dictionary = parsed.as_dictionary().unwrap();
        assert_eq!(dictionary.get("a"), Some(&cube));
        assert_eq!(dictionary.get("b"), Some(&square));
        assert_eq!(dictionary.get("c"), Some(&letters));
    }

    #[test]
    fn cant_expand_past_node_limit() {
        let bytes = read_test_file("SharedReferences");
        let options = DecodeOptions::default().with_max_nodes(20);
        let error = BinaryPlistReader::new(&bytes, options).parse().unwrap_err();

        assert!(error.is_data_corrupted());
    }

    #[test]
    fn cant_read_past_depth_limit() {
        let bytes = read_test_file("SharedReferences");
        let options = DecodeOptions::default().with_max_depth(3);
        let error = BinaryPlistReader::new(&bytes, options).parse().unwrap_err();

        assert!(error.message().starts_with("Too many nested arrays or dictionaries"));
        assert_eq!(error.path().unwrap().to_string(), "root.a[0][0]");
    }

    #[test]
    fn can_read_sample() {
        let bytes = read_test_file("Sample");
        let parsed = parse(&bytes).unwrap();
        let dictionary = parsed.as_dictionary().unwrap();

        let keys: Vec<&String> = dictionary.keys().collect();
        assert_eq!(
            keys,
            vec![
                "name", "count", "negative", "big", "ratio", "enabled", "disabled", "payload",
                "created", "unicode", "items", "empty"
            ]
        );
        assert_eq!(dictionary.get("name").unwrap().as_string(), Some("Property List"));
        assert_eq!(dictionary.get("count").unwrap().as_i8().unwrap(), 42);
        assert_eq!(dictionary.get("negative").unwrap().as_i64().unwrap(), -7);
        assert_eq!(dictionary.get("big").unwrap().as_u64().unwrap(), u64::MAX);
        assert!(dictionary.get("big").unwrap().as_i64().is_err());
        assert_eq!(dictionary.get("ratio").unwrap().as_f64().unwrap(), 2.5);
        assert!(dictionary.get("enabled").unwrap().as_bool().unwrap());
        assert!(!dictionary.get("disabled").unwrap().as_bool().unwrap());
        assert_eq!(
            dictionary.get("payload").unwrap().as_data(),
            Some(&[0x00, 0x01, 0x02, 0xFF][..])
        );
        assert_eq!(
            dictionary
                .get("created")
                .unwrap()
                .as_date()
                .unwrap()
                .seconds_since_reference(),
            728512994.0
        );
        assert_eq!(
            dictionary.get("unicode").unwrap().as_string(),
            Some("caf\u{e9} \u{2603}")
        );
        assert_eq!(dictionary.get("items").unwrap().as_array().unwrap().len(), 20);
        assert!(dictionary
            .get("empty")
            .unwrap()
            .as_dictionary()
            .unwrap()
            .is_empty());
    }
}
