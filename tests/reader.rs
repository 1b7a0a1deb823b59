mod common;

use std::io::Cursor;

use common::{field_values, quoted_options};
use csv_salvage::{DelimitedReader, ParseError, ParserOptions, parse_line};
use proptest::prelude::*;

fn read_all(text: &str, options: ParserOptions) -> Vec<csv_salvage::FieldSet> {
    let mut reader = DelimitedReader::from_reader(Cursor::new(text.to_string()), options)
        .expect("open reader");
    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("read records")
}

#[test]
fn plain_fields_split_on_commas() {
    let record = parse_line("a,b,c", &ParserOptions::default()).expect("parse");
    assert_eq!(record.as_slice(), ["a", "b", "c"]);
    assert_eq!(record.line_number(), 1);
}

#[test]
fn quoted_field_with_delimiter() {
    let record = parse_line(r#"a,"b,c",d"#, &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["a", "b,c", "d"]);
}

#[test]
fn quoted_empty_field() {
    let record = parse_line(r#"a,"",d"#, &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["a", "", "d"]);
    assert!(record.warnings().is_empty());
}

#[test]
fn escaped_quotes_inside_quoted_field() {
    let record = parse_line(r#"a,"he said ""hi""",c"#, &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["a", "he said \"hi\"", "c"]);
}

#[test]
fn stray_quotes_in_unquoted_text_are_kept_literally() {
    let record = parse_line(r#"12,Tomato "Early" Girl,4"#, &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["12", "Tomato \"Early\" Girl", "4"]);
}

#[test]
fn squeeze_collapses_delimiter_runs() {
    let squeezed = ParserOptions {
        squeeze_delimiters: true,
        ..quoted_options()
    };
    let record = parse_line(",,a,,b,,", &squeezed).expect("parse");
    assert_eq!(record.as_slice(), ["a", "b", ""]);

    let record = parse_line(",,a,,b,,", &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["", "", "a", "", "b", "", ""]);
}

#[test]
fn quotes_are_content_when_quoting_is_off() {
    let record = parse_line(r#"a,"b",c""d"#, &ParserOptions::default()).expect("parse");
    assert_eq!(record.as_slice(), ["a", "\"b\"", "c\"\"d"]);
}

#[test]
fn trimming_applies_to_fields() {
    let options = ParserOptions {
        trim_whitespace: true,
        ..quoted_options()
    };
    let record = parse_line(r#"  a , " b " ,c  "#, &options).expect("parse");
    assert_eq!(record.as_slice(), ["a", "\" b \"", "c"]);
}

// The quote cascade only recognizes wrapping quotes that sit next to a
// delimiter. These tests pin how lines whose first or last field is
// quoted currently behave.
#[test]
fn quoted_first_field_is_rejected() {
    let err = parse_line(r#""b,c",d"#, &quoted_options()).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedQuote { line: 1, column: 5 }
    ));
}

#[test]
fn quoted_last_field_is_rejected() {
    let err = parse_line(r#"a,"b,c""#, &quoted_options()).unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedQuote { line: 1 }));
}

#[test]
fn triple_quote_field_at_line_start_is_a_lone_quote() {
    let record = parse_line(r#"""",b"#, &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["\"", "b"]);
}

#[test]
fn four_quote_runs_vanish() {
    let record = parse_line(r#"a,"""",b"#, &quoted_options()).expect("parse");
    assert_eq!(record.as_slice(), ["a", "", "b"]);
}

#[test]
fn reader_skips_comments_blanks_and_header() {
    let text = "# exported from the nursery sheet\n\
                name,notes,qty\n\
                fern,\"likes shade, moist\",3\n\
                \n\
                moss,\"called \"\"carpet\"\" by some\",12\n\
                ivy,plain,7\n";
    let options = ParserOptions {
        comment_tokens: vec!["#".to_string()],
        ignore_blank_lines: true,
        has_header: true,
        ..quoted_options()
    };
    let mut reader =
        DelimitedReader::from_reader(Cursor::new(text.to_string()), options).expect("open");

    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.as_slice(), ["name", "notes", "qty"]);
    assert_eq!(headers.line_number(), 2);

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("records");
    assert_eq!(
        field_values(&records),
        vec![
            vec!["fern", "likes shade, moist", "3"],
            vec!["moss", "called \"carpet\" by some", "12"],
            vec!["ivy", "plain", "7"],
        ]
    );
    let lines = records.iter().map(|r| r.line_number()).collect::<Vec<_>>();
    assert_eq!(lines, vec![3, 5, 6]);
}

#[test]
fn blank_lines_become_single_empty_records_by_default() {
    let records = read_all("a,b\n\nc\n", ParserOptions::default());
    assert_eq!(
        field_values(&records),
        vec![vec!["a", "b"], vec![""], vec!["c"]]
    );
}

#[test]
fn crlf_and_missing_final_newline_are_handled() {
    let records = read_all("a,b\r\nc,d\r\nf,g", ParserOptions::default());
    assert_eq!(
        field_values(&records),
        vec![vec!["a", "b"], vec!["c", "d"], vec!["f", "g"]]
    );
}

#[test]
fn caller_can_skip_a_bad_record_and_continue() {
    let text = "a,\"b,c\",d\n\"x,y\",z\ne,f\n";
    let mut reader =
        DelimitedReader::from_reader(Cursor::new(text.to_string()), quoted_options())
            .expect("open");

    let first = reader.read_record().expect("first").expect("some");
    assert_eq!(first.as_slice(), ["a", "b,c", "d"]);

    let err = reader.read_record().unwrap_err();
    assert_eq!(err.line(), Some(2));

    let third = reader.read_record().expect("third").expect("some");
    assert_eq!(third.as_slice(), ["e", "f"]);
    assert_eq!(third.line_number(), 3);
    assert_eq!(reader.line_number(), Some(3));

    assert!(reader.read_record().expect("end").is_none());
    assert_eq!(reader.line_number(), None);
}

#[test]
fn close_releases_the_buffer() {
    let mut reader =
        DelimitedReader::from_reader(Cursor::new("a\nb\n".to_string()), ParserOptions::default())
            .expect("open");
    assert!(!reader.is_exhausted().expect("peek"));
    reader.close();
    assert!(reader.is_exhausted().expect("peek"));
    assert!(reader.read_record().expect("read").is_none());
}

#[test]
fn empty_input_has_no_records_or_headers() {
    let options = ParserOptions {
        has_header: true,
        ..quoted_options()
    };
    let mut reader =
        DelimitedReader::from_reader(Cursor::new(String::new()), options).expect("open");
    assert!(reader.headers().is_none());
    assert!(reader.is_exhausted().expect("peek"));
    assert!(reader.read_record().expect("read").is_none());
}

#[test]
fn invalid_options_fail_before_reading() {
    let options = ParserOptions {
        delimiters: vec!['\n'],
        ..ParserOptions::default()
    };
    let result = DelimitedReader::from_reader(Cursor::new("a".to_string()), options);
    assert!(matches!(result, Err(ParseError::InvalidDelimiter('\n'))));
}

#[test]
fn invalid_utf8_fails_the_normalization_pass() {
    let bytes = Cursor::new(vec![b'a', b'\n', 0xfe, b'\n']);
    let result = DelimitedReader::from_reader(bytes, quoted_options());
    assert!(matches!(result, Err(ParseError::Io(_))));
}

#[test]
fn semicolon_files_normalize_on_the_primary_delimiter() {
    let options = ParserOptions {
        delimiters: vec![';'],
        ..quoted_options()
    };
    let records = read_all("x;\"a;b\";\"say \"\"no\"\"\";z\n", options);
    assert_eq!(
        field_values(&records),
        vec![vec!["x", "a;b", "say \"no\"", "z"]]
    );
}

#[test]
fn comment_tokens_match_raw_lines_before_quote_rewriting() {
    for quoting in [false, true] {
        let options = ParserOptions {
            quoting,
            comment_tokens: vec!["\"#".to_string()],
            ..ParserOptions::default()
        };
        let records = read_all("\"# note\nA,b\n", options);
        assert_eq!(field_values(&records), vec![vec!["A", "b"]], "quoting {quoting}");
        assert_eq!(records[0].line_number(), 2);
    }
}

#[test]
fn blank_line_check_sees_the_raw_line() {
    let options = ParserOptions {
        ignore_blank_lines: true,
        ..quoted_options()
    };
    let records = read_all("a\n\n\"\"\"\"\nb\n", options);
    assert_eq!(
        field_values(&records),
        vec![vec!["a"], vec![""], vec!["b"]]
    );
    let lines = records.iter().map(|r| r.line_number()).collect::<Vec<_>>();
    assert_eq!(lines, vec![1, 3, 4]);
}

#[test]
fn trailing_skipped_lines_leave_the_reader_exhausted() {
    let options = ParserOptions {
        comment_tokens: vec!["#".to_string()],
        ..quoted_options()
    };
    let mut reader =
        DelimitedReader::from_reader(Cursor::new("a\n# end\n".to_string()), options)
            .expect("open");
    let first = reader.read_record().expect("read").expect("record");
    assert_eq!(first.as_slice(), ["a"]);
    assert!(reader.is_exhausted().expect("peek"));
    assert!(reader.read_record().expect("read").is_none());
}

#[test]
fn line_number_tracks_source_lines_across_skips() {
    let options = ParserOptions {
        comment_tokens: vec!["#".to_string()],
        ignore_blank_lines: true,
        ..ParserOptions::default()
    };
    let mut reader = DelimitedReader::from_reader(
        Cursor::new("# a\n\n# b\nx,y\n".to_string()),
        options,
    )
    .expect("open");
    assert_eq!(reader.line_number(), None);
    let record = reader.read_record().expect("read").expect("record");
    assert_eq!(record.line_number(), 4);
    assert_eq!(reader.line_number(), Some(4));
}

fn field_content() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,4}",
        proptest::collection::vec((prop_oneof![Just('"'), Just(',')], "[a-z]{1,4}"), 0..4),
    )
        .prop_map(|(head, rest)| {
            let mut content = head;
            for (separator, word) in rest {
                content.push(separator);
                content.push_str(&word);
            }
            content
        })
}

fn encode(content: &str) -> String {
    if content.contains(['"', ',']) {
        format!("\"{}\"", content.replace('"', "\"\""))
    } else {
        content.to_string()
    }
}

proptest! {
    #[test]
    fn interior_fields_round_trip(
        lead in "[a-z]{1,5}",
        fields in proptest::collection::vec(field_content(), 1..5),
        tail in "[a-z]{1,5}",
    ) {
        let mut encoded = vec![lead.clone()];
        encoded.extend(fields.iter().map(|f| encode(f)));
        encoded.push(tail.clone());
        let line = encoded.join(",");

        let record = parse_line(&line, &quoted_options());
        prop_assert!(record.is_ok(), "failed to parse {line:?}: {record:?}");

        let mut expected = vec![lead];
        expected.extend(fields);
        expected.push(tail);
        prop_assert_eq!(record.unwrap().into_vec(), expected);
    }
}
