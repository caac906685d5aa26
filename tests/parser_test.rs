use email_unpack::*;

#[test]
fn test_parse_single_part_message() {
    let raw = b"From: sender@example.com\r\n\
                Subject: Hi\r\n\
                \r\n\
                Hello";

    let tree = parse_message(raw).unwrap();

    assert!(!tree.is_container);
    assert_eq!(tree.content_type, "text/plain");
    assert_eq!(tree.charset, None);
    assert_eq!(tree.header("subject"), Some("Hi"));
    assert_eq!(tree.walk().count(), 1);
}

#[test]
fn test_parse_multipart_tree() {
    let raw = b"From: sender@example.com\r\n\
                Subject: Tree\r\n\
                Content-Type: multipart/mixed; boundary=\"OUTER\"\r\n\
                \r\n\
                --OUTER\r\n\
                Content-Type: multipart/alternative; boundary=\"INNER\"\r\n\
                \r\n\
                --INNER\r\n\
                Content-Type: text/plain; charset=\"ISO-8859-1\"\r\n\
                \r\n\
                plain\r\n\
                --INNER\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <b>html</b>\r\n\
                --INNER--\r\n\
                --OUTER\r\n\
                Content-Type: application/pdf; name=\"spec.pdf\"\r\n\
                Content-ID: <pdf@local>\r\n\
                Content-Transfer-Encoding: base64\r\n\
                \r\n\
                JVBERi0=\r\n\
                --OUTER--\r\n";

    let tree = parse_message(raw).unwrap();
    let nodes: Vec<(usize, &Part)> = tree.walk().collect();

    assert!(tree.is_container);
    assert_eq!(nodes.len(), 5);
    assert_eq!(nodes[1].1.content_type, "multipart/alternative");
    assert!(nodes[1].1.is_container);
    assert_eq!(nodes[2].1.content_type, "text/plain");
    assert_eq!(nodes[2].1.charset.as_deref().map(str::to_lowercase).as_deref(), Some("iso-8859-1"));
    assert_eq!(nodes[3].1.content_type, "text/html");
    assert_eq!(nodes[3].1.charset, None);

    let (index, pdf) = nodes[4];
    assert_eq!(index, 5);
    assert_eq!(pdf.filename.as_deref(), Some("spec.pdf"));
    assert_eq!(pdf.content_id.as_deref(), Some("<pdf@local>"));
    assert_eq!(pdf.payload, b"%PDF-");
}

#[test]
fn test_disposition_filename_and_raw_disposition() {
    let raw = b"From: a@example.com\r\n\
                Content-Type: multipart/mixed; boundary=\"B\"\r\n\
                \r\n\
                --B\r\n\
                Content-Type: image/png\r\n\
                Content-Disposition: attachment; filename=\"logo.png\"\r\n\
                Content-Transfer-Encoding: base64\r\n\
                \r\n\
                iVBORw0KGgo=\r\n\
                --B--\r\n";

    let tree = parse_message(raw).unwrap();
    let image = &tree.children[0];

    assert_eq!(image.filename.as_deref(), Some("logo.png"));
    assert!(image
        .content_disposition
        .as_deref()
        .is_some_and(|d| d.starts_with("attachment")));
    assert_eq!(image.payload, b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_duplicate_headers_are_retained_in_order() {
    let raw = b"Received: from a\r\n\
                Received: from b\r\n\
                Subject: Dup\r\n\
                \r\n\
                body";

    let tree = parse_message(raw).unwrap();
    let received: Vec<&str> = tree
        .headers
        .iter()
        .filter(|(k, _)| k == "Received")
        .map(|(_, v)| v.as_str())
        .collect();

    assert_eq!(received, ["from a", "from b"]);
    assert_eq!(tree.headers.len(), 3);
}

#[test]
fn test_embedded_message_is_traversed() {
    let raw = b"From: outer@example.com\r\n\
                Subject: Fwd\r\n\
                Content-Type: multipart/mixed; boundary=\"B\"\r\n\
                \r\n\
                --B\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                See attached.\r\n\
                --B\r\n\
                Content-Type: message/rfc822\r\n\
                \r\n\
                From: inner@example.com\r\n\
                Subject: Inner\r\n\
                \r\n\
                Inner body\r\n\
                --B--\r\n";

    let tree = parse_message(raw).unwrap();
    let embedded = &tree.children[1];

    assert_eq!(embedded.content_type, "message/rfc822");
    assert!(embedded.is_container);
    assert_eq!(embedded.children.len(), 1);
    assert_eq!(embedded.children[0].header("Subject"), Some("Inner"));
    assert_eq!(tree.walk().count(), 4);
}

#[test]
fn test_garbage_is_a_parse_failure() {
    let result = parse_message(b"this is not an email at all");
    assert!(matches!(result, Err(ExtractError::Parse(_))));
}

#[test]
fn test_empty_input_is_a_parse_failure() {
    assert!(parse_message(b"").is_err());
}

#[test]
fn test_mbox_separator_line_is_skipped() {
    let raw = b"From sender@example.com Wed Jan  1 12:00:00 2025\n\
                From: sender@example.com\n\
                Subject: Exported\n\
                \n\
                body";

    let tree = parse_message(raw).unwrap();
    assert_eq!(tree.header("Subject"), Some("Exported"));
    assert_eq!(tree.header("From"), Some("sender@example.com"));
}

#[test]
fn test_blank_filename_is_treated_as_missing() {
    let raw = b"From: a@example.com\r\n\
                Content-Type: multipart/mixed; boundary=\"B\"\r\n\
                \r\n\
                --B\r\n\
                Content-Type: application/pdf\r\n\
                Content-Disposition: inline; filename=\"\"\r\n\
                \r\n\
                %PDF-\r\n\
                --B\r\n\
                Content-Type: application/pdf; name=\"fallback.pdf\"\r\n\
                Content-Disposition: attachment; filename=\"\"\r\n\
                \r\n\
                %PDF-\r\n\
                --B--\r\n";

    let tree = parse_message(raw).unwrap();

    assert_eq!(tree.children[0].filename, None);
    assert_eq!(tree.children[1].filename.as_deref(), Some("fallback.pdf"));
}

#[test]
fn test_charset_needs_a_real_parameter() {
    let raw = b"From: a@example.com\r\n\
                Content-Type: multipart/mixed; boundary=\"B\"\r\n\
                \r\n\
                --B\r\n\
                Content-Type: text/plain; name=\"charset-notes.txt\"\r\n\
                \r\n\
                notes\r\n\
                --B\r\n\
                Content-Type: text/plain; CHARSET=\"windows-1252\"\r\n\
                \r\n\
                legacy\r\n\
                --B--\r\n";

    let tree = parse_message(raw).unwrap();

    assert_eq!(tree.children[0].charset, None);
    assert_eq!(
        tree.children[1].charset.as_deref().map(str::to_lowercase).as_deref(),
        Some("windows-1252")
    );
}
