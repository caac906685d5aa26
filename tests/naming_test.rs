use email_unpack::*;
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_filename_is_used_verbatim() {
    let part = Part::leaf("image/png", vec![1u8]).with_filename("My Logo.PNG");
    assert_eq!(base_name(&part, Role::Image, 3).as_deref(), Some("My Logo.PNG"));
}

#[test]
fn test_content_id_name() {
    let part = Part::leaf("image/png", vec![1u8]).with_content_id("<abc@logo>");
    assert_eq!(base_name(&part, Role::Image, 2).as_deref(), Some("abc_at_logo.png"));
}

#[test]
fn test_content_id_dots_and_slashes_are_replaced() {
    let part = Part::leaf("image/jpeg", vec![1u8]).with_content_id("<img.1/a@mail.example.com>");
    assert_eq!(
        base_name(&part, Role::Image, 2).as_deref(),
        Some("img_1_a_at_mail_example_com.jpeg")
    );
}

#[test]
fn test_content_id_without_subtype_uses_bin() {
    let part = Part::leaf("weird", vec![1u8]).with_content_id("<x@y>");
    assert_eq!(base_name(&part, Role::Image, 2).as_deref(), Some("x_at_y.bin"));
}

#[test]
fn test_generated_image_name() {
    let part = Part::leaf("image/gif", vec![1u8]);
    assert_eq!(base_name(&part, Role::Image, 5).as_deref(), Some("image_5.gif"));
}

#[test]
fn test_generated_attachment_and_unknown_names() {
    let part = Part::leaf("application/zip", vec![1u8]);
    assert_eq!(
        base_name(&part, Role::Attachment, 4).as_deref(),
        Some("attachment_4")
    );
    assert_eq!(
        base_name(&part, Role::UnknownBinary, 7).as_deref(),
        Some("unknown_part_7.bin")
    );
    assert_eq!(base_name(&part, Role::TextBody, 7), None);
    assert_eq!(base_name(&part, Role::Skip, 7), None);
}

#[test]
fn test_blank_filename_falls_back_to_generated_name() {
    let attachment = Part::leaf("application/pdf", vec![1u8]).with_filename("");
    assert_eq!(
        base_name(&attachment, Role::Attachment, 2).as_deref(),
        Some("attachment_2")
    );

    let image = Part::leaf("image/png", vec![1u8]).with_filename("   ");
    assert_eq!(base_name(&image, Role::Image, 3).as_deref(), Some("image_3.png"));
}

#[test]
fn test_split_extension() {
    assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
    assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
    assert_eq!(split_extension("attachment_4"), ("attachment_4", ""));
    assert_eq!(split_extension(".profile"), (".profile", ""));
}

#[test]
fn test_collisions_get_increasing_suffixes() {
    let used = UsedNames::new();
    let part = Part::leaf("application/pdf", vec![1u8]).with_filename("report.pdf");

    let names: Vec<String> = (1..=3)
        .filter_map(|i| resolve(&part, Role::Attachment, i, &used))
        .collect();

    assert_eq!(names, ["report.pdf", "report_1.pdf", "report_2.pdf"]);
    assert_eq!(used.len(), 3);
}

#[test]
fn test_collision_without_extension() {
    let used = UsedNames::new();
    assert_eq!(used.reserve("notes", false), "notes");
    assert_eq!(used.reserve("notes", false), "notes_1");
}

#[test]
fn test_suffix_skips_names_already_taken() {
    let used = UsedNames::with_reserved(["report.pdf", "report_1.pdf"]);
    assert_eq!(used.reserve("report.pdf", false), "report_2.pdf");
}

#[test]
fn test_image_reserves_its_sidecar() {
    let used = UsedNames::new();
    assert_eq!(used.reserve("logo.png", true), "logo.png");
    assert!(used.contains("logo_metadata.txt"));

    // Same stem, different extension: the sidecar would clash
    assert_eq!(used.reserve("logo.jpg", true), "logo_1.jpg");
    assert!(used.contains("logo_1_metadata.txt"));
}

#[test]
fn test_resolution_is_deterministic() {
    let parts = [
        Part::leaf("image/png", vec![1u8]).with_filename("a.png"),
        Part::leaf("image/png", vec![1u8]).with_filename("a.png"),
        Part::leaf("image/png", vec![1u8]).with_content_id("<a@b>"),
        Part::leaf("image/png", vec![1u8]).with_content_id("<a@b>"),
    ];

    let run = || {
        let used = UsedNames::new();
        parts
            .iter()
            .enumerate()
            .filter_map(|(i, p)| resolve(p, Role::Image, i + 1, &used))
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, ["a.png", "a_1.png", "a_at_b.png", "a_at_b_1.png"]);
    assert_eq!(first, run());
}

#[test]
fn test_concurrent_reservations_are_distinct() {
    let used = Arc::new(UsedNames::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let used = Arc::clone(&used);
            std::thread::spawn(move || used.reserve("report.pdf", false))
        })
        .collect();

    let names: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(names.len(), 8);
    assert!(names.contains("report.pdf"));
    assert!(names.contains("report_7.pdf"));
}
