//! End-to-end segmentation over in-memory documents.
//!
//! Pages are built from text runs and rule lines, so every test controls
//! exactly which bands exist and what they extract.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sectionist_core::{MemoryDocument, MemoryPage};
use sectionist_parsing::{
    BackendError, ParsingConfigBuilder, ParsingError, SectionExtractor, assemble, segment,
};

/// Page 1: text above a mid-page rule and below it. Page 2: text, no rules.
fn two_page_record() -> MemoryDocument {
    MemoryDocument::new(vec![
        MemoryPage::letter()
            .with_text(90.0, "Intake Summary")
            .with_text(110.0, "Surrendered by owner.")
            .with_rule(400.0)
            .with_text(450.0, "Behavior Notes")
            .with_text(470.0, "Friendly with staff."),
        MemoryPage::letter()
            .with_text(60.0, "Page 2 of 2")
            .with_text(80.0, "Good with other dogs."),
    ])
}

#[test]
fn trailing_unterminated_section_is_dropped() {
    let sections = segment(two_page_record()).unwrap();

    assert_eq!(sections.len(), 1);
    assert_eq!(
        sections.get("Intake Summary"),
        Some("Intake Summary\nSurrendered by owner.\n")
    );
    assert!(!sections.contains_key("Behavior Notes"));
}

#[test]
fn trailing_section_flushed_when_enabled() {
    let config = ParsingConfigBuilder::new()
        .flush_trailing_section(true)
        .build()
        .unwrap();
    let sections = SectionExtractor::with_config(config)
        .segment(two_page_record())
        .unwrap();

    let titles: Vec<_> = sections.titles().collect();
    assert_eq!(titles, vec!["Intake Summary", "Behavior Notes"]);
    // The page marker between the two pages is stripped with its blank line.
    assert_eq!(
        sections.get("Behavior Notes"),
        Some("Behavior Notes\nFriendly with staff.\nGood with other dogs.\n")
    );
}

#[test]
fn title_collision_keeps_later_content_at_first_position() {
    let doc = MemoryDocument::new(vec![
        MemoryPage::letter()
            .with_text(50.0, "Daily Log")
            .with_text(65.0, "Morning walk.")
            .with_rule(100.0)
            .with_text(150.0, "Medical")
            .with_rule(200.0)
            .with_text(250.0, "Daily Log")
            .with_text(265.0, "Evening play group.")
            .with_rule(300.0),
    ]);
    let sections = segment(doc).unwrap();

    assert_eq!(sections.len(), 2);
    assert_eq!(
        sections.get("Daily Log"),
        Some("Daily Log\nEvening play group.\n")
    );
    let titles: Vec<_> = sections.titles().collect();
    assert_eq!(titles, vec!["Daily Log", "Medical"]);
}

#[test]
fn reading_order_spans_pages() {
    let doc = MemoryDocument::new(vec![
        MemoryPage::letter()
            .with_text(50.0, "Intake")
            .with_rule(100.0)
            .with_text(700.0, "Medical"),
        MemoryPage::letter()
            .with_text(40.0, "Spayed 01/03/2024.")
            .with_rule(80.0)
            .with_text(120.0, "Behavior")
            .with_rule(160.0),
    ]);
    let sections = segment(doc).unwrap();

    let pairs: Vec<_> = sections.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("Intake", "Intake\n"),
            ("Medical", "Medical\nSpayed 01/03/2024.\n"),
            ("Behavior", "Behavior\n"),
        ]
    );
    assert_eq!(
        assemble(&sections),
        "Intake\nIntake\n\n\nMedical\nMedical\nSpayed 01/03/2024.\n\n\nBehavior\nBehavior\n\n\n"
    );
}

#[test]
fn document_closed_once_after_success() {
    let closes = Arc::new(AtomicUsize::new(0));
    let doc = two_page_record().with_close_counter(closes.clone());

    segment(doc).unwrap();

    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn page_failure_aborts_and_still_closes_document() {
    let closes = Arc::new(AtomicUsize::new(0));
    let doc = MemoryDocument::new(vec![
        MemoryPage::letter().with_text(50.0, "Intake").with_rule(100.0),
        MemoryPage::letter().failing(),
        MemoryPage::letter().with_text(50.0, "Never reached").with_rule(100.0),
    ])
    .with_close_counter(closes.clone());

    let result = segment(doc);

    match result {
        Err(ParsingError::Backend(BackendError::PageAccess { page, .. })) => assert_eq!(page, 1),
        other => panic!("expected a page access error, got {other:?}"),
    }
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn independent_documents_segment_in_parallel() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let doc = MemoryDocument::new(vec![
                    MemoryPage::letter()
                        .with_text(50.0, format!("Record {i}"))
                        .with_rule(100.0),
                ]);
                segment(doc).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let sections = handle.join().unwrap();
        let title = format!("Record {i}");
        assert_eq!(sections.get(&title), Some(format!("{title}\n").as_str()));
    }
}
