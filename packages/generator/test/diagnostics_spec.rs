//! Diagnostics Tests
//!
//! Catalog stability, message formatting and sink behavior under
//! concurrent reporters.

use relay_generator::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use relay_host::SourceLocation;

#[test]
fn should_keep_catalog_ids_stable() {
    assert_eq!(DiagnosticCode::GeneratorError.id(), "RELAY_GEN_001");
    assert_eq!(DiagnosticCode::InvalidHandlerSignature.id(), "RELAY_GEN_002");
    assert_eq!(DiagnosticCode::DuplicateHandler.id(), "RELAY_GEN_003");
    assert_eq!(DiagnosticCode::MissingRuntimeReference.id(), "RELAY_GEN_004");
    assert_eq!(DiagnosticCode::NamedHandlerConflict.id(), "RELAY_GEN_005");
    assert_eq!(DiagnosticCode::PriorityOutOfRange.id(), "RELAY_GEN_102");
    assert_eq!(DiagnosticCode::InaccessibleHandler.id(), "RELAY_GEN_106");
    assert_eq!(
        DiagnosticCode::ConstructorParameterConcern.id(),
        "RELAY_GEN_109"
    );
    assert_eq!(DiagnosticCode::InvalidReturnType.id(), "RELAY_GEN_202");
    assert_eq!(DiagnosticCode::InvalidStreamReturnType.id(), "RELAY_GEN_203");
    assert_eq!(
        DiagnosticCode::InvalidNotificationReturnType.id(),
        "RELAY_GEN_204"
    );
    assert_eq!(DiagnosticCode::MissingRequestParameter.id(), "RELAY_GEN_205");
    assert_eq!(
        DiagnosticCode::InvalidRequestParameterType.id(),
        "RELAY_GEN_206"
    );
    assert_eq!(
        DiagnosticCode::MissingCancellationParameter.id(),
        "RELAY_GEN_207"
    );
    assert_eq!(
        DiagnosticCode::NotificationMissingParameter.id(),
        "RELAY_GEN_208"
    );
    assert_eq!(DiagnosticCode::NoHandlers.id(), "RELAY_GEN_NoHandlers");
    assert_eq!(DiagnosticCode::ConfigConflict.id(), "RELAY_GEN_ConfigConflict");
    assert_eq!(DiagnosticCode::InvalidScope.id(), "RELAY_GEN_InvalidScope");
    assert_eq!(
        DiagnosticCode::DuplicatePipelineOrder.id(),
        "RELAY_GEN_DuplicatePipelineOrder"
    );
    assert_eq!(
        DiagnosticCode::InvalidPriority.id(),
        "RELAY_GEN_InvalidPriority"
    );
}

#[test]
fn should_classify_severities_per_catalog() {
    assert_eq!(DiagnosticCode::DuplicateHandler.severity(), Severity::Error);
    assert_eq!(
        DiagnosticCode::PriorityOutOfRange.severity(),
        Severity::Warning
    );
    assert_eq!(
        DiagnosticCode::MissingCancellationParameter.severity(),
        Severity::Warning
    );
    assert_eq!(DiagnosticCode::NoHandlers.severity(), Severity::Warning);
    assert_eq!(DiagnosticCode::Info.severity(), Severity::Info);
    assert_eq!(DiagnosticCode::ConfigConflict.severity(), Severity::Error);
}

#[test]
fn should_categorize_codes() {
    assert_eq!(DiagnosticCode::GeneratorError.category(), Category::Generator);
    assert_eq!(
        DiagnosticCode::PriorityOutOfRange.category(),
        Category::Performance
    );
    assert_eq!(
        DiagnosticCode::ConfigConflict.category(),
        Category::Configuration
    );
    assert_eq!(DiagnosticCode::DuplicateHandler.category(), Category::Usage);
}

#[test]
fn should_substitute_template_arguments_verbatim() {
    let diagnostic = Diagnostic::format(
        DiagnosticCode::InvalidReturnType,
        &["App.Handler.HandleAsync", "List<string>"],
    );
    assert!(diagnostic.message.contains("App.Handler.HandleAsync"));
    assert!(diagnostic.message.contains("List<string>"));
}

#[test]
fn should_preserve_special_characters_in_messages() {
    let gnarly = "we{ird} \"quoted\" $interpolated$ \u{1F600} void";
    let diagnostic = Diagnostic::format(DiagnosticCode::Info, &[gnarly]);
    assert_eq!(diagnostic.message, gnarly);
}

#[test]
fn should_preserve_long_messages() {
    let long = "x".repeat(10_000);
    let diagnostic = Diagnostic::format(DiagnosticCode::Info, &[&long]);
    assert_eq!(diagnostic.message.len(), 10_000);
}

#[test]
fn should_attach_locations() {
    let diagnostic = Diagnostic::format(DiagnosticCode::DuplicateHandler, &["A", "B"])
        .at(SourceLocation::new("handlers.cs", 12, 4));
    let location = diagnostic.location.as_ref().unwrap();
    assert_eq!(location.file, "handlers.cs");
    assert_eq!(location.line, 12);
}

#[test]
fn should_append_without_deduplication() {
    let sink = DiagnosticSink::new();
    for _ in 0..3 {
        sink.report(Diagnostic::format(DiagnosticCode::NoHandlers, &[]));
    }
    assert_eq!(sink.len(), 3);
    assert_eq!(sink.count_of("RELAY_GEN_NoHandlers"), 3);
}

#[test]
fn should_snapshot_a_stable_copy() {
    let sink = DiagnosticSink::new();
    sink.report(Diagnostic::format(DiagnosticCode::Info, &["one"]));
    let snapshot = sink.snapshot();
    sink.report(Diagnostic::format(DiagnosticCode::Info, &["two"]));
    assert_eq!(snapshot.len(), 1);
    assert_eq!(sink.len(), 2);
}

#[test]
fn should_accept_concurrent_reporters() {
    let sink = DiagnosticSink::new();
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let sink = &sink;
            scope.spawn(move || {
                for i in 0..100 {
                    sink.report(Diagnostic::format(
                        DiagnosticCode::Info,
                        &[&format!("{}-{}", worker, i)],
                    ));
                }
            });
        }
    });
    assert_eq!(sink.len(), 800);
}

#[test]
fn should_flag_errors_in_the_snapshot() {
    let sink = DiagnosticSink::new();
    sink.report(Diagnostic::format(DiagnosticCode::Info, &["fine"]));
    assert!(!sink.has_errors());
    sink.report(Diagnostic::format(DiagnosticCode::DuplicateHandler, &["A", "B"]));
    assert!(sink.has_errors());
}
