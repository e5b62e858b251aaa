//! End-to-end behavior of the translation pipeline.

use indoc::indoc;

use jpe_compiler::build::{BuildOptions, BuildOrchestrator, BuildState, MANIFEST_FILE_NAME};
use jpe_compiler::codegen::generate;
use jpe_compiler::diagnostic::{DiagnosticCode, DiagnosticsExt, ErrorKind, Severity};
use jpe_compiler::frontend::jpe::parse;
use jpe_compiler::frontend::xml::parse_documents;
use jpe_compiler::ir::{
    ArtifactKind, Buff, EnumDefinition, EnumOption, EnumValue, ProjectIR, ResourceId, Trait,
};
use jpe_compiler::validate::validate;
use jpe_compiler::{api, XmlDocuments};

const HAPPY_BUFF: &str = indoc! {"
    [Project]
    name: Test Mod
    id: test_mod
    version: 1.0.0
    end

    [Buffs]
    id: happy_buff
    display_name: STR_HAPPY
    description: STR_HAPPY_DESC
    duration: 120
    end
"};

const GHOST_BUFF: &str = indoc! {"
    [Project]
    name: Test Mod
    id: test_mod
    version: 1.0.0
    end

    [Traits]
    id: cheerful
    buff: ghost_buff
    end
"};

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn happy_buff_parses_without_errors() {
    let output = parse(HAPPY_BUFF);
    assert_eq!(output.ir.buffs.len(), 1);
    let buff = &output.ir.buffs[0];
    assert_eq!(buff.id.name, "happy_buff");
    assert_eq!(buff.duration_sim_minutes, Some(120));
    assert!(!output.diagnostics.has_errors());

    let result = api::validate(HAPPY_BUFF);
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    // Both text keys lack strings.
    assert_eq!(result.warnings.len(), 2);
}

#[test]
fn ghost_buff_blocks_generation() {
    let result = api::build(GHOST_BUFF, &BuildOptions::default());
    assert!(!result.success);
    assert!(result.artifacts.is_empty());

    let dangling: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::DanglingReference)
        .collect();
    assert_eq!(dangling.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("ghost_buff"));
    assert_eq!(dangling[0].kind(), ErrorKind::Semantic);
}

#[test]
fn duplicate_enum_option_names_one_error() {
    let output = parse(indoc! {"
        [Enums]
        id: mood_level
        option: name:A, value:0
        option: name:A, value:1
        end
    "});
    assert!(output.diagnostics.is_empty());

    let diagnostics = validate(&output.ir);
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, DiagnosticCode::DuplicateEnumOption);
    assert!(errors[0].message.contains("mood_level"));
}

#[test]
fn empty_document_builds_nothing() {
    let output = parse("");
    assert!(output.ir.is_empty());
    assert_eq!(output.ir, ProjectIR::default());
    assert!(output.diagnostics.is_empty());

    let result = api::build("", &BuildOptions::default());
    assert!(result.success);
    assert!(result.artifacts.is_empty());
    assert!(result.diagnostics.is_empty());
    assert!(result.build_id.is_some());
}

// =============================================================================
// Validator completeness
// =============================================================================

fn clean_project() -> ProjectIR {
    let mut ir = ProjectIR::new();
    for name in ["alpha", "beta", "gamma"] {
        ir.add_trait(Trait::new(ResourceId::new(name)));
        ir.add_buff(Buff::new(ResourceId::new(format!("{}_buff", name))));
    }
    let mut mood = EnumDefinition::new(ResourceId::new("mood"));
    mood.options.push(EnumOption::new("LOW", EnumValue::Int(0)));
    ir.add_enum(mood);
    ir
}

#[test]
fn one_injected_duplicate_gives_one_error() {
    let baseline = validate(&clean_project());
    assert!(!baseline.has_errors());

    let injections: [(ArtifactKind, &str); 3] = [
        (ArtifactKind::Trait, "beta"),
        (ArtifactKind::Buff, "alpha_buff"),
        (ArtifactKind::EnumTuning, "mood"),
    ];
    for (kind, name) in injections {
        let mut ir = clean_project();
        match kind {
            ArtifactKind::Trait => ir.add_trait(Trait::new(ResourceId::new(name))),
            ArtifactKind::Buff => ir.add_buff(Buff::new(ResourceId::new(name))),
            _ => {
                let mut copy = EnumDefinition::new(ResourceId::new(name));
                copy.options.push(EnumOption::new("HIGH", EnumValue::Int(1)));
                ir.add_enum(copy);
            }
        }

        let duplicates: Vec<_> = validate(&ir)
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::DuplicateId)
            .collect();
        assert_eq!(duplicates.len(), 1, "{:?}", kind);
        assert!(duplicates[0].message.contains(name));
        assert_eq!(duplicates[0].severity, Severity::Error);
    }
}

// =============================================================================
// Error isolation
// =============================================================================

#[test]
fn malformed_buff_does_not_cost_traits() {
    let output = parse(indoc! {"
        [Buffs]
        id: broken_buff
        duration: forever
        this line is not a key value pair
        end

        [Traits]
        id: one
        end

        [Traits]
        id: two
        end

        [Traits]
        id: three
        end
    "});
    assert_eq!(output.ir.traits.len(), 3);
    assert!(!output.diagnostics.is_empty());
    let names: Vec<_> = output.ir.traits.iter().map(|t| t.id.name.as_str()).collect();
    assert_eq!(names, ["one", "two", "three"]);
}

#[test]
fn unterminated_entry_is_isolated() {
    let output = parse(indoc! {"
        [Buffs]
        id: never_closed

        [Traits]
        id: calm
        end
    "});
    assert!(output.ir.buffs.is_empty());
    assert_eq!(output.ir.traits.len(), 1);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, DiagnosticCode::UnterminatedEntry);
}

#[test]
fn blank_line_ends_an_open_entry() {
    let source = "[Buffs]\nid: a\nduration: 5\n\nid: b\nend\n";
    let output = parse(source);
    assert_eq!(output.ir.buffs.len(), 1);
    assert_eq!(output.ir.buffs[0].id.name, "b");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, DiagnosticCode::UnterminatedEntry);

    let report = BuildOrchestrator::default().run(source);
    assert_eq!(report.state, BuildState::Failed);
    assert!(report.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnterminatedEntry));
}

#[test]
fn adversarial_input_never_panics() {
    let inputs = [
        "[",
        "]",
        "end\nend\nend",
        "[Buffs]\nid:\nend",
        "[Enums]\nid: x\noption: name:\"unterminated\nend",
        ":::::",
        "[Project]\n[Project]\nend",
        "\u{feff}[Traits]\r\nid: crlf\r\nend\r\n",
    ];
    for input in inputs {
        let result = api::build(input, &BuildOptions::default());
        assert!(result.success || !result.errors.is_empty(), "{:?}", input);
    }
}

#[test]
fn malformed_xml_document_is_isolated() {
    let mut documents = XmlDocuments::new();
    documents.insert(ArtifactKind::Buff, b"<BuffTuning><Buff n=\"a\"></BuffTuning>".to_vec());
    documents.insert(
        ArtifactKind::Trait,
        b"<TraitTuning><Trait n=\"calm\"/><Trait n=\"bold\"/></TraitTuning>".to_vec(),
    );

    let output = parse_documents(&documents);
    assert_eq!(output.ir.traits.len(), 2);
    assert!(output.ir.buffs.is_empty());
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, DiagnosticCode::MalformedXml);
    assert_eq!(output.diagnostics[0].artifact, Some(ArtifactKind::Buff));
    assert_eq!(output.diagnostics[0].kind(), ErrorKind::Format);
}

// =============================================================================
// XML reverse parsing
// =============================================================================

#[test]
fn generated_xml_reads_back_to_jpe() {
    let source = indoc! {"
        [Project]
        name: Test Mod
        id: test_mod
        version: 1.0.0
        end

        [Buffs]
        id: happy_buff
        display_name: STR_HAPPY
        duration: 120
        trait: cheerful
        end

        [Traits]
        id: cheerful
        buff: happy_buff
        end

        [Strings]
        key: STR_HAPPY
        text: Happy
        end
    "};
    let forward = api::translate_to_xml(source);
    assert!(forward.success, "{:?}", forward.errors);
    assert_eq!(forward.artifacts.len(), 3);

    let documents = generate(&parse(source).ir).unwrap();
    let back = api::translate_to_jpe(&documents);
    assert!(back.success, "{:?}", back.errors);
    assert_eq!(back.content.as_deref(), Some(source));
}

#[test]
fn multiline_xml_text_reads_back_to_valid_jpe() {
    let mut documents = XmlDocuments::new();
    documents.insert(
        ArtifactKind::StringTable,
        b"<StringTable><String key=\"STR_A\" locale=\"en_US\">Hi\nthere</String><String key=\"STR_B\"> padded </String></StringTable>"
            .to_vec(),
    );

    let back = api::translate_to_jpe(&documents);
    assert!(back.success, "{:?}", back.errors);
    let content = back.content.unwrap();
    assert!(api::validate(&content).is_valid, "{}", content);

    let output = parse(&content);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert_eq!(output.ir.localized_strings[0].text, "Hi\nthere");
    assert_eq!(output.ir.localized_strings[1].text, " padded ");
}

#[test]
fn unknown_xml_content_is_reported_not_fatal() {
    let mut documents = XmlDocuments::new();
    documents.insert(
        ArtifactKind::Trait,
        indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <TraitTuning project="m" name="M" version="1.0.0" flavor="spicy">
              <Trait n="calm" mood="zen"/>
              <Widget/>
            </TraitTuning>
        "#}
        .as_bytes()
        .to_vec(),
    );

    let result = api::translate_to_jpe(&documents);
    assert!(result.success);
    assert_eq!(result.warnings.len(), 3);
    assert!(result.content.unwrap().contains("id: calm"));
}

// =============================================================================
// Build orchestration
// =============================================================================

#[test]
fn successful_build_walks_every_state() {
    let report = BuildOrchestrator::default().run(HAPPY_BUFF);
    assert_eq!(report.state, BuildState::Succeeded);
    assert_eq!(
        report.transitions,
        [
            BuildState::Idle,
            BuildState::Parsing,
            BuildState::Validating,
            BuildState::Generating,
            BuildState::Packaging,
            BuildState::Succeeded,
        ]
    );
}

#[test]
fn failed_build_stops_after_validation() {
    let report = BuildOrchestrator::default().run(GHOST_BUFF);
    assert_eq!(report.state, BuildState::Failed);
    assert_eq!(
        report.transitions,
        [
            BuildState::Idle,
            BuildState::Parsing,
            BuildState::Validating,
            BuildState::Failed,
        ]
    );
}

#[test]
fn concurrent_builds_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let source = if i % 2 == 0 { HAPPY_BUFF } else { GHOST_BUFF };
                BuildOrchestrator::default().run(source)
            })
        })
        .collect();

    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.is_success(), i % 2 == 0);
    }
    let mut ids: Vec<_> = reports.iter().map(|r| r.build_id).collect();
    ids.sort_by_key(|id| *id.as_uuid());
    ids.dedup();
    assert_eq!(ids.len(), reports.len());

    let first = &reports[0].artifacts;
    let third = &reports[2].artifacts;
    assert_eq!(first, third);
}

#[test]
fn build_packages_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        out_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    let result = api::build(HAPPY_BUFF, &options);
    assert!(result.success);
    assert_eq!(result.artifacts.len(), 1);
    let artifact = &result.artifacts[0];
    assert_eq!(artifact.id, "test_mod_buffs.xml");

    let written = std::fs::read(dir.path().join("test_mod_buffs.xml")).unwrap();
    assert_eq!(written, artifact.content);

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(MANIFEST_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(manifest["projectId"], "test_mod");
    assert_eq!(
        manifest["buildId"].as_str().map(str::to_string),
        result.build_id.map(|id| id.to_string())
    );
    assert_eq!(manifest["artifacts"][0]["id"], "test_mod_buffs.xml");
}

#[test]
fn build_from_ir_skips_parsing() {
    let mut ir = ProjectIR::new();
    ir.add_trait(Trait::new(ResourceId::new("calm")));
    let result = api::build(ir, &BuildOptions::default());
    assert!(result.success);
    assert_eq!(result.artifacts.len(), 1);
    assert_eq!(result.artifacts[0].id, "project_traits.xml");
}
