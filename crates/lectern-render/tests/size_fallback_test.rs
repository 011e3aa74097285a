use lectern_core::config::Config;
use lectern_core::models::{Channel, Coordinate};
use lectern_render::delivery::{Delivery, DeliveryPolicy};
use lectern_render::pipeline::RenderPipeline;

fn pipeline_in(dir: &std::path::Path) -> RenderPipeline {
    let policy = DeliveryPolicy::new(
        Config::default().render.large_document_threshold,
        dir.join("main.html"),
        dir.join("study.html"),
    );
    RenderPipeline::new(&Config::default(), Box::new(|code: u32| code)).with_delivery(policy)
}

/// Payload that makes the final document exactly `size` bytes.
fn payload_for_document_size(pipeline: &RenderPipeline, active: &Coordinate, size: usize) -> String {
    let overhead = pipeline.render("", Some(active)).len();
    "a".repeat(size - overhead)
}

#[test]
fn document_just_over_threshold_goes_through_file() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir: {err}"),
    };
    let pipeline = pipeline_in(dir.path());
    let active = Coordinate::new("KJV", 1, 1, 1);
    let payload = payload_for_document_size(&pipeline, &active, 2_097_153);

    let document = pipeline.render(&payload, Some(&active));
    assert_eq!(document.len(), 2_097_153);
    match pipeline.deliver(Channel::Primary, document) {
        Ok(Delivery::File(path)) => assert!(path.ends_with("main.html")),
        other => panic!("expected file delivery, got {:?}", other.map(|d| d.is_file())),
    }
}

#[test]
fn document_under_threshold_is_injected_directly() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir: {err}"),
    };
    let pipeline = pipeline_in(dir.path());
    let active = Coordinate::new("KJV", 1, 1, 1);
    let payload = payload_for_document_size(&pipeline, &active, 2_097_151);

    let document = pipeline.render(&payload, Some(&active));
    assert_eq!(document.len(), 2_097_151);
    match pipeline.deliver(Channel::Secondary, document) {
        Ok(Delivery::Inline(html)) => assert_eq!(html.len(), 2_097_151),
        other => panic!("expected inline delivery, got {:?}", other.map(|d| d.is_file())),
    }
    assert!(!dir.path().join("study.html").exists());
}

#[test]
fn secondary_and_primary_use_separate_files() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir: {err}"),
    };
    let policy = DeliveryPolicy::new(4, dir.path().join("main.html"), dir.path().join("study.html"));
    let pipeline =
        RenderPipeline::new(&Config::default(), Box::new(|code: u32| code)).with_delivery(policy);

    let primary = pipeline.deliver(Channel::Primary, pipeline.render("primary", None));
    let secondary = pipeline.deliver(Channel::Secondary, pipeline.render("secondary", None));
    assert!(matches!(primary, Ok(Delivery::File(ref path)) if path.ends_with("main.html")));
    assert!(matches!(secondary, Ok(Delivery::File(ref path)) if path.ends_with("study.html")));
}
