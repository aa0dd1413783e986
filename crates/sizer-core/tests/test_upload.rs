mod common;

use std::future::{poll_fn, Future};
use std::task::Poll;
use std::time::Duration;

use common::{
    error_response, ok_response, opened_workbench, pending_file, workbench, HangingTransport,
    MemorySink, MockFactory, MockTransport,
};
use sizer_core::consts::{GENERIC_FAILURE_MESSAGE, SIZE_RANGE_MESSAGE, WIDE_RATIO};
use sizer_core::crop::CropGeometry;
use sizer_core::error::SizerError;
use sizer_core::form::{
    UploadForm, FIELD_CROP_HEIGHT, FIELD_CROP_WIDTH, FIELD_CROP_X, FIELD_CROP_Y, FIELD_FILE,
    FIELD_MIN_SIZE, FIELD_TARGET_RATIO, FIELD_TARGET_SIZE,
};
use sizer_core::upload::{
    ErrorRegion, PartValue, ResponseHandler, SubmissionResult, UploadController,
};

fn jpeg_response() -> sizer_core::upload::TransportResponse {
    ok_response(Some("attachment; filename*=UTF-8''processed_photo.jpg"), b"JPEG")
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_min_not_below_max_sends_nothing() {
    let transport = MockTransport::responding(jpeg_response());
    let mut wb = opened_workbench(MockFactory::default(), transport.clone(), MemorySink::default());
    wb.form.min_size_mb = "5".into();
    wb.form.target_size_mb = "3".into();

    let err = wb.submit().await.unwrap_err();

    assert!(matches!(err, SizerError::InvalidSizeRange { .. }));
    assert!(err.is_validation());
    assert_eq!(transport.calls(), 0);
    assert_eq!(wb.status().error.message(), Some(SIZE_RANGE_MESSAGE));
    assert!(wb.status().submit.enabled);
    assert!(!wb.status().loading);
}

#[tokio::test]
async fn test_equal_sizes_are_rejected() {
    let transport = MockTransport::responding(jpeg_response());
    let mut wb = opened_workbench(MockFactory::default(), transport.clone(), MemorySink::default());
    wb.form.min_size_mb = "2".into();
    wb.form.target_size_mb = "2.0".into();

    assert!(wb.submit().await.is_err());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_unparsable_sizes_are_left_to_the_endpoint() {
    let transport = MockTransport::responding(jpeg_response());
    let mut wb = opened_workbench(MockFactory::default(), transport.clone(), MemorySink::default());
    wb.form.min_size_mb = "".into();

    assert!(wb.submit().await.unwrap().is_success());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_no_file_sends_nothing() {
    let transport = MockTransport::responding(jpeg_response());
    let mut wb = workbench(MockFactory::default(), transport.clone(), MemorySink::default());

    assert!(matches!(
        wb.submit().await,
        Err(SizerError::NoFileSelected)
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_cancelled_selection_cannot_be_submitted() {
    let transport = MockTransport::responding(jpeg_response());
    let mut wb = opened_workbench(MockFactory::default(), transport.clone(), MemorySink::default());
    wb.cancel();

    assert!(matches!(
        wb.submit().await,
        Err(SizerError::NoFileSelected)
    ));
    assert_eq!(transport.calls(), 0);
}

// ---------------------------------------------------------------------------
// Request assembly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_request_carries_every_field() {
    let transport = MockTransport::responding(jpeg_response());
    let factory = MockFactory::with_geometry(CropGeometry::new(10.0, 20.0, 300.0, 150.0));
    let mut wb = opened_workbench(factory, transport.clone(), MemorySink::default());
    wb.confirm();
    wb.form.min_size_mb = "0.5".into();
    wb.form.target_size_mb = "1.5".into();

    wb.submit().await.unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.url, "http://127.0.0.1:8000/upload");

    let file = request.field(FIELD_FILE).unwrap();
    match &file.value {
        PartValue::File { filename, mime, data } => {
            assert_eq!(filename, "photo.png");
            assert_eq!(mime, "image/png");
            assert_eq!(&data[..], &pending_file("photo.png").data[..]);
        }
        other => panic!("file part carried {other:?}"),
    }

    let text = |name: &str| request.field(name).and_then(|p| p.as_text()).map(str::to_owned);
    assert_eq!(text(FIELD_CROP_X).as_deref(), Some("10"));
    assert_eq!(text(FIELD_CROP_Y).as_deref(), Some("20"));
    assert_eq!(text(FIELD_CROP_WIDTH).as_deref(), Some("300"));
    assert_eq!(text(FIELD_CROP_HEIGHT).as_deref(), Some("150"));
    assert_eq!(text(FIELD_TARGET_RATIO), Some(WIDE_RATIO.to_string()));
    assert_eq!(text(FIELD_MIN_SIZE).as_deref(), Some("0.5"));
    assert_eq!(text(FIELD_TARGET_SIZE).as_deref(), Some("1.5"));
}

#[tokio::test]
async fn test_unconfirmed_crop_is_omitted() {
    let transport = MockTransport::responding(jpeg_response());
    let mut wb = opened_workbench(MockFactory::default(), transport.clone(), MemorySink::default());

    wb.submit().await.unwrap();

    let request = transport.last_request().unwrap();
    assert!(request.field(FIELD_CROP_X).is_none());
    assert!(request.field(FIELD_CROP_HEIGHT).is_none());
    assert!(request.field(FIELD_TARGET_RATIO).is_some());
}

#[test]
fn test_form_defaults_from_new() {
    let form = UploadForm::new(0.0, 2.0);
    assert_eq!(form.min_size_mb, "0");
    assert_eq!(form.target_size_mb, "2");
    assert_eq!(form.size_range(), (0.0, 2.0));
    assert!(form.validate_sizes().is_ok());
}

// ---------------------------------------------------------------------------
// Outcomes and busy state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_success_saves_and_returns_to_idle() {
    let sink = MemorySink::default();
    let saved = sink.saved.clone();
    let mut wb = opened_workbench(
        MockFactory::default(),
        MockTransport::responding(jpeg_response()),
        sink,
    );

    let result = wb.submit().await.unwrap();

    match result {
        SubmissionResult::Success { filename, size, .. } => {
            assert_eq!(filename, "processed_photo.jpg");
            assert_eq!(size, 4);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(saved.borrow().len(), 1);
    let status = wb.status();
    assert!(status.submit.enabled);
    assert!(!status.submit.busy);
    assert!(!status.loading);
    assert!(!status.error.is_visible());
}

#[tokio::test]
async fn test_rejected_request_surfaces_detail_and_restores_submit() {
    let transport = MockTransport::responding(error_response(
        413,
        br#"{"detail": "File exceeds the size limit (10.0MB)"}"#,
    ));
    let mut wb = opened_workbench(MockFactory::default(), transport, MemorySink::default());

    let result = wb.submit().await.unwrap();

    assert_eq!(
        result,
        SubmissionResult::Failure {
            message: "File exceeds the size limit (10.0MB)".into()
        }
    );
    assert_eq!(
        wb.status().error.message(),
        Some("File exceeds the size limit (10.0MB)")
    );
    assert!(wb.status().submit.enabled);
}

#[tokio::test]
async fn test_malformed_error_body_is_generic() {
    let transport = MockTransport::responding(error_response(500, b"Internal Server Error"));
    let mut wb = opened_workbench(MockFactory::default(), transport, MemorySink::default());

    wb.submit().await.unwrap();

    assert_eq!(wb.status().error.message(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_network_failure_is_a_failure_result() {
    let transport = MockTransport::failing("connection refused");
    let mut wb = opened_workbench(MockFactory::default(), transport.clone(), MemorySink::default());

    let result = wb.submit().await.unwrap();

    match result {
        SubmissionResult::Failure { message } => {
            assert!(message.contains("connection refused"), "got: {message}");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(wb.status().submit.enabled);
    assert!(!wb.status().loading);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_new_submission_clears_previous_error() {
    let mut wb = opened_workbench(
        MockFactory::default(),
        MockTransport::responding(jpeg_response()),
        MemorySink::default(),
    );
    wb.form.min_size_mb = "9".into();
    assert!(wb.submit().await.is_err());
    assert!(wb.status().error.is_visible());

    wb.form.min_size_mb = "0".into();
    wb.submit().await.unwrap();

    assert!(!wb.status().error.is_visible());
}

#[tokio::test]
async fn test_abandoned_request_restores_submit() {
    let transport = HangingTransport::default();
    let calls = transport.calls.clone();
    let mut wb = opened_workbench(MockFactory::default(), transport, MemorySink::default());

    let outcome = tokio::time::timeout(Duration::from_millis(20), wb.submit()).await;

    assert!(outcome.is_err(), "hanging transport must not resolve");
    assert_eq!(*calls.borrow(), 1);
    assert!(wb.status().submit.enabled);
    assert!(!wb.status().submit.busy);
    assert!(!wb.status().loading);
}

#[tokio::test]
async fn test_second_submit_while_busy_is_refused() {
    let transport = HangingTransport::default();
    let calls = transport.calls.clone();
    let mut wb = opened_workbench(MockFactory::default(), transport, MemorySink::default());

    // Start a submission and leave it in flight.
    let mut in_flight = Box::pin(wb.submit());
    let polled = poll_fn(|cx| Poll::Ready(in_flight.as_mut().poll(cx))).await;
    assert!(polled.is_pending());
    std::mem::forget(in_flight);

    assert!(!wb.status().submit.enabled);
    assert!(wb.status().submit.busy);
    assert!(wb.status().loading);

    assert!(matches!(
        wb.submit().await,
        Err(SizerError::SubmissionInProgress)
    ));
    assert_eq!(*calls.borrow(), 1);
}

#[tokio::test]
async fn test_controller_without_workbench() {
    let transport = MockTransport::responding(jpeg_response());
    let handler = ResponseHandler::new(MemorySink::default(), "fallback.jpg");
    let mut controller = UploadController::new(transport.clone(), handler, "http://host/upload");
    let file = pending_file("photo.png");

    let result = controller
        .submit(Some(&file), &UploadForm::new(0.0, 2.0))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(controller.url(), "http://host/upload");
    assert_eq!(controller.status().error, ErrorRegion::default());
    assert_eq!(transport.calls(), 1);
}
